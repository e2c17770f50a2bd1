use crate::core::config::Su2Config;
use crate::core::io::gradient::{GradientFile, read_gradients_from_path};
use crate::core::io::history::History;
use crate::core::io::plot::check_format;
use crate::core::io::surface::{
    DEFAULT_SMOOTHING_FACTOR, DEFAULT_SMOOTHING_ITERATIONS, filter_surface_file,
};
use crate::core::naming::{self, OutputFormat};
use crate::engine::config::AdjointConfig;
use crate::engine::error::EngineError;
use crate::engine::launcher::{Launcher, SolverRunner, Tool};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::State;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

const WORKING_PREFIX: &str = "config_CADJ_";

/// File names derived from the input config name.
#[derive(Debug, Clone, PartialEq)]
struct CaseFiles {
    dir: PathBuf,
    working_config: PathBuf,
    raw_gradients: String,
    gradient_report_base: String,
}

impl CaseFiles {
    fn new(config_path: &Path) -> Result<Self, EngineError> {
        let name = config_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                EngineError::Initialization(format!("'{}' is not a file", config_path.display()))
            })?;
        let dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let stem = name.strip_suffix(".cfg").unwrap_or(&name).to_string();

        Ok(Self {
            working_config: dir.join(format!("{}{}", WORKING_PREFIX, name)),
            raw_gradients: format!("objfunc_grad_adj_{}.dat", stem),
            gradient_report_base: format!("cont_adj_{}", stem),
            dir,
        })
    }
}

/// Parameters read once from the input config.
struct CaseParams {
    format: OutputFormat,
    restart_flow: String,
    surface_adjoint: Option<String>,
    objective: String,
    history: String,
    special_cauchy: bool,
}

impl CaseParams {
    fn read(config: &Su2Config) -> Result<Self, EngineError> {
        Ok(Self {
            format: config.output_format()?,
            restart_flow: config.require("RESTART_FLOW_FILENAME")?.to_string(),
            surface_adjoint: config.get("SURFACE_ADJ_FILENAME").map(str::to_string),
            objective: config.objective()?.to_string(),
            history: config.require("CONV_FILENAME")?.to_string(),
            special_cauchy: config
                .get("CONV_CRITERIA")
                .is_some_and(|c| c.eq_ignore_ascii_case("SPECIAL_CAUCHY")),
        })
    }
}

struct AdjointRun<'a, R: SolverRunner> {
    config: &'a AdjointConfig,
    launcher: Launcher,
    runner: &'a R,
    reporter: &'a ProgressReporter<'a>,
    files: CaseFiles,
    su2: Su2Config,
}

#[instrument(skip_all, name = "continuous_adjoint_workflow")]
pub fn run<R: SolverRunner>(
    config: &AdjointConfig,
    launcher: &Launcher,
    runner: &R,
    reporter: &ProgressReporter,
) -> Result<State, EngineError> {
    // === Phase 0: Validate the case, then make the working copy ===
    let files = CaseFiles::new(&config.config_path)?;
    info!(
        "Continuous adjoint on {:?} (compute: {}, partitions: {})",
        config.config_path, config.compute, config.partitions
    );
    let su2 = Su2Config::read_from_path(&config.config_path)?;
    let params = CaseParams::read(&su2)?;
    let suffix = naming::adjoint_suffix(&params.objective)?;
    check_format(params.format).map_err(|source| EngineError::Plot {
        path: config.config_path.clone(),
        source,
    })?;
    std::fs::copy(&config.config_path, &files.working_config)
        .map_err(|e| EngineError::io(&config.config_path, e))?;

    let mut run = AdjointRun {
        config,
        launcher: launcher.clone().with_partitions(config.partitions),
        runner,
        reporter,
        files,
        su2,
    };

    let stages = config.compute.stages();
    let mut state = State::new();

    // === Phase 1: Direct solution ===
    if stages.flow {
        run.direct(&params, &mut state)?;
    }

    // === Phase 2: Adjoint solution ===
    if stages.adjoint {
        run.adjoint(&params, state.iterations)?;
    }

    // === Phase 3: Surface sensitivity filtering (optional) ===
    if stages.filter {
        run.filter(&params)?;
    }

    // === Phase 4: Gradient projection ===
    if stages.gradient {
        let gradients = run.gradient(&params, suffix)?;
        state
            .gradients
            .insert(naming::objective_key(&params.objective), gradients);
    }

    std::fs::remove_file(&run.files.working_config)
        .map_err(|e| EngineError::io(&run.files.working_config, e))?;
    info!("Continuous adjoint workflow complete.");
    Ok(state)
}

impl<R: SolverRunner> AdjointRun<'_, R> {
    fn persist(&self) -> Result<(), EngineError> {
        self.su2.write_to_path(&self.files.working_config)?;
        Ok(())
    }

    fn launch(&self, tool: Tool) -> Result<(), EngineError> {
        let invocation = self.launcher.invocation(
            tool,
            &self.files.working_config,
            self.config.effective_log_file(),
        );
        self.reporter.report(Progress::status(tool.executable()));
        debug!("Launching {}", invocation);
        self.runner.run(&invocation)
    }

    /// One flow or adjoint solution. Parallel runs optionally decompose the
    /// grid first and merge the partitioned solution afterwards.
    fn solve(&self, divide_grid: bool) -> Result<(), EngineError> {
        if !self.launcher.is_parallel() {
            return self.launch(Tool::Cfd);
        }

        let mut tools = Vec::with_capacity(3);
        if divide_grid {
            tools.push(Tool::Ddc);
        }
        tools.push(Tool::Cfd);
        if self.config.output {
            tools.push(Tool::Sol);
        }

        self.reporter.report(Progress::TaskStart {
            total: tools.len() as u64,
        });
        for tool in tools {
            self.launch(tool)?;
            self.reporter.report(Progress::TaskIncrement { amount: 1 });
        }
        self.reporter.report(Progress::TaskFinish);
        Ok(())
    }

    fn direct(&mut self, params: &CaseParams, state: &mut State) -> Result<(), EngineError> {
        self.reporter.report(Progress::phase("Direct Solution"));
        let history_name = format!("{}_cfd", params.history);

        self.su2.set("MATH_PROBLEM", "DIRECT");
        self.su2.set("CONV_FILENAME", history_name.as_str());
        if params.special_cauchy {
            self.su2.set("CONV_CRITERIA", "CAUCHY");
        }
        self.persist()?;
        self.solve(self.config.divide_grid)?;

        let history_path = self
            .files
            .dir
            .join(format!("{}{}", history_name, params.format.extension()));
        let history =
            History::read_from_path(&history_path).map_err(|source| EngineError::History {
                path: history_path.clone(),
                source,
            })?;
        state.functions = history
            .objective_values()
            .map_err(|source| EngineError::History {
                path: history_path.clone(),
                source,
            })?;
        let iterations = history
            .iterations()
            .map_err(|source| EngineError::History {
                path: history_path.clone(),
                source,
            })?;
        state.iterations = Some(iterations);
        info!(
            "Direct solution finished after {} iterations ({} objective values).",
            iterations,
            state.functions.len()
        );

        self.reporter.report(Progress::PhaseFinish);
        Ok(())
    }

    fn adjoint(
        &mut self,
        params: &CaseParams,
        direct_iterations: Option<usize>,
    ) -> Result<(), EngineError> {
        self.reporter.report(Progress::phase("Adjoint Solution"));

        self.su2.set("MATH_PROBLEM", "ADJOINT");
        self.su2
            .set("SOLUTION_FLOW_FILENAME", params.restart_flow.as_str());
        self.su2
            .set("CONV_FILENAME", format!("{}_adj", params.history));
        if params.special_cauchy {
            // The adjoint runs exactly as many iterations as the direct problem.
            let iterations = direct_iterations.ok_or_else(|| EngineError::PhaseFailed {
                phase: "adjoint",
                reason: "SPECIAL_CAUCHY needs the direct solution in the same run".to_string(),
            })?;
            self.su2.set("EXT_ITER", iterations.to_string());
            self.su2.set("CONV_CRITERIA", "RESIDUAL");
        }
        self.persist()?;
        self.solve(false)?;

        self.reporter.report(Progress::PhaseFinish);
        Ok(())
    }

    fn filter(&mut self, params: &CaseParams) -> Result<(), EngineError> {
        self.reporter.report(Progress::phase("Adjoint Filtering"));
        let surface = params.surface_adjoint.as_deref().ok_or_else(|| {
            EngineError::PhaseFailed {
                phase: "filter",
                reason: "SURFACE_ADJ_FILENAME is not set".to_string(),
            }
        })?;
        let filtered = format!("{}_filtered", surface);
        let input = self.files.dir.join(format!("{}.csv", surface));
        let output = self.files.dir.join(format!("{}.csv", filtered));

        let points = filter_surface_file(
            &input,
            &output,
            DEFAULT_SMOOTHING_ITERATIONS,
            DEFAULT_SMOOTHING_FACTOR,
        )
        .map_err(|source| EngineError::Surface {
            path: input.clone(),
            source,
        })?;
        info!("Smoothed surface sensitivities at {} points.", points);

        self.su2.set("SURFACE_ADJ_FILENAME", filtered);
        self.persist()?;
        self.reporter.report(Progress::PhaseFinish);
        Ok(())
    }

    fn gradient(&mut self, params: &CaseParams, suffix: &str) -> Result<Vec<f64>, EngineError> {
        self.reporter.report(Progress::phase("Gradient Projection"));

        let definition = self.su2.definition_dv()?;
        let n_dv: usize = definition.iter().map(|dv| dv.size).sum();
        let old = vec![0.0; n_dv];
        let new = vec![self.config.step; n_dv];
        self.su2.apply_dv_keys(&definition, &new, &old);
        self.su2
            .set("GRAD_OBJFUNC_FILENAME", self.files.raw_gradients.as_str());
        self.persist()?;

        self.launch(Tool::Gpc)?;

        let raw_path = self.files.dir.join(&self.files.raw_gradients);
        let gradients =
            read_gradients_from_path(&raw_path).map_err(|source| EngineError::Gradient {
                path: raw_path.clone(),
                source,
            })?;
        if let Err(e) = std::fs::remove_file(&raw_path) {
            warn!("Could not remove raw gradient file {:?}: {}", raw_path, e);
        }

        let report_path = self.files.dir.join(format!(
            "{}_{}{}",
            self.files.gradient_report_base,
            suffix,
            params.format.extension()
        ));
        GradientFile::write_to_path(
            &report_path,
            params.format,
            &definition,
            &gradients,
            self.config.step,
        )
        .map_err(|source| EngineError::Gradient {
            path: report_path.clone(),
            source,
        })?;
        info!("Gradients written to {:?}", report_path);

        self.reporter.report(Progress::PhaseFinish);
        Ok(gradients)
    }
}
