use crate::core::config::Su2Config;
use crate::core::io::gradient::read_gradients_from_path;
use crate::core::io::plot::{PlotTable, check_format, write_plot_to_path};
use crate::core::naming;
use crate::engine::config::ProjectionConfig;
use crate::engine::error::EngineError;
use crate::engine::launcher::{Launcher, SolverRunner, Tool};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::State;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

const PROJECTION_CONFIG: &str = "config_DOT.cfg";

/// Projects adjoint surface sensitivities onto the design variables with
/// `SU2_DOT` and writes the gradient plot next to the config.
#[instrument(skip_all, name = "gradient_projection_workflow")]
pub fn run<R: SolverRunner>(
    config: &ProjectionConfig,
    launcher: &Launcher,
    runner: &R,
    reporter: &ProgressReporter,
) -> Result<State, EngineError> {
    reporter.report(Progress::phase("Gradient Projection"));

    let dir = config
        .config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut su2 = Su2Config::read_from_path(&config.config_path)?;

    // SU2_DOT assumes linear superposition from a zero baseline.
    let definition = su2.definition_dv()?;
    let n_dv: usize = definition.iter().map(|dv| dv.size).sum();
    let step = config.step.expand(n_dv)?;
    su2.unpack_dvs(&step, &vec![0.0; n_dv])?;

    let objective = su2.objective()?.to_string();
    let format = su2.output_format()?;
    let suffix = naming::adjoint_suffix(&objective)?;
    let grad_filename = su2.require("GRAD_OBJFUNC_FILENAME")?.to_string();
    let grad_stem = Path::new(&grad_filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| grad_filename.clone());
    let plot_path = dir.join(format!("{}_{}{}", grad_stem, suffix, format.extension()));
    check_format(format).map_err(|source| EngineError::Plot {
        path: plot_path.clone(),
        source,
    })?;

    if let Some(average) = su2.get("ITER_AVERAGE_OBJ").map(str::to_string) {
        su2.set("EXT_ITER", average);
    }

    let partitions = su2.get_usize("NUMBER_PART")?.unwrap_or(1);
    let launcher = launcher.clone().with_partitions(partitions);

    let working = dir.join(PROJECTION_CONFIG);
    su2.write_to_path(&working)?;
    let invocation = launcher.invocation(Tool::Dot, &working, config.log_file.as_deref());
    reporter.report(Progress::status(Tool::Dot.executable()));
    debug!("Launching {}", invocation);
    runner.run(&invocation)?;
    if let Err(e) = std::fs::remove_file(&working) {
        warn!("Could not remove {:?}: {}", working, e);
    }

    let raw_path = dir.join(&grad_filename);
    let gradients = read_gradients_from_path(&raw_path).map_err(|source| EngineError::Gradient {
        path: raw_path.clone(),
        source,
    })?;

    let table = PlotTable::new()
        .with_int_column("VARIABLE", 0..gradients.len() as i64)
        .with_float_column("GRADIENT", gradients.iter().copied())
        .with_float_column("FINDIFF_STEP", step.iter().copied());
    write_plot_to_path(&plot_path, format, &table).map_err(|source| EngineError::Plot {
        path: plot_path.clone(),
        source,
    })?;
    std::fs::remove_file(&raw_path).map_err(|e| EngineError::io(&raw_path, e))?;
    info!(
        "Projected {} gradients for {} into {:?}",
        gradients.len(),
        objective,
        plot_path
    );

    let mut state = State::new();
    state
        .gradients
        .insert(naming::objective_key(&objective), gradients);
    reporter.report(Progress::PhaseFinish);
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::plot::PlotError;
    use crate::core::naming::OutputFormat;
    use crate::engine::config::StepSize;
    use crate::engine::launcher::Invocation;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::tempdir;

    const CONFIG: &str = "\
MATH_PROBLEM= DISCRETE_ADJOINT
OBJECTIVE_FUNCTION= LIFT
OUTPUT_FORMAT= TECPLOT
GRAD_OBJFUNC_FILENAME= of_grad.dat
ITER_AVERAGE_OBJ= 20
EXT_ITER= 999
DEFINITION_DV= ( 1, 2.0 | airfoil | 0, 0.05 ); ( 1, 2.0 | airfoil | 1, 0.05 ); ( 1, 2.0 | airfoil | 2, 0.05 )
";

    fn gradient_writer(
        seen: &RefCell<Option<Su2Config>>,
    ) -> impl Fn(&Invocation) -> Result<(), EngineError> + '_ {
        move |inv: &Invocation| {
            let cfg = Su2Config::read_from_path(inv.config_path()).unwrap();
            let name = cfg.get("GRAD_OBJFUNC_FILENAME").unwrap().to_string();
            fs::write(inv.working_dir.join(name), "\"Gradient\"\n1.5\n-0.5\n0.25\n").unwrap();
            *seen.borrow_mut() = Some(cfg);
            Ok(())
        }
    }

    #[test]
    fn projection_scales_steps_and_writes_plot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("turb.cfg");
        fs::write(&path, CONFIG).unwrap();
        let seen = RefCell::new(None);
        let config = ProjectionConfig {
            config_path: path.clone(),
            step: StepSize::Uniform(1e-3),
            log_file: None,
        };

        let state = run(
            &config,
            &Launcher::default(),
            &gradient_writer(&seen),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(state.gradients["LIFT"], vec![1.5, -0.5, 0.25]);

        let seen = seen.borrow();
        let dot_config = seen.as_ref().unwrap();
        assert_eq!(dot_config.get("EXT_ITER"), Some("20"));
        assert_eq!(dot_config.get("DV_VALUE_NEW"), Some("0.002, 0.002, 0.002"));
        assert_eq!(dot_config.get("DV_VALUE_OLD"), Some("0, 0, 0"));

        let plot = fs::read_to_string(dir.path().join("of_grad_cl.dat")).unwrap();
        let lines: Vec<&str> = plot.lines().collect();
        assert_eq!(lines[0], "VARIABLES=\"VARIABLE\",\"GRADIENT\",\"FINDIFF_STEP\"");
        assert_eq!(lines[2], "0, 1.5000000000, 0.0010000000");
        assert_eq!(lines.len(), 5);

        assert!(!dir.path().join("of_grad.dat").exists());
        assert!(!dir.path().join(PROJECTION_CONFIG).exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), CONFIG);
    }

    #[test]
    fn per_variable_steps_must_match_design_variable_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("turb.cfg");
        fs::write(&path, CONFIG).unwrap();
        let seen = RefCell::new(None);
        let config = ProjectionConfig {
            config_path: path,
            step: StepSize::PerVariable(vec![1e-3, 1e-3]),
            log_file: None,
        };

        let err = run(
            &config,
            &Launcher::default(),
            &gradient_writer(&seen),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Build { .. }));
        assert!(seen.borrow().is_none());
    }

    #[test]
    fn multi_objective_gradients_are_stored_as_combo() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("turb.cfg");
        fs::write(
            &path,
            CONFIG.replace("OBJECTIVE_FUNCTION= LIFT", "OBJECTIVE_FUNCTION= DRAG, LIFT"),
        )
        .unwrap();
        let seen = RefCell::new(None);
        let config = ProjectionConfig {
            config_path: path,
            step: StepSize::default(),
            log_file: None,
        };

        let state = run(
            &config,
            &Launcher::default(),
            &gradient_writer(&seen),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert!(state.gradients.contains_key("COMBO"));
        assert!(dir.path().join("of_grad_combo.dat").exists());
    }

    #[test]
    fn binary_output_format_is_rejected_before_launching_dot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("turb.cfg");
        fs::write(
            &path,
            CONFIG.replace("OUTPUT_FORMAT= TECPLOT", "OUTPUT_FORMAT= CGNS"),
        )
        .unwrap();
        let seen = RefCell::new(None);
        let config = ProjectionConfig {
            config_path: path,
            step: StepSize::default(),
            log_file: None,
        };

        let err = run(
            &config,
            &Launcher::default(),
            &gradient_writer(&seen),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Plot {
                source: PlotError::UnsupportedFormat(OutputFormat::Cgns),
                ..
            }
        ));
        assert!(seen.borrow().is_none());
        assert!(!dir.path().join(PROJECTION_CONFIG).exists());
    }

    #[test]
    fn raw_gradients_survive_a_failed_plot_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("turb.cfg");
        fs::write(&path, CONFIG).unwrap();
        // A directory in place of the plot file makes the write fail.
        fs::create_dir(dir.path().join("of_grad_cl.dat")).unwrap();
        let seen = RefCell::new(None);
        let config = ProjectionConfig {
            config_path: path,
            step: StepSize::default(),
            log_file: None,
        };

        let err = run(
            &config,
            &Launcher::default(),
            &gradient_writer(&seen),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Plot { .. }));
        assert!(seen.borrow().is_some());
        assert!(dir.path().join("of_grad.dat").exists());
    }

    #[test]
    fn partitioned_config_runs_dot_under_mpi() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("turb.cfg");
        fs::write(&path, format!("{}NUMBER_PART= 3\n", CONFIG)).unwrap();
        let programs = RefCell::new(Vec::new());
        let seen = RefCell::new(None);
        let inner = gradient_writer(&seen);
        let runner = |inv: &Invocation| -> Result<(), EngineError> {
            programs.borrow_mut().push(inv.to_string());
            inner(inv)
        };
        let config = ProjectionConfig {
            config_path: path,
            step: StepSize::default(),
            log_file: None,
        };

        run(&config, &Launcher::default(), &runner, &ProgressReporter::new()).unwrap();
        assert_eq!(
            *programs.borrow(),
            vec!["mpirun -np 3 SU2_DOT config_DOT.cfg".to_string()]
        );
    }
}
