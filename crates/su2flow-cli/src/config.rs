mod defaults;
mod file;

pub use file::{FileStep, WorkflowFile};

use crate::cli::{AdjointArgs, ProjectArgs};
use crate::error::{CliError, Result};
use crate::utils::parser;
use defaults::DefaultsConfig;
use std::path::{Path, PathBuf};
use su2flow::engine::config::{
    AdjointConfig, AdjointConfigBuilder, ComputeMode, ProjectionConfig, Report, StepSize,
};
use su2flow::engine::launcher::Launcher;
use tracing::debug;

/// Reads the `--workflow` file, or starts from an empty one.
pub fn load_workflow_file(path: Option<&Path>) -> Result<WorkflowFile> {
    match path {
        Some(path) => WorkflowFile::from_file(path),
        None => Ok(WorkflowFile::default()),
    }
}

/// Solver location: workflow file, then the `SU2_RUN` environment value,
/// then `PATH`.
pub fn build_launcher(file: &WorkflowFile, env_su2_run: Option<PathBuf>) -> Launcher {
    let defaults = DefaultsConfig::default();
    let solver = file.solver.as_ref();
    let su2_run = solver.and_then(|s| s.su2_run.clone()).or(env_su2_run);
    let mpi_launcher = solver
        .and_then(|s| s.mpi_launcher.clone())
        .unwrap_or(defaults.mpi_launcher);
    debug!("Solver directory: {:?}, MPI launcher: {}", su2_run, mpi_launcher);
    Launcher::new(su2_run).with_mpi_launcher(mpi_launcher)
}

/// Merges defaults, the workflow file (with `-S` overrides already applied)
/// and command-line flags, in increasing precedence.
pub fn build_adjoint_config(args: &AdjointArgs, mut file: WorkflowFile) -> Result<AdjointConfig> {
    let defaults = DefaultsConfig::default();
    let adjoint = file.adjoint.take().unwrap_or_default();

    let compute = match args.compute.as_ref().or(adjoint.compute.as_ref()) {
        Some(mode) => mode
            .parse::<ComputeMode>()
            .map_err(|e| CliError::Argument(e.to_string()))?,
        None => defaults.compute,
    };
    let report = match args.report.as_ref().or(adjoint.report.as_ref()) {
        Some(level) => level
            .parse::<Report>()
            .map_err(|e| CliError::Argument(e.to_string()))?,
        None => defaults.report,
    };

    AdjointConfigBuilder::new()
        .config_path(args.config.clone())
        .partitions(
            args.partitions
                .or(adjoint.partitions)
                .unwrap_or(defaults.partitions),
        )
        .compute(compute)
        .output(args.output.or(adjoint.output).unwrap_or(defaults.output))
        .step(args.step.or(adjoint.step).unwrap_or(defaults.adjoint_step))
        .divide_grid(
            args.divide_grid
                .or(adjoint.divide_grid)
                .unwrap_or(defaults.divide_grid),
        )
        .report(report)
        .log_file(
            adjoint
                .log_file
                .unwrap_or_else(|| PathBuf::from(defaults.adjoint_log)),
        )
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

pub fn build_projection_config(
    args: &ProjectArgs,
    mut file: WorkflowFile,
) -> Result<ProjectionConfig> {
    let defaults = DefaultsConfig::default();
    let projection = file.projection.take().unwrap_or_default();

    let step = match (args.step.as_slice(), projection.step) {
        ([], Some(FileStep::Uniform(step))) => StepSize::Uniform(step),
        ([], Some(FileStep::PerVariable(steps))) => StepSize::from(steps),
        ([], None) => StepSize::Uniform(defaults.projection_step),
        (texts, _) => {
            let mut steps = Vec::new();
            for text in texts {
                steps.extend(
                    parser::parse_step_list(text)
                        .map_err(|e| CliError::Argument(e.to_string()))?,
                );
            }
            StepSize::from(steps)
        }
    };

    Ok(ProjectionConfig {
        config_path: args.config.clone(),
        step,
        log_file: projection.log_file,
    })
}
