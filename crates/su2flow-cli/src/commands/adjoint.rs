use super::{CommandContext, summary_lines, write_summary};
use crate::cli::AdjointArgs;
use crate::config;
use crate::error::Result;
use crate::ui::CliProgressHandler;
use su2flow::engine::launcher::{Launcher, ProcessRunner, SU2_RUN_ENV};
use su2flow::engine::progress::ProgressReporter;
use su2flow::workflows;
use tracing::info;

pub async fn run(args: AdjointArgs, ctx: &CommandContext) -> Result<()> {
    let mut file = config::load_workflow_file(ctx.workflow.as_deref())?;
    file.apply_set_values(&args.set_values)?;

    let env_su2_run = Launcher::from_env().su2_run;
    if env_su2_run.is_some() {
        info!("Using solver directory from ${}", SU2_RUN_ENV);
    }
    let launcher = config::build_launcher(&file, env_su2_run);
    let adjoint_config = config::build_adjoint_config(&args, file)?;

    let progress_handler = CliProgressHandler::new(ctx.ui_sender.clone());
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    progress_handler.println(format!(
        "Continuous adjoint of {} ({} partition(s), compute: {})",
        adjoint_config.config_path.display(),
        adjoint_config.partitions,
        adjoint_config.compute
    ));
    info!("Invoking the continuous adjoint workflow...");

    let state = tokio::task::block_in_place(|| {
        workflows::adjoint::run(&adjoint_config, &launcher, &ProcessRunner, &reporter)
    })?;

    for line in summary_lines(&state) {
        progress_handler.println(line);
    }
    if let Some(path) = &ctx.summary {
        write_summary(&state, path)?;
    }
    Ok(())
}
