use super::{CommandContext, summary_lines, write_summary};
use crate::cli::ProjectArgs;
use crate::config;
use crate::error::Result;
use crate::ui::CliProgressHandler;
use su2flow::engine::launcher::{Launcher, ProcessRunner};
use su2flow::engine::progress::ProgressReporter;
use su2flow::workflows;
use tracing::info;

pub async fn run(args: ProjectArgs, ctx: &CommandContext) -> Result<()> {
    let mut file = config::load_workflow_file(ctx.workflow.as_deref())?;
    file.apply_set_values(&args.set_values)?;

    let launcher = config::build_launcher(&file, Launcher::from_env().su2_run);
    let projection_config = config::build_projection_config(&args, file)?;

    let progress_handler = CliProgressHandler::new(ctx.ui_sender.clone());
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!(
        "Projecting gradients for {:?} with step {:?}",
        projection_config.config_path, projection_config.step
    );
    let state = tokio::task::block_in_place(|| {
        workflows::projection::run(&projection_config, &launcher, &ProcessRunner, &reporter)
    })?;

    for line in summary_lines(&state) {
        progress_handler.println(line);
    }
    if let Some(path) = &ctx.summary {
        write_summary(&state, path)?;
    }
    Ok(())
}
