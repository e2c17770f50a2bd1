use super::CommandContext;
use crate::cli::{MeshArgs, MeshCommands, SquareArgs};
use crate::error::Result;
use crate::ui::CliProgressHandler;
use su2flow::core::mesh::square::SquareGridSpec;
use su2flow::engine::progress::ProgressReporter;
use su2flow::workflows;
use tracing::info;

pub async fn run(args: MeshArgs, ctx: &CommandContext) -> Result<()> {
    match args.command {
        MeshCommands::Square(square) => run_square(square, ctx),
    }
}

fn grid_spec(args: &SquareArgs) -> SquareGridSpec {
    SquareGridSpec {
        n_node: args.n_node,
        m_node: args.m_node,
        x_length: args.x_length,
        y_length: args.y_length,
        offset_x: args.offset_x,
        offset_y: args.offset_y,
    }
}

fn run_square(args: SquareArgs, ctx: &CommandContext) -> Result<()> {
    let spec = grid_spec(&args);
    let progress_handler = CliProgressHandler::new(ctx.ui_sender.clone());
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Generating {}x{} square grid", spec.n_node, spec.m_node);
    let mesh = tokio::task::block_in_place(|| {
        workflows::mesh::run(&spec, &args.output, &reporter)
    })?;

    progress_handler.println(format!(
        "Mesh with {} points, {} elements and {} markers written to {}",
        mesh.points.len(),
        mesh.elements.len(),
        mesh.markers.len(),
        args.output.display()
    ));
    Ok(())
}
