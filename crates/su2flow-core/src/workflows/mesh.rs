use crate::core::mesh::Mesh;
use crate::core::mesh::square::{self, SquareGridSpec};
use crate::core::mesh::su2::{MeshWriter, Su2MeshFile};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::Path;
use tracing::{info, instrument};

#[instrument(skip_all, name = "square_mesh_workflow")]
pub fn run(
    spec: &SquareGridSpec,
    output: &Path,
    reporter: &ProgressReporter,
) -> Result<Mesh, EngineError> {
    reporter.report(Progress::phase("Mesh Generation"));
    reporter.report(Progress::TaskStart { total: 2 });

    let mesh = square::generate(spec)?;
    reporter.report(Progress::TaskIncrement { amount: 1 });

    reporter.report(Progress::status(format!("Writing {}", output.display())));
    Su2MeshFile::write_to_path(&mesh, output).map_err(|e| EngineError::io(output, e))?;
    reporter.report(Progress::TaskIncrement { amount: 1 });
    reporter.report(Progress::TaskFinish);

    info!(
        "Wrote {} points and {} elements to {:?}",
        mesh.points.len(),
        mesh.elements.len(),
        output
    );
    reporter.report(Progress::PhaseFinish);
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::MeshError;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[test]
    fn writes_mesh_and_reports_progress() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("square.su2");
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |p| {
            sink.lock().unwrap().push(p);
        }));
        let spec = SquareGridSpec {
            n_node: 3,
            m_node: 4,
            ..Default::default()
        };

        let mesh = run(&spec, &output, &reporter).unwrap();

        assert_eq!(mesh.points.len(), 12);
        assert_eq!(mesh.elements.len(), 6);
        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.contains("NDIME=2"));
        assert!(text.contains("NMARK=4"));

        let events = events.lock().unwrap();
        assert!(matches!(events.first(), Some(Progress::PhaseStart { .. })));
        assert!(matches!(events.last(), Some(Progress::PhaseFinish)));
    }

    #[test]
    fn invalid_spec_writes_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("square.su2");
        let spec = SquareGridSpec {
            n_node: 1,
            ..Default::default()
        };

        let err = run(&spec, &output, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Mesh {
                source: MeshError::TooFewNodes { .. }
            }
        ));
        assert!(!output.exists());
    }
}
