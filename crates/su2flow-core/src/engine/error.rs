use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::config::dv::DvError;
use crate::core::io::gradient::GradientError;
use crate::core::io::history::HistoryError;
use crate::core::io::plot::PlotError;
use crate::core::io::surface::SurfaceError;
use crate::core::mesh::MeshError;
use crate::core::naming::NamingError;
use crate::engine::config::BuildError;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Config error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Invalid workflow configuration: {source}")]
    Build {
        #[from]
        source: BuildError,
    },

    #[error("Design variable error: {source}")]
    DesignVariable {
        #[from]
        source: DvError,
    },

    #[error("Naming error: {source}")]
    Naming {
        #[from]
        source: NamingError,
    },

    #[error("Failed to read history '{path}': {source}", path = path.display())]
    History {
        path: PathBuf,
        #[source]
        source: HistoryError,
    },

    #[error("Failed to process gradients '{path}': {source}", path = path.display())]
    Gradient {
        path: PathBuf,
        #[source]
        source: GradientError,
    },

    #[error("Failed to write plot '{path}': {source}", path = path.display())]
    Plot {
        path: PathBuf,
        #[source]
        source: PlotError,
    },

    #[error("Failed to filter surface sensitivities '{path}': {source}", path = path.display())]
    Surface {
        path: PathBuf,
        #[source]
        source: SurfaceError,
    },

    #[error("Mesh generation failed: {source}")]
    Mesh {
        #[from]
        source: MeshError,
    },

    #[error("Failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    SolverFailed { command: String, status: String },

    #[error("Workflow phase '{phase}' failed: {reason}")]
    PhaseFailed { phase: &'static str, reason: String },

    #[error("I/O error on '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}
