use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),
}

/// Results gathered by a workflow run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Iterations taken by the direct solution, when one was run.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub iterations: Option<usize>,
    /// Final objective values keyed by canonical name (`DRAG`, `LIFT`, ...).
    pub functions: BTreeMap<String, f64>,
    /// Raw gradients keyed by objective (`COMBO` for multi-objective runs).
    pub gradients: BTreeMap<String, Vec<f64>>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: State) {
        self.functions.extend(other.functions);
        self.gradients.extend(other.gradients);
        if other.iterations.is_some() {
            self.iterations = other.iterations;
        }
    }

    pub fn to_toml(&self) -> Result<String, StateError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn write_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), StateError> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
