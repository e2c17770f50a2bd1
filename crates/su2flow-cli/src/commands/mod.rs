pub mod adjoint;
pub mod config;
pub mod mesh;
pub mod project;

use crate::error::Result;
use crate::ui::UiEvent;
use anyhow::Context;
use std::path::{Path, PathBuf};
use su2flow::engine::state::State;
use tokio::sync::mpsc;
use tracing::info;

/// Settings shared by every subcommand, taken from the global flags.
pub struct CommandContext {
    pub workflow: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub ui_sender: mpsc::Sender<UiEvent>,
}

pub(crate) fn write_summary(state: &State, path: &Path) -> Result<()> {
    state
        .write_toml(path)
        .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    info!("Summary written to {:?}", path);
    Ok(())
}

/// Human readable result lines for the terminal.
pub(crate) fn summary_lines(state: &State) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(iterations) = state.iterations {
        lines.push(format!("Direct solution iterations: {}", iterations));
    }
    for (name, value) in &state.functions {
        lines.push(format!("{:<20} = {:.6e}", name, value));
    }
    for (objective, gradients) in &state.gradients {
        lines.push(format!(
            "Gradient of {} ({} design variables):",
            objective,
            gradients.len()
        ));
        for (i, g) in gradients.iter().enumerate() {
            lines.push(format!("  [{:>3}] {:.10e}", i, g));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> State {
        let mut state = State::new();
        state.iterations = Some(120);
        state.functions.insert("DRAG".into(), 0.0125);
        state.gradients.insert("DRAG".into(), vec![0.5, -0.25]);
        state
    }

    #[test]
    fn summary_lines_list_functions_and_gradients() {
        let lines = summary_lines(&state());
        assert_eq!(lines[0], "Direct solution iterations: 120");
        assert!(lines[1].starts_with("DRAG"));
        assert!(lines[1].ends_with("1.250000e-2"));
        assert_eq!(lines[2], "Gradient of DRAG (2 design variables):");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn summary_file_is_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.toml");
        write_summary(&state(), &path).unwrap();
        let parsed: State = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, state());
    }

    #[test]
    fn unwritable_summary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("summary.toml");
        assert!(write_summary(&state(), &path).is_err());
    }
}
