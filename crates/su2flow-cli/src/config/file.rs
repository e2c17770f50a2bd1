use crate::error::{CliError, Result};
use crate::utils::parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSolverConfig {
    pub su2_run: Option<PathBuf>,
    pub mpi_launcher: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileAdjointConfig {
    pub partitions: Option<usize>,
    pub compute: Option<String>,
    pub output: Option<bool>,
    pub step: Option<f64>,
    pub divide_grid: Option<bool>,
    pub report: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// A step is either one value for every design variable or a list.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum FileStep {
    Uniform(f64),
    PerVariable(Vec<f64>),
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileProjectionConfig {
    pub step: Option<FileStep>,
    pub log_file: Option<PathBuf>,
}

/// Contents of a `--workflow` TOML file. Every field is optional; missing
/// values fall back to command-line flags and built-in defaults.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct WorkflowFile {
    pub solver: Option<FileSolverConfig>,
    pub adjoint: Option<FileAdjointConfig>,
    pub projection: Option<FileProjectionConfig>,
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    parser::parse_bool(value)
        .map_err(|e| CliError::Config(format!("Invalid boolean value for {}: {}", key, e)))
}

impl WorkflowFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading workflow settings from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for assignment in set_values {
            let (key, value) = parser::parse_key_value(assignment).map_err(|e| {
                CliError::Config(format!("Invalid --set format: {}", e))
            })?;

            match key.as_str() {
                "solver.su2-run" => {
                    self.solver.get_or_insert_with(Default::default).su2_run =
                        Some(PathBuf::from(value));
                }
                "solver.mpi-launcher" => {
                    self.solver.get_or_insert_with(Default::default).mpi_launcher = Some(value);
                }
                "adjoint.partitions" => {
                    self.adjoint.get_or_insert_with(Default::default).partitions =
                        Some(parse_value(&key, &value, "integer")?);
                }
                "adjoint.compute" => {
                    self.adjoint.get_or_insert_with(Default::default).compute = Some(value);
                }
                "adjoint.output" => {
                    self.adjoint.get_or_insert_with(Default::default).output =
                        Some(parse_flag(&key, &value)?);
                }
                "adjoint.step" => {
                    self.adjoint.get_or_insert_with(Default::default).step =
                        Some(parse_value(&key, &value, "float")?);
                }
                "adjoint.divide-grid" => {
                    self.adjoint.get_or_insert_with(Default::default).divide_grid =
                        Some(parse_flag(&key, &value)?);
                }
                "adjoint.report" => {
                    self.adjoint.get_or_insert_with(Default::default).report = Some(value);
                }
                "adjoint.log-file" => {
                    self.adjoint.get_or_insert_with(Default::default).log_file =
                        Some(PathBuf::from(value));
                }
                "projection.step" => {
                    let steps = parser::parse_step_list(&value)
                        .map_err(|e| CliError::Config(e.to_string()))?;
                    let step = match steps.as_slice() {
                        [single] => FileStep::Uniform(*single),
                        _ => FileStep::PerVariable(steps),
                    };
                    self.projection.get_or_insert_with(Default::default).step = Some(step);
                }
                "projection.log-file" => {
                    self.projection.get_or_insert_with(Default::default).log_file =
                        Some(PathBuf::from(value));
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
