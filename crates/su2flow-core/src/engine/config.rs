use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_ADJOINT_LOG: &str = "SU2_CADJ.out";
pub const DEFAULT_ADJOINT_STEP: f64 = 1e-4;
pub const DEFAULT_PROJECTION_STEP: f64 = 1e-3;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum BuildError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("Unrecognized compute option '{0}'")]
    UnknownComputeMode(String),
    #[error("Unrecognized report verbosity '{0}'")]
    UnknownReport(String),
}

/// Which stages of the continuous adjoint pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComputeMode {
    #[default]
    All,
    Direct,
    Adjoint,
    Gradient,
    Filtered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stages {
    pub flow: bool,
    pub adjoint: bool,
    pub filter: bool,
    pub gradient: bool,
}

impl ComputeMode {
    pub fn stages(&self) -> Stages {
        let (flow, adjoint, filter, gradient) = match self {
            ComputeMode::All => (true, true, false, true),
            ComputeMode::Direct => (true, false, false, false),
            ComputeMode::Adjoint => (false, true, false, true),
            ComputeMode::Gradient => (false, false, false, true),
            ComputeMode::Filtered => (true, true, true, true),
        };
        Stages {
            flow,
            adjoint,
            filter,
            gradient,
        }
    }
}

impl FromStr for ComputeMode {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "true" | "all" => Ok(ComputeMode::All),
            "direct" => Ok(ComputeMode::Direct),
            "adjoint" => Ok(ComputeMode::Adjoint),
            "gradient" | "false" => Ok(ComputeMode::Gradient),
            "filtered" => Ok(ComputeMode::Filtered),
            _ => Err(BuildError::UnknownComputeMode(s.to_string())),
        }
    }
}

impl fmt::Display for ComputeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComputeMode::All => "all",
            ComputeMode::Direct => "direct",
            ComputeMode::Adjoint => "adjoint",
            ComputeMode::Gradient => "gradient",
            ComputeMode::Filtered => "filtered",
        };
        f.write_str(name)
    }
}

/// How much solver output reaches the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Report {
    Quiet,
    Concise,
    #[default]
    Verbose,
}

impl Report {
    /// Quiet and concise runs send solver output to the log file.
    pub fn uses_log_file(&self) -> bool {
        !matches!(self, Report::Verbose)
    }
}

impl FromStr for Report {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quiet" => Ok(Report::Quiet),
            "concise" => Ok(Report::Concise),
            "verbose" => Ok(Report::Verbose),
            _ => Err(BuildError::UnknownReport(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdjointConfig {
    pub config_path: PathBuf,
    pub partitions: usize,
    pub compute: ComputeMode,
    pub output: bool,
    pub step: f64,
    pub divide_grid: bool,
    pub report: Report,
    pub log_file: PathBuf,
}

impl AdjointConfig {
    pub fn is_parallel(&self) -> bool {
        self.partitions > 1
    }

    /// `None` when solver output should go to the terminal.
    pub fn effective_log_file(&self) -> Option<&std::path::Path> {
        self.report
            .uses_log_file()
            .then_some(self.log_file.as_path())
    }
}

#[derive(Default)]
pub struct AdjointConfigBuilder {
    config_path: Option<PathBuf>,
    partitions: Option<usize>,
    compute: Option<ComputeMode>,
    output: Option<bool>,
    step: Option<f64>,
    divide_grid: Option<bool>,
    report: Option<Report>,
    log_file: Option<PathBuf>,
}

impl AdjointConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }
    pub fn partitions(mut self, partitions: usize) -> Self {
        self.partitions = Some(partitions);
        self
    }
    pub fn compute(mut self, mode: ComputeMode) -> Self {
        self.compute = Some(mode);
        self
    }
    pub fn output(mut self, output: bool) -> Self {
        self.output = Some(output);
        self
    }
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }
    pub fn divide_grid(mut self, divide: bool) -> Self {
        self.divide_grid = Some(divide);
        self
    }
    pub fn report(mut self, report: Report) -> Self {
        self.report = Some(report);
        self
    }
    pub fn log_file(mut self, path: PathBuf) -> Self {
        self.log_file = Some(path);
        self
    }

    pub fn build(self) -> Result<AdjointConfig, BuildError> {
        let config_path = self
            .config_path
            .ok_or(BuildError::MissingParameter("config_path"))?;
        let partitions = self.partitions.unwrap_or(1);
        if partitions == 0 {
            return Err(BuildError::InvalidParameter {
                name: "partitions",
                reason: "must be at least 1".to_string(),
            });
        }
        let step = self.step.unwrap_or(DEFAULT_ADJOINT_STEP);
        if !step.is_finite() || step == 0.0 {
            return Err(BuildError::InvalidParameter {
                name: "step",
                reason: format!("finite difference step must be finite and non-zero, got {}", step),
            });
        }
        Ok(AdjointConfig {
            config_path,
            partitions,
            compute: self.compute.unwrap_or_default(),
            output: self.output.unwrap_or(true),
            step,
            divide_grid: self.divide_grid.unwrap_or(true),
            report: self.report.unwrap_or_default(),
            log_file: self
                .log_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ADJOINT_LOG)),
        })
    }
}

/// Finite-difference step for gradient projection: one value for every
/// design variable, or one per design variable.
#[derive(Debug, Clone, PartialEq)]
pub enum StepSize {
    Uniform(f64),
    PerVariable(Vec<f64>),
}

impl StepSize {
    pub fn expand(&self, n_dv: usize) -> Result<Vec<f64>, BuildError> {
        match self {
            StepSize::Uniform(step) => Ok(vec![*step; n_dv]),
            StepSize::PerVariable(steps) if steps.len() == n_dv => Ok(steps.clone()),
            StepSize::PerVariable(steps) => Err(BuildError::InvalidParameter {
                name: "step",
                reason: format!(
                    "unexpected step vector length {} for {} design variables",
                    steps.len(),
                    n_dv
                ),
            }),
        }
    }
}

impl Default for StepSize {
    fn default() -> Self {
        StepSize::Uniform(DEFAULT_PROJECTION_STEP)
    }
}

impl From<Vec<f64>> for StepSize {
    fn from(steps: Vec<f64>) -> Self {
        match steps.as_slice() {
            [single] => StepSize::Uniform(*single),
            _ => StepSize::PerVariable(steps),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    pub config_path: PathBuf,
    pub step: StepSize,
    pub log_file: Option<PathBuf>,
}
