//! Building and running solver command lines.
//!
//! A [`Launcher`] turns a [`Tool`] and a config path into an [`Invocation`];
//! a [`SolverRunner`] executes it. Workflows only talk to the runner trait so
//! the external executables can be replaced in tests.

use super::error::EngineError;
use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

pub const SU2_RUN_ENV: &str = "SU2_RUN";
pub const DEFAULT_MPI_LAUNCHER: &str = "mpirun";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Flow and adjoint solver.
    Cfd,
    /// Gradient projection (discrete/continuous adjoint to design variables).
    Dot,
    /// Legacy gradient projection used by the continuous adjoint driver.
    Gpc,
    /// Domain decomposition.
    Ddc,
    /// Merges partitioned solutions.
    Sol,
}

impl Tool {
    pub fn executable(&self) -> &'static str {
        match self {
            Tool::Cfd => "SU2_CFD",
            Tool::Dot => "SU2_DOT",
            Tool::Gpc => "SU2_GPC",
            Tool::Ddc => "SU2_DDC",
            Tool::Sol => "SU2_SOL",
        }
    }

    pub fn supports_mpi(&self) -> bool {
        !matches!(self, Tool::Sol)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub tool: Tool,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Solver output is appended here instead of inheriting the terminal.
    pub log_file: Option<PathBuf>,
}

impl Invocation {
    /// The config file passed to the tool, always the last argument.
    pub fn config_path(&self) -> PathBuf {
        let name = self.args.last().map(String::as_str).unwrap_or_default();
        self.working_dir.join(name)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        if let Some(log) = &self.log_file {
            write!(f, " >> {}", log.display())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    pub su2_run: Option<PathBuf>,
    pub mpi_launcher: String,
    pub partitions: usize,
}

impl Default for Launcher {
    fn default() -> Self {
        Self {
            su2_run: None,
            mpi_launcher: DEFAULT_MPI_LAUNCHER.to_string(),
            partitions: 1,
        }
    }
}

impl Launcher {
    pub fn new(su2_run: Option<PathBuf>) -> Self {
        Self {
            su2_run,
            ..Default::default()
        }
    }

    /// Reads the solver install directory from `SU2_RUN`.
    pub fn from_env() -> Self {
        Self::new(std::env::var_os(SU2_RUN_ENV).map(PathBuf::from))
    }

    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions.max(1);
        self
    }

    pub fn with_mpi_launcher(mut self, launcher: impl Into<String>) -> Self {
        self.mpi_launcher = launcher.into();
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.partitions > 1
    }

    pub fn tool_path(&self, tool: Tool) -> PathBuf {
        match &self.su2_run {
            Some(dir) => dir.join(tool.executable()),
            None => PathBuf::from(tool.executable()),
        }
    }

    /// `config` is resolved relative to the directory it lives in, which
    /// becomes the working directory of the tool.
    pub fn invocation(&self, tool: Tool, config: &Path, log_file: Option<&Path>) -> Invocation {
        let working_dir = config
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let config_name = config
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let (program, args) = if self.is_parallel() && tool.supports_mpi() {
            (
                PathBuf::from(&self.mpi_launcher),
                vec![
                    "-np".to_string(),
                    self.partitions.to_string(),
                    self.tool_path(tool).to_string_lossy().into_owned(),
                    config_name,
                ],
            )
        } else {
            (self.tool_path(tool), vec![config_name])
        };

        Invocation {
            tool,
            program,
            args,
            working_dir,
            log_file: log_file.map(Path::to_path_buf),
        }
    }
}

pub trait SolverRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), EngineError>;
}

impl<F> SolverRunner for F
where
    F: Fn(&Invocation) -> Result<(), EngineError>,
{
    fn run(&self, invocation: &Invocation) -> Result<(), EngineError> {
        self(invocation)
    }
}

/// Runs invocations as child processes and waits for them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl SolverRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), EngineError> {
        let command_line = invocation.to_string();
        info!("Running `{}` in {:?}", command_line, invocation.working_dir);

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(&invocation.working_dir);

        if let Some(log_path) = &invocation.log_file {
            let log_path = invocation.working_dir.join(log_path);
            let log = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .map_err(|e| EngineError::io(&log_path, e))?;
            let log_err = log.try_clone().map_err(|e| EngineError::io(&log_path, e))?;
            command
                .stdout(Stdio::from(log))
                .stderr(Stdio::from(log_err));
        }

        let status = command.status().map_err(|e| EngineError::Launch {
            command: command_line.clone(),
            source: e,
        })?;
        debug!("`{}` finished with {}", command_line, status);

        if status.success() {
            Ok(())
        } else {
            Err(EngineError::SolverFailed {
                command: command_line,
                status: status.to_string(),
            })
        }
    }
}
