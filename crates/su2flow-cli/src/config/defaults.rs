use su2flow::engine::config::{
    ComputeMode, DEFAULT_ADJOINT_LOG, DEFAULT_ADJOINT_STEP, DEFAULT_PROJECTION_STEP, Report,
};
use su2flow::engine::launcher::DEFAULT_MPI_LAUNCHER;

pub struct DefaultsConfig {
    pub mpi_launcher: String,
    pub partitions: usize,
    pub compute: ComputeMode,
    pub output: bool,
    pub divide_grid: bool,
    pub adjoint_step: f64,
    pub report: Report,
    pub adjoint_log: String,
    pub projection_step: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            mpi_launcher: DEFAULT_MPI_LAUNCHER.to_string(),
            partitions: 1,
            compute: ComputeMode::All,
            output: true,
            divide_grid: true,
            adjoint_step: DEFAULT_ADJOINT_STEP,
            report: Report::Verbose,
            adjoint_log: DEFAULT_ADJOINT_LOG.to_string(),
            projection_step: DEFAULT_PROJECTION_STEP,
        }
    }
}
