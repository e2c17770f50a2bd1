//! # Engine Module
//!
//! Stateful pieces shared by the workflows: how solver executables are located
//! and launched, the configuration each workflow accepts, progress reporting,
//! the result [`state::State`], and the engine error type.
//!
//! - **Configuration** ([`config`]) - Workflow parameters, compute modes, builders
//! - **Launching** ([`launcher`]) - Serial and MPI command lines, the runner seam
//! - **Progress Monitoring** ([`progress`]) - Phase and task events for front ends
//! - **Results** ([`state`]) - Objective values and gradients gathered by a run
//! - **Error Handling** ([`error`]) - Engine-level error type

pub mod config;
pub mod error;
pub mod launcher;
pub mod progress;
pub mod state;
