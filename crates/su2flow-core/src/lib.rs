//! # su2flow
//!
//! Orchestration library for SU2 CFD workflows. The numerical work happens in
//! the external SU2 executables; this crate edits their configuration files,
//! launches them serially or under MPI, parses the histories and gradients
//! they write, and emits plot-ready text files.
//!
//! ## Layers
//!
//! - **[`core`]: The Foundation.** Stateless models and file formats: the
//!   ordered SU2 config, design-variable definitions, history and gradient
//!   parsers, plot writers, and the structured grid generator.
//!
//! - **[`engine`]: The Plumbing.** Solver launching behind the
//!   [`engine::launcher::SolverRunner`] trait, workflow configuration,
//!   progress reporting, and result state.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures: the continuous
//!   adjoint driver, gradient projection, and square mesh generation.

pub mod core;
pub mod engine;
pub mod workflows;
