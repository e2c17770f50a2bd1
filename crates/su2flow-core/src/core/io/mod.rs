//! Readers for solver output files and writers for plot-ready text output.
//!
//! The solver writes convergence histories and raw gradient files in either
//! Tecplot ASCII or CSV flavours; this module parses both and emits gradient
//! reports in the same two flavours.

pub mod gradient;
pub mod history;
pub mod plot;
pub mod surface;
