//! # Workflows Module
//!
//! Top-level entry points. Each workflow takes its configuration, a
//! [`Launcher`](crate::engine::launcher::Launcher) describing where the
//! solver lives, a [`SolverRunner`](crate::engine::launcher::SolverRunner)
//! that executes command lines, and a progress reporter.
//!
//! - **Continuous Adjoint** ([`adjoint`]) - Direct, adjoint, optional filtering, gradient projection
//! - **Gradient Projection** ([`projection`]) - SU2_DOT projection of surface sensitivities
//! - **Mesh Generation** ([`mesh`]) - Structured square grids in SU2 format

pub mod adjoint;
pub mod mesh;
pub mod projection;
