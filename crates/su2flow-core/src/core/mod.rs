//! # Core Module
//!
//! Stateless building blocks of the workflow driver: the SU2 configuration
//! model and its design-variable definitions, static naming tables, parsers
//! for solver output, plot writers, and the structured grid generator.
//!
//! - **Configuration** ([`config`]) - Ordered `KEY= value` files and `DEFINITION_DV`
//! - **Naming** ([`naming`]) - Output formats, adjoint suffixes, history column names
//! - **File I/O** ([`io`]) - History and gradient parsing, plot and gradient reports
//! - **Meshes** ([`mesh`]) - Square grid generation and SU2 mesh output

pub mod config;
pub mod io;
pub mod mesh;
pub mod naming;
