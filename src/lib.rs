//! `elisa-curves` library crate.
//!
//! The binary (`elisa`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - each pipeline stage can be exercised on its own
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plate;
pub mod plot;
pub mod qc;
pub mod report;
pub mod results;
