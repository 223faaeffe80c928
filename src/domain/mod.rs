//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run configuration enums (`Antigen`, `StandardSet`, `CallMode`)
//! - fit outputs (`FitParameters`, `FitQuality`)
//! - per-sample outputs (`Call`, `AbUnits`)
//! - the assay lookup tables (`tables`)

pub mod tables;
pub mod types;

pub use tables::*;
pub use types::*;
