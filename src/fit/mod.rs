//! Standard-curve fitting.
//!
//! Responsibilities:
//!
//! - align the surviving standards from both duplicate rows (`standards`)
//! - fit the 4PL curve to their midpoints (`fitter`)

pub mod fitter;
pub mod standards;

pub use fitter::*;
pub use standards::*;
