//! Standard-curve model.
//!
//! The 4PL curve is implemented as small, pure functions so that the fitter,
//! the result calculator and the plotters can share one definition.

pub mod logistic;

pub use logistic::*;
