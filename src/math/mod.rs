//! Mathematical utilities: replicate statistics, the sign-preserving power,
//! linear least squares and Levenberg–Marquardt.

pub mod lm;
pub mod ols;
pub mod power;
pub mod stats;

pub use lm::*;
pub use ols::*;
pub use power::*;
pub use stats::*;
