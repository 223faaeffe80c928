//! Data sources other than lab files.
//!
//! - seeded synthetic plates (`simulate`)

pub mod simulate;

pub use simulate::*;
