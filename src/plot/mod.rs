//! Standard-curve plots: terminal (`ascii`) and SVG (`svg`).

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;
