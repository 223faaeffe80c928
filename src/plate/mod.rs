//! Plate data and the stages that clean it before fitting.
//!
//! - `store`: the well-data store
//! - `layout`: group names, standard cells and sample slots
//! - `series`: the standard concentration series
//! - `exclusion`: ignore-list handling
//! - `blank`: blank subtraction

pub mod blank;
pub mod exclusion;
pub mod layout;
pub mod series;
pub mod store;

pub use blank::*;
pub use exclusion::*;
pub use series::*;
pub use store::*;
