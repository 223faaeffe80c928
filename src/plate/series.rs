//! Known concentrations of the standards, tracked by original position.

use crate::domain::{StandardSet, standard_label};

/// The concentration series after exclusions.
///
/// Each surviving standard keeps its original 0-based position so that the
/// series, both duplicate rows and the `StdNN` labels stay aligned when a
/// standard is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardSeries {
    entries: Vec<(usize, f64)>,
}

impl StandardSeries {
    pub fn from_set(set: StandardSet) -> Self {
        Self::from_concentrations(set.concentrations())
    }

    pub fn from_concentrations(concs: &[f64]) -> Self {
        Self {
            entries: concs.iter().copied().enumerate().collect(),
        }
    }

    /// Remove the standard at original position `position`, if still present.
    pub fn drop_position(&mut self, position: usize) {
        self.entries.retain(|(p, _)| *p != position);
    }

    pub fn contains(&self, position: usize) -> bool {
        self.entries.iter().any(|(p, _)| *p == position)
    }

    /// `(original position, concentration)` pairs in series order.
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn concentrations(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, c)| *c).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|(p, _)| standard_label(*p)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
