//! Well-data store: ordered well groups with one OD reading per well.
//!
//! Order matters in two places: replicate wells are reported in load order,
//! and the two standard rows are read positionally. Groups and wells are
//! therefore kept in `Vec`s rather than hash maps.

use crate::error::AnalysisError;

#[derive(Debug, Clone, PartialEq)]
pub struct WellReading {
    pub well: String,
    pub od: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WellGroup {
    pub name: String,
    pub wells: Vec<WellReading>,
}

impl WellGroup {
    pub fn ods(&self) -> Vec<f64> {
        self.wells.iter().map(|w| w.od).collect()
    }
}

/// All readings of one plate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlateReadings {
    groups: Vec<WellGroup>,
}

impl PlateReadings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reading, creating the group on first use.
    pub fn push(&mut self, group: &str, well: impl Into<String>, od: f64) {
        let reading = WellReading { well: well.into(), od };
        match self.groups.iter_mut().find(|g| g.name == group) {
            Some(g) => g.wells.push(reading),
            None => self.groups.push(WellGroup {
                name: group.to_string(),
                wells: vec![reading],
            }),
        }
    }

    pub fn groups(&self) -> &[WellGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&WellGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// ODs of a group, in well order.
    pub fn ods(&self, group: &str) -> Result<Vec<f64>, AnalysisError> {
        self.group(group)
            .map(WellGroup::ods)
            .ok_or_else(|| AnalysisError::MissingGroup(group.to_string()))
    }

    /// Reading of `well` within `group`.
    pub fn od(&self, group: &str, well: &str) -> Option<f64> {
        self.group(group)?.wells.iter().find(|w| w.well == well).map(|w| w.od)
    }

    /// Group name that holds `well`, searching every group.
    pub fn group_of(&self, well: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.wells.iter().any(|w| w.well == well))
            .map(|g| g.name.as_str())
    }

    /// Overwrite an existing reading. Returns `false` if the well is absent.
    pub fn set_od(&mut self, group: &str, well: &str, od: f64) -> bool {
        let slot = self
            .groups
            .iter_mut()
            .find(|g| g.name == group)
            .and_then(|g| g.wells.iter_mut().find(|w| w.well == well));
        match slot {
            Some(w) => {
                w.od = od;
                true
            }
            None => false,
        }
    }

    /// Remove a reading if present. The group itself is kept even when it
    /// becomes empty.
    pub fn remove(&mut self, group: &str, well: &str) -> Option<f64> {
        let g = self.groups.iter_mut().find(|g| g.name == group)?;
        let idx = g.wells.iter().position(|w| w.well == well)?;
        Some(g.wells.remove(idx).od)
    }

    /// Apply `f` to every reading of every group.
    pub fn map_ods<F: Fn(f64) -> f64>(mut self, f: F) -> Self {
        for g in &mut self.groups {
            for w in &mut g.wells {
                w.od = f(w.od);
            }
        }
        self
    }

    pub fn well_count(&self) -> usize {
        self.groups.iter().map(|g| g.wells.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plate() -> PlateReadings {
        let mut p = PlateReadings::new();
        p.push("blk", "A1", 0.05);
        p.push("sample01", "B1", 0.4);
        p.push("blk", "A2", 0.07);
        p.push("sample01", "B2", 0.5);
        p
    }

    #[test]
    fn groups_keep_load_order() {
        let p = plate();
        let names: Vec<&str> = p.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["blk", "sample01"]);
        assert_eq!(p.ods("blk").unwrap(), vec![0.05, 0.07]);
        assert_eq!(p.well_count(), 4);
    }

    #[test]
    fn lookup_set_and_remove() {
        let mut p = plate();
        assert_eq!(p.group_of("B2"), Some("sample01"));
        assert_eq!(p.od("sample01", "B2"), Some(0.5));
        assert!(p.set_od("sample01", "B2", 0.45));
        assert!(!p.set_od("sample01", "Z9", 1.0));
        assert_eq!(p.remove("sample01", "B1"), Some(0.4));
        assert_eq!(p.remove("sample01", "B1"), None);
        assert_eq!(p.ods("sample01").unwrap(), vec![0.45]);
        assert_eq!(p.ods("neg"), Err(AnalysisError::MissingGroup("neg".to_string())));
    }

    #[test]
    fn map_ods_touches_every_group() {
        let p = plate().map_ods(|od| od - 0.05);
        assert!((p.ods("sample01").unwrap()[1] - 0.45).abs() < 1e-12);
        assert!(p.ods("blk").unwrap()[0].abs() < 1e-12);
    }
}
