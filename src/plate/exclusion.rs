//! Exclusion resolver: apply an ignore list to the plate.
//!
//! Rules, per excluded well:
//!
//! - ordinary wells are deleted from their group (one fewer replicate)
//! - a row-23 standard (`std_curve1`) whose row-24 duplicate is also
//!   excluded drops the whole standard: both cells go and the concentration
//!   at that position leaves the series
//! - a row-23 standard whose duplicate survives takes the duplicate's reading
//! - a row-24 standard (`std_curve2`) is deleted outright, never substituted
//!   from row 23
//!
//! The last rule is asymmetric with the row-23 rule. It is kept as-is (see
//! the `row24_exclusion_*` tests): excluding only a row-24 cell leaves the
//! duplicate rows misaligned, which the curve builder rejects.

use std::collections::{BTreeSet, HashSet};

use log::{info, warn};

use crate::domain::IgnoreEntry;
use crate::error::AnalysisError;
use crate::plate::layout::{STD_CURVE1_GROUP, STD_CURVE2_CELLS, STD_CURVE2_GROUP, std_curve1_position};
use crate::plate::{PlateReadings, StandardSeries};

/// Plate and series after exclusions.
#[derive(Debug, Clone)]
pub struct ExclusionOutcome {
    pub plate: PlateReadings,
    pub series: StandardSeries,
    /// 0-based positions of standards dropped from the series.
    pub dropped_standards: Vec<usize>,
    /// Entries that were applied, de-duplicated, in ignore-list order.
    pub applied: Vec<IgnoreEntry>,
}

pub fn resolve_exclusions(
    mut plate: PlateReadings,
    mut series: StandardSeries,
    ignore: &[IgnoreEntry],
) -> Result<ExclusionOutcome, AnalysisError> {
    // Validate every entry against the untouched plate first, so that an
    // entry whose well is removed by an earlier entry (the row-24 partner of
    // a dropped standard) is not mistaken for an unknown well.
    let mut seen = HashSet::new();
    let mut applied = Vec::new();
    for entry in ignore {
        if !seen.insert(entry.well.as_str()) {
            continue;
        }
        let Some(actual) = plate.group_of(&entry.well) else {
            return Err(AnalysisError::UnknownWell {
                well: entry.well.clone(),
                group: entry.group.clone(),
            });
        };
        if actual != entry.group {
            warn!(
                "Ignore entry {}: listed as '{}' but the well belongs to '{actual}'.",
                entry.well, entry.group
            );
        }
        applied.push(IgnoreEntry::new(entry.well.clone(), actual));
    }

    let excluded: HashSet<&str> = applied.iter().map(|e| e.well.as_str()).collect();
    let mut dropped = BTreeSet::new();

    for entry in &applied {
        if let Some(pos) = std_curve1_position(&entry.well) {
            let partner = STD_CURVE2_CELLS[pos];
            if excluded.contains(partner) {
                dropped.insert(pos);
                plate.remove(&entry.group, &entry.well);
                plate.remove(STD_CURVE2_GROUP, partner);
            } else {
                let od = plate.od(STD_CURVE2_GROUP, partner).ok_or_else(|| AnalysisError::UnknownWell {
                    well: partner.to_string(),
                    group: STD_CURVE2_GROUP.to_string(),
                })?;
                plate.set_od(STD_CURVE1_GROUP, &entry.well, od);
            }
        } else {
            // Row-24 standards fall through here too: deleted, not substituted.
            plate.remove(&entry.group, &entry.well);
        }
    }

    for &pos in &dropped {
        series.drop_position(pos);
    }
    if !applied.is_empty() {
        info!(
            "Excluded {} well(s); dropped {} standard(s).",
            applied.len(),
            dropped.len()
        );
    }

    Ok(ExclusionOutcome {
        plate,
        series,
        dropped_standards: dropped.into_iter().collect(),
        applied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StandardSet;
    use crate::plate::layout::STD_CURVE1_CELLS;

    fn plate() -> PlateReadings {
        let mut p = PlateReadings::new();
        for (i, (c1, c2)) in STD_CURVE1_CELLS.iter().zip(STD_CURVE2_CELLS.iter()).enumerate() {
            p.push(STD_CURVE1_GROUP, *c1, 2.0 - 0.1 * i as f64);
            p.push(STD_CURVE2_GROUP, *c2, 2.05 - 0.1 * i as f64);
        }
        p.push("sample01", "A1", 0.30);
        p.push("sample01", "A2", 0.32);
        p.push("sample01", "A3", 0.90);
        p
    }

    fn run(ignore: &[IgnoreEntry]) -> Result<ExclusionOutcome, AnalysisError> {
        resolve_exclusions(plate(), StandardSeries::from_set(StandardSet::Hero), ignore)
    }

    #[test]
    fn ordinary_well_is_deleted() {
        let out = run(&[IgnoreEntry::new("A3", "sample01")]).unwrap();
        assert_eq!(out.plate.ods("sample01").unwrap(), vec![0.30, 0.32]);
        assert!(out.dropped_standards.is_empty());
        assert_eq!(out.series.len(), 12);
    }

    #[test]
    fn paired_standard_exclusion_drops_in_lockstep() {
        let out = run(&[
            IgnoreEntry::new("E23", "std_curve1"),
            IgnoreEntry::new("E24", "std_curve2"),
        ])
        .unwrap();
        assert_eq!(out.dropped_standards, vec![3]);
        assert_eq!(out.series.len(), 11);
        assert!(!out.series.contains(3));
        assert!(!out.series.concentrations().contains(&186.5889213));
        assert_eq!(out.plate.ods(STD_CURVE1_GROUP).unwrap().len(), 11);
        assert_eq!(out.plate.ods(STD_CURVE2_GROUP).unwrap().len(), 11);
        assert_eq!(out.plate.od(STD_CURVE1_GROUP, "E23"), None);
        assert_eq!(out.plate.od(STD_CURVE2_GROUP, "E24"), None);
    }

    #[test]
    fn paired_exclusion_is_order_independent() {
        let out = run(&[
            IgnoreEntry::new("E24", "std_curve2"),
            IgnoreEntry::new("E23", "std_curve1"),
        ])
        .unwrap();
        assert_eq!(out.dropped_standards, vec![3]);
        assert_eq!(out.plate.ods(STD_CURVE1_GROUP).unwrap().len(), 11);
        assert_eq!(out.plate.ods(STD_CURVE2_GROUP).unwrap().len(), 11);
    }

    #[test]
    fn row23_exclusion_takes_duplicate_reading() {
        let out = run(&[IgnoreEntry::new("C23", "std_curve1")]).unwrap();
        assert!(out.dropped_standards.is_empty());
        assert_eq!(out.series.len(), 12);
        let dup = out.plate.od(STD_CURVE2_GROUP, "C24").unwrap();
        assert_eq!(out.plate.od(STD_CURVE1_GROUP, "C23"), Some(dup));
    }

    #[test]
    fn row24_exclusion_deletes_without_substitution() {
        let out = run(&[IgnoreEntry::new("C24", "std_curve2")]).unwrap();
        assert!(out.dropped_standards.is_empty());
        assert_eq!(out.series.len(), 12);
        assert_eq!(out.plate.od(STD_CURVE2_GROUP, "C24"), None);
        assert_eq!(out.plate.ods(STD_CURVE1_GROUP).unwrap().len(), 12);
        assert_eq!(out.plate.ods(STD_CURVE2_GROUP).unwrap().len(), 11);
    }

    #[test]
    fn unknown_well_is_a_lookup_error() {
        let err = run(&[IgnoreEntry::new("Z99", "sample01")]).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::UnknownWell {
                well: "Z99".to_string(),
                group: "sample01".to_string()
            }
        );
    }

    #[test]
    fn duplicate_entries_and_wrong_group_labels_are_tolerated() {
        let out = run(&[
            IgnoreEntry::new("A1", "sample02"),
            IgnoreEntry::new("A1", "sample01"),
        ])
        .unwrap();
        assert_eq!(out.applied, vec![IgnoreEntry::new("A1", "sample01")]);
        assert_eq!(out.plate.ods("sample01").unwrap(), vec![0.32, 0.90]);
    }
}
