//! Plate layout conventions.
//!
//! The standard curve occupies columns B..M of rows 23 (`std_curve1`) and 24
//! (`std_curve2`); the cell at index *i* in one row is the duplicate of the
//! cell at index *i* in the other, and both correspond to concentration *i*
//! of the selected standard series.

use crate::error::AnalysisError;

pub const BLANK_GROUP: &str = "blk";
pub const POSITIVE_CONTROL_GROUP: &str = "pos";
pub const NEGATIVE_CONTROL_GROUP: &str = "neg";
pub const STD_CURVE1_GROUP: &str = "std_curve1";
pub const STD_CURVE2_GROUP: &str = "std_curve2";

/// Number of clinical sample slots on a plate.
pub const SAMPLE_SLOT_COUNT: usize = 32;

/// Plate-plan descriptor for an unused sample slot.
pub const EMPTY_DESCRIPTOR: &str = "EMPTY";

pub const STD_CURVE1_CELLS: [&str; 12] = [
    "B23", "C23", "D23", "E23", "F23", "G23", "H23", "I23", "J23", "K23", "L23", "M23",
];
pub const STD_CURVE2_CELLS: [&str; 12] = [
    "B24", "C24", "D24", "E24", "F24", "G24", "H24", "I24", "J24", "K24", "L24", "M24",
];

/// Position of a row-23 standard cell.
pub fn std_curve1_position(well: &str) -> Option<usize> {
    STD_CURVE1_CELLS.iter().position(|c| *c == well)
}

/// Group name of the 1-based sample slot (`sample01`..`sample32`).
pub fn sample_group_name(slot: usize) -> String {
    format!("sample{slot:02}")
}

/// A plate-plan descriptor split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleDescriptor {
    Named { name: String, dilution: String },
    Empty,
}

impl SampleDescriptor {
    /// Parse `NAME-DILUTION` (first two `-` separated parts) or `EMPTY`.
    pub fn parse(group: &str, raw: &str) -> Result<Self, AnalysisError> {
        let raw = raw.trim();
        let mut parts = raw.split('-');
        let name = parts.next().unwrap_or_default();
        if name == EMPTY_DESCRIPTOR {
            return Ok(SampleDescriptor::Empty);
        }
        match (name, parts.next()) {
            (name, Some(dilution)) if !name.is_empty() && !dilution.is_empty() => Ok(SampleDescriptor::Named {
                name: name.to_string(),
                dilution: dilution.to_string(),
            }),
            _ => Err(AnalysisError::MalformedDescriptor {
                group: group.to_string(),
                descriptor: raw.to_string(),
            }),
        }
    }
}

/// One of the 32 clinical sample positions on the plate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSlot {
    /// 1-based slot number.
    pub slot: usize,
    /// Well group in the plate-reader data (`sampleNN`).
    pub group: String,
    /// Descriptor exactly as written in the plate plan.
    pub raw_descriptor: String,
    pub descriptor: SampleDescriptor,
}

impl SampleSlot {
    /// Sample id shown in reports: the name part, or `EMPTY`.
    pub fn sample_id(&self) -> &str {
        match &self.descriptor {
            SampleDescriptor::Named { name, .. } => name,
            SampleDescriptor::Empty => EMPTY_DESCRIPTOR,
        }
    }

    pub fn dilution(&self) -> Option<&str> {
        match &self.descriptor {
            SampleDescriptor::Named { dilution, .. } => Some(dilution),
            SampleDescriptor::Empty => None,
        }
    }
}

/// Build the 32 sample slots from plate-plan descriptors.
///
/// `lookup` returns the raw descriptor for a group name.
pub fn build_sample_slots<'a, F>(lookup: F) -> Result<Vec<SampleSlot>, AnalysisError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    (1..=SAMPLE_SLOT_COUNT)
        .map(|slot| {
            let group = sample_group_name(slot);
            let raw = lookup(&group).ok_or_else(|| AnalysisError::MissingSampleMetadata(group.clone()))?;
            let descriptor = SampleDescriptor::parse(&group, raw)?;
            Ok(SampleSlot {
                slot,
                group,
                raw_descriptor: raw.trim().to_string(),
                descriptor,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn duplicate_cells_share_positions() {
        for (i, (c1, c2)) in STD_CURVE1_CELLS.iter().zip(STD_CURVE2_CELLS.iter()).enumerate() {
            assert_eq!(std_curve1_position(c1), Some(i));
            assert_eq!(&c1[..1], &c2[..1]);
        }
        assert_eq!(std_curve1_position("B24"), None);
    }

    #[test]
    fn descriptor_parsing() {
        assert_eq!(
            SampleDescriptor::parse("sample01", "PT0042-100").unwrap(),
            SampleDescriptor::Named {
                name: "PT0042".to_string(),
                dilution: "100".to_string()
            }
        );
        // Only the first two parts are used.
        assert_eq!(
            SampleDescriptor::parse("sample02", "AB-50-x").unwrap(),
            SampleDescriptor::Named {
                name: "AB".to_string(),
                dilution: "50".to_string()
            }
        );
        assert_eq!(SampleDescriptor::parse("sample03", "EMPTY").unwrap(), SampleDescriptor::Empty);
        assert!(SampleDescriptor::parse("sample04", "nodilution").is_err());
    }

    #[test]
    fn slots_require_every_sample_in_plan() {
        let mut plan: HashMap<String, String> = (1..=SAMPLE_SLOT_COUNT)
            .map(|i| (sample_group_name(i), format!("S{i}-50")))
            .collect();
        let slots = build_sample_slots(|g| plan.get(g).map(String::as_str)).unwrap();
        assert_eq!(slots.len(), 32);
        assert_eq!(slots[0].group, "sample01");
        assert_eq!(slots[31].sample_id(), "S32");
        assert_eq!(slots[31].dilution(), Some("50"));

        plan.remove("sample17");
        let err = build_sample_slots(|g| plan.get(g).map(String::as_str)).unwrap_err();
        assert_eq!(err, AnalysisError::MissingSampleMetadata("sample17".to_string()));
    }
}
