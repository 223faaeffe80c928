//! Quality control: replicate CVs of standards and samples, and the
//! index-standard gate.
//!
//! Standard CVs are taken from blank-subtracted duplicates. Sample CVs are
//! taken from the raw replicate wells, *before* blank subtraction, while the
//! sample mean and concentration are computed afterwards. The pipeline calls
//! `sample_cvs` ahead of `plate::normalize_blanks` to keep that ordering.

use crate::domain::{INDEX_STANDARD_POSITIONS, STANDARD_CV_LIMIT, standard_label};
use crate::error::AnalysisError;
use crate::fit::StandardCurve;
use crate::math::{group_stats, round_to};
use crate::plate::PlateReadings;
use crate::plate::layout::SampleSlot;

/// CV of one standard's two duplicate readings.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardQc {
    pub position: usize,
    pub label: String,
    pub mean: f64,
    pub cv: f64,
    pub failed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexStandardStatus {
    /// Passed QC; `mean` is its blank-subtracted midpoint OD.
    Usable { mean: f64 },
    Failed { cv: f64 },
    /// Removed from the curve by the ignore list.
    Dropped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexStandard {
    pub position: usize,
    pub label: String,
    pub status: IndexStandardStatus,
}

impl IndexStandard {
    pub fn usable_mean(&self) -> Option<f64> {
        match self.status {
            IndexStandardStatus::Usable { mean } => Some(mean),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QcSummary {
    pub standards: Vec<StandardQc>,
    /// Std09, Std10, Std11 in that order.
    pub index_standards: Vec<IndexStandard>,
}

impl QcSummary {
    pub fn failed_standards(&self) -> impl Iterator<Item = &StandardQc> {
        self.standards.iter().filter(|s| s.failed)
    }

    /// Index standards that cannot be used: failed QC or dropped.
    pub fn unusable_index_standards(&self) -> Vec<&IndexStandard> {
        self.index_standards
            .iter()
            .filter(|s| s.usable_mean().is_none())
            .collect()
    }

    /// Index calls need at least two usable index standards.
    pub fn index_gate_passed(&self) -> bool {
        self.unusable_index_standards().len() < 2
    }

    /// One-line QC statement for reports.
    pub fn summary_text(&self) -> String {
        let failed: Vec<&StandardQc> = self.failed_standards().collect();
        if failed.is_empty() {
            return "all standards have a CV <0.1".to_string();
        }
        let mut out = String::from("all standard CVs <0.1 except:");
        for (i, s) in failed.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            out.push_str(&format!("{sep}{} ({:.3})", s.label, round_to(s.cv, 3)));
        }
        out
    }

    /// Operator message when the index gate stops the run.
    pub fn index_failure_message(&self) -> String {
        let mut out = String::from("Index QC failed: ");
        for (i, s) in self.unusable_index_standards().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match s.status {
                IndexStandardStatus::Failed { cv } => out.push_str(&format!("{} CV {cv:.3}", s.label)),
                _ => out.push_str(&format!("{} excluded", s.label)),
            }
        }
        out.push_str(". At least two index standards must pass; no report was written.");
        out
    }
}

/// Per-standard CV check over the aligned (blank-subtracted) curve.
pub fn evaluate_standards(curve: &StandardCurve) -> Result<QcSummary, AnalysisError> {
    let mut standards = Vec::with_capacity(curve.len());
    for i in 0..curve.len() {
        let label = standard_label(curve.positions[i]);
        let stats = group_stats(&label, &[curve.od1[i], curve.od2[i]])?;
        standards.push(StandardQc {
            position: curve.positions[i],
            label,
            mean: stats.mean,
            cv: stats.cv,
            failed: stats.cv >= STANDARD_CV_LIMIT,
        });
    }

    let index_standards = INDEX_STANDARD_POSITIONS
        .iter()
        .map(|&pos| {
            let status = match standards.iter().find(|s| s.position == pos) {
                None => IndexStandardStatus::Dropped,
                Some(s) if s.failed => IndexStandardStatus::Failed { cv: s.cv },
                Some(s) => IndexStandardStatus::Usable { mean: s.mean },
            };
            IndexStandard {
                position: pos,
                label: standard_label(pos),
                status,
            }
        })
        .collect();

    Ok(QcSummary {
        standards,
        index_standards,
    })
}

/// CV of each sample slot's replicate wells, rounded to 2 d.p.
///
/// Must be given the plate *before* blank subtraction.
pub fn sample_cvs(raw_plate: &PlateReadings, slots: &[SampleSlot]) -> Result<Vec<f64>, AnalysisError> {
    slots
        .iter()
        .map(|slot| {
            let ods = raw_plate.ods(&slot.group)?;
            Ok(round_to(group_stats(&slot.group, &ods)?.cv, 2))
        })
        .collect()
}
