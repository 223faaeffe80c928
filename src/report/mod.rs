//! Plate report: one structured object consumed by every renderer.
//!
//! - terminal summary (`format`)
//! - HTML page with the embedded curve figure (`html`)
//! - PDF conversion of the HTML page (`pdf`)

pub mod format;
pub mod html;
pub mod pdf;

pub use format::*;
pub use html::*;
pub use pdf::*;

use chrono::NaiveDate;

use crate::domain::{Antigen, Call, CallMode, IgnoreEntry, StandardSet, standard_label};
use crate::fit::{FittedCurve, StandardCurve};
use crate::qc::QcSummary;
use crate::results::{ControlSummary, SampleResult};

/// Everything a rendered report shows, by name.
#[derive(Debug, Clone)]
pub struct PlateReport {
    pub plate_id: String,
    pub analysed_on: NaiveDate,
    pub antigen: Antigen,
    pub standard_set: StandardSet,
    pub mode: CallMode,
    pub controls: ControlSummary,
    pub qc: QcSummary,
    pub excluded_wells: Vec<IgnoreEntry>,
    pub dropped_standards: Vec<usize>,
    pub standards: StandardCurve,
    pub fit: FittedCurve,
    pub samples: Vec<SampleResult>,
}

impl PlateReport {
    pub fn cutoff_text(&self) -> String {
        match self.mode {
            CallMode::Conc => format!("OD cutoff: {}", self.antigen.od_cutoff()),
            CallMode::Index => {
                let cut = self.antigen.index_cutoffs();
                let parts: Vec<String> = self
                    .qc
                    .index_standards
                    .iter()
                    .zip(cut)
                    .map(|(s, c)| format!("{} {c}", s.label))
                    .collect();
                format!("Index cutoffs: {}", parts.join(", "))
            }
        }
    }

    pub fn exclusion_text(&self) -> String {
        if self.excluded_wells.is_empty() {
            return "No wells excluded".to_string();
        }
        let wells: Vec<String> = self
            .excluded_wells
            .iter()
            .map(|e| format!("{} ({})", e.well, e.group))
            .collect();
        let mut out = format!("excluded these wells: {}", wells.join(", "));
        if !self.dropped_standards.is_empty() {
            let labels: Vec<String> = self.dropped_standards.iter().map(|&p| standard_label(p)).collect();
            out.push_str(&format!("; dropped standards: {}", labels.join(", ")));
        }
        out
    }

    pub fn positive_count(&self) -> usize {
        self.samples
            .iter()
            .filter(|s| s.call == Call::Pos)
            .count()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_text_follows_mode() {
        assert_eq!(fixtures::report(CallMode::Conc).cutoff_text(), "OD cutoff: 0.175");
        assert_eq!(
            fixtures::report(CallMode::Index).cutoff_text(),
            "Index cutoffs: Std09 0.643, Std10 1.087, Std11 1.707"
        );
    }

    #[test]
    fn exclusion_text_lists_wells_and_dropped_standards() {
        let mut r = fixtures::report(CallMode::Conc);
        assert_eq!(
            r.exclusion_text(),
            "excluded these wells: E23 (std_curve1), E24 (std_curve2); dropped standards: Std04"
        );
        r.excluded_wells.clear();
        assert_eq!(r.exclusion_text(), "No wells excluded");
        assert_eq!(r.positive_count(), 1);
    }
}
