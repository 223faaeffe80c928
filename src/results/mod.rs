//! Result calculator: per-sample mean OD, antibody units and Pos/Neg call.
//!
//! Both call modes report the same `abunits` column:
//!
//! - mean below the last standard midpoint → `BelowCurve`
//! - else mean above the first standard midpoint → `AboveCurve`
//! - else the inverse 4PL, rounded to 6 d.p.
//!
//! The sentinels compare against the ends of the midpoint array, not the
//! fitted asymptotes.

use log::info;

use crate::domain::{AbUnits, Antigen, Call, CallMode, GroupStats};
use crate::error::AnalysisError;
use crate::fit::{FittedCurve, StandardCurve};
use crate::math::{group_stats, mean, round_to};
use crate::models::concentration;
use crate::plate::PlateReadings;
use crate::plate::layout::{NEGATIVE_CONTROL_GROUP, POSITIVE_CONTROL_GROUP, SampleSlot};
use crate::qc::QcSummary;

/// Ratio of a sample mean OD to one index standard.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexScore {
    pub label: String,
    pub index: f64,
    pub cutoff: f64,
}

impl IndexScore {
    pub fn exceeds(&self) -> bool {
        self.index > self.cutoff
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleResult {
    pub slot: SampleSlot,
    /// Blank-subtracted mean OD, rounded to 3 d.p.
    pub mean_od: f64,
    /// Raw-replicate CV, rounded to 2 d.p.
    pub cv: f64,
    pub abunits: AbUnits,
    pub call: Call,
    /// Index scores against the usable index standards (index mode only).
    pub indices: Vec<IndexScore>,
}

/// Blank, positive and negative control summaries.
///
/// Blank stats are taken before subtraction; the controls after.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSummary {
    pub blank: GroupStats,
    pub positive: GroupStats,
    pub negative: GroupStats,
}

pub fn control_summary(blank: GroupStats, normalized: &PlateReadings) -> Result<ControlSummary, AnalysisError> {
    Ok(ControlSummary {
        blank,
        positive: group_stats(POSITIVE_CONTROL_GROUP, &normalized.ods(POSITIVE_CONTROL_GROUP)?)?,
        negative: group_stats(NEGATIVE_CONTROL_GROUP, &normalized.ods(NEGATIVE_CONTROL_GROUP)?)?,
    })
}

/// Map a mean OD to antibody units or a curve sentinel.
pub fn antibody_units(
    sample: &str,
    mean_od: f64,
    curve: &StandardCurve,
    fit: &FittedCurve,
) -> Result<AbUnits, AnalysisError> {
    let (Some(first), Some(last)) = (curve.first_midpoint(), curve.last_midpoint()) else {
        return Err(AnalysisError::TooFewStandards { count: 0 });
    };
    if mean_od < last {
        return Ok(AbUnits::BelowCurve);
    }
    if mean_od > first {
        return Ok(AbUnits::AboveCurve);
    }
    let conc = concentration(mean_od, &fit.params);
    if !conc.is_finite() {
        return Err(AnalysisError::NonFiniteConcentration {
            sample: sample.to_string(),
            mean_od,
        });
    }
    Ok(AbUnits::Concentration(round_to(conc, 6)))
}

/// Concentration-mode call: rounded mean OD strictly above the antigen cutoff.
pub fn concentration_call(mean_od_rounded: f64, antigen: Antigen) -> Call {
    Call::from_bool(mean_od_rounded > antigen.od_cutoff())
}

/// Index-mode call: positive when at least two scores exceed their cutoff.
pub fn index_call(scores: &[IndexScore]) -> Call {
    Call::from_bool(scores.iter().filter(|s| s.exceeds()).count() >= 2)
}

/// Scores of `mean_od` against every usable index standard.
pub fn index_scores(mean_od: f64, qc: &QcSummary, antigen: Antigen) -> Vec<IndexScore> {
    let cutoffs = antigen.index_cutoffs();
    qc.index_standards
        .iter()
        .zip(cutoffs)
        .filter_map(|(std, cutoff)| {
            std.usable_mean().map(|std_mean| IndexScore {
                label: std.label.clone(),
                index: mean_od / std_mean,
                cutoff,
            })
        })
        .collect()
}

/// Everything the calculator needs from earlier stages.
#[derive(Debug, Clone, Copy)]
pub struct CalculationInputs<'a> {
    pub normalized: &'a PlateReadings,
    pub slots: &'a [SampleSlot],
    /// Pre-blank CVs, one per slot.
    pub sample_cvs: &'a [f64],
    pub curve: &'a StandardCurve,
    pub fit: &'a FittedCurve,
    pub qc: &'a QcSummary,
    pub antigen: Antigen,
    pub mode: CallMode,
}

pub fn calculate_results(inputs: &CalculationInputs<'_>) -> Result<Vec<SampleResult>, AnalysisError> {
    info!("Calculating {} for {} samples.", inputs.mode.id(), inputs.slots.len());
    let mut out = Vec::with_capacity(inputs.slots.len());

    for (slot, &cv) in inputs.slots.iter().zip(inputs.sample_cvs) {
        let ods = inputs.normalized.ods(&slot.group)?;
        let raw_mean = mean(&ods).ok_or_else(|| AnalysisError::EmptyGroup(slot.group.clone()))?;
        let abunits = antibody_units(&slot.group, raw_mean, inputs.curve, inputs.fit)?;
        let mean_od = round_to(raw_mean, 3);

        let (call, indices) = match inputs.mode {
            CallMode::Conc => (concentration_call(mean_od, inputs.antigen), Vec::new()),
            CallMode::Index => {
                let scores = index_scores(raw_mean, inputs.qc, inputs.antigen);
                (index_call(&scores), scores)
            }
        };

        out.push(SampleResult {
            slot: slot.clone(),
            mean_od,
            cv,
            abunits,
            call,
            indices,
        });
    }

    Ok(out)
}
