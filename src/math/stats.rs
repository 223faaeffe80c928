//! Replicate statistics: mean, population SD, coefficient of variation.
//!
//! CV throughout the assay is `population SD / mean` (no Bessel correction),
//! matching how the plate QC limits were calibrated.

use crate::domain::GroupStats;
use crate::error::AnalysisError;

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`).
pub fn population_sd(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Mean and CV of a named group of readings.
///
/// `label` only feeds the error message.
pub fn group_stats(label: &str, values: &[f64]) -> Result<GroupStats, AnalysisError> {
    let m = mean(values).ok_or_else(|| AnalysisError::EmptyGroup(label.to_string()))?;
    if m == 0.0 {
        return Err(AnalysisError::ZeroMean(label.to_string()));
    }
    let sd = population_sd(values).ok_or_else(|| AnalysisError::EmptyGroup(label.to_string()))?;
    Ok(GroupStats { mean: m, cv: sd / m })
}

/// Round half away from zero to `decimals` places.
pub fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}
