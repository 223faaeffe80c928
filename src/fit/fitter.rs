//! 4PL fit of the standard curve.
//!
//! Given the aligned standards (`x_i` known concentrations, `y_i` midpoint
//! ODs) we minimize `Σ (y_i - OD(x_i))²` with Levenberg–Marquardt, always
//! starting from `FitParameters::SEED`. The fit is unweighted and
//! unconstrained.

use log::{debug, info};

use crate::domain::{FitParameters, FitQuality};
use crate::error::AnalysisError;
use crate::fit::StandardCurve;
use crate::math::{LmError, LmOptions, levenberg_marquardt};
use crate::models::{logistic4, residuals};

/// Fitted curve and its diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct FittedCurve {
    pub params: FitParameters,
    pub quality: FitQuality,
}

impl FittedCurve {
    /// OD the fitted curve predicts at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        logistic4(x, &self.params)
    }
}

pub fn fit_standard_curve(curve: &StandardCurve) -> Result<FittedCurve, AnalysisError> {
    fit_standard_curve_with(curve, &LmOptions::default())
}

pub fn fit_standard_curve_with(curve: &StandardCurve, opts: &LmOptions) -> Result<FittedCurve, AnalysisError> {
    if curve.len() < 4 {
        return Err(AnalysisError::TooFewStandards { count: curve.len() });
    }

    let x = &curve.concentrations;
    let y = &curve.midpoints;
    let seed = FitParameters::SEED.to_array();

    let solution = levenberg_marquardt(|p| residuals(p, x, y), &seed, opts).map_err(|e| match e {
        LmError::NotConverged { iterations } => AnalysisError::FitDidNotConverge { iterations },
        LmError::NonFiniteStart => AnalysisError::NonFiniteFit,
    })?;

    let params = FitParameters::from_slice(&solution.params);
    if !params.is_finite() || !solution.sse.is_finite() {
        return Err(AnalysisError::NonFiniteFit);
    }

    let n = curve.len();
    let quality = FitQuality {
        sse: solution.sse,
        rmse: (solution.sse / n as f64).sqrt(),
        n,
        iterations: solution.iterations,
    };
    debug!("4PL parameters: {params:?}");
    info!(
        "Fitted 4PL to {n} standards in {} iterations (RMSE {:.5}).",
        quality.iterations, quality.rmse
    );

    Ok(FittedCurve { params, quality })
}
