//! Read/write curve JSON files.
//!
//! Curve JSON is the portable representation of a fitted standard curve:
//! - 4PL parameters and fit quality
//! - run metadata (plate id, antigen, standard set, analysis date)
//! - the aligned standards that were fitted
//! - a precomputed log-spaced grid for quick plotting

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Antigen, FitParameters, FitQuality, StandardSet};
use crate::error::AppError;
use crate::fit::{FittedCurve, StandardCurve};
use crate::models::logistic4;

const GRID_POINTS: usize = 101;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub concentration: Vec<f64>,
    pub od: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub plate_id: String,
    pub analysed_on: NaiveDate,
    pub antigen: Antigen,
    pub standard_set: StandardSet,
    pub params: FitParameters,
    pub fit_quality: FitQuality,
    pub standards: StandardCurve,
    pub grid: CurveGrid,
}

impl CurveFile {
    pub fn new(
        plate_id: &str,
        analysed_on: NaiveDate,
        antigen: Antigen,
        standard_set: StandardSet,
        curve: &StandardCurve,
        fit: &FittedCurve,
    ) -> Self {
        Self {
            tool: "elisa".to_string(),
            plate_id: plate_id.to_string(),
            analysed_on,
            antigen,
            standard_set,
            params: fit.params,
            fit_quality: fit.quality,
            standards: curve.clone(),
            grid: build_grid(&fit.params, &curve.concentrations, GRID_POINTS),
        }
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curve: &CurveFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, curve).map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;
    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;
    Ok(curve)
}

/// Log-spaced grid over the standards' concentration range.
pub fn build_grid(params: &FitParameters, concentrations: &[f64], n: usize) -> CurveGrid {
    let n = n.max(2);
    let positive = concentrations.iter().copied().filter(|c| c.is_finite() && *c > 0.0);
    let mut x0 = positive.clone().fold(f64::INFINITY, f64::min);
    let mut x1 = positive.fold(f64::NEG_INFINITY, f64::max);
    if !(x0.is_finite() && x1.is_finite()) || x1 <= x0 {
        x0 = 1.0;
        x1 = 1000.0;
    }

    let (l0, l1) = (x0.log10(), x1.log10());
    let mut grid = CurveGrid {
        concentration: Vec::with_capacity(n),
        od: Vec::with_capacity(n),
    };
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let x = 10f64.powf(l0 + u * (l1 - l0));
        grid.concentration.push(x);
        grid.od.push(logistic4(x, params));
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: FitParameters = FitParameters {
        a: 0.05,
        b: 1.1,
        c: 80.0,
        d: 2.6,
    };

    #[test]
    fn grid_spans_standards_on_log_scale() {
        let grid = build_grid(&P, StandardSet::Hero.concentrations(), 101);
        assert_eq!(grid.concentration.len(), 101);
        assert!((grid.concentration[0] - 2.121199248).abs() < 1e-9);
        assert!((grid.concentration[100] - 1000.0).abs() < 1e-9);
        assert!((grid.concentration[50] - (2.121199248f64 * 1000.0).sqrt()).abs() < 1e-6);
        assert!(grid.od.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn curve_json_survives_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.json");
        let x = StandardSet::Hero.concentrations().to_vec();
        let y: Vec<f64> = x.iter().map(|&v| logistic4(v, &P)).collect();
        let standards = StandardCurve {
            positions: (0..12).collect(),
            concentrations: x,
            od1: y.clone(),
            od2: y.clone(),
            midpoints: y,
        };
        let fit = FittedCurve {
            params: P,
            quality: FitQuality {
                sse: 1e-6,
                rmse: 3e-4,
                n: 12,
                iterations: 17,
            },
        };
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let file = CurveFile::new("P1", date, Antigen::NucleocapsidSensitivity, StandardSet::WhoN, &standards, &fit);
        write_curve_json(&path, &file).unwrap();

        let back = read_curve_json(&path).unwrap();
        assert_eq!(back.plate_id, "P1");
        assert_eq!(back.antigen, Antigen::NucleocapsidSensitivity);
        assert_eq!(back.standard_set, StandardSet::WhoN);
        assert_eq!(back.params, P);
        assert_eq!(back.standards.len(), 12);
        assert_eq!(back.analysed_on, date);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"antigen\": \"n2\""), "{text}");
    }
}
