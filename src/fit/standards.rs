//! Aligned standard-curve data: concentrations and both duplicate rows.

use serde::{Deserialize, Serialize};

use crate::domain::{STANDARD_COUNT, standard_label};
use crate::error::AnalysisError;
use crate::plate::layout::{STD_CURVE1_CELLS, STD_CURVE1_GROUP, STD_CURVE2_CELLS, STD_CURVE2_GROUP};
use crate::plate::{PlateReadings, StandardSeries};

/// Standards that survived exclusion, positionally aligned.
///
/// `midpoints[i] = (od1[i] + od2[i]) / 2` is the `y` the curve is fitted to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardCurve {
    /// Original 0-based standard positions.
    pub positions: Vec<usize>,
    pub concentrations: Vec<f64>,
    pub od1: Vec<f64>,
    pub od2: Vec<f64>,
    pub midpoints: Vec<f64>,
}

impl StandardCurve {
    /// Collect the standards listed in `series` from both duplicate rows.
    ///
    /// Every position still in the series needs a reading in both rows, and
    /// every position dropped from it must be gone from both rows.
    pub fn from_plate(plate: &PlateReadings, series: &StandardSeries) -> Result<Self, AnalysisError> {
        for group in [STD_CURVE1_GROUP, STD_CURVE2_GROUP] {
            if plate.group(group).is_none() {
                return Err(AnalysisError::MissingGroup(group.to_string()));
            }
        }

        for pos in 0..STANDARD_COUNT {
            let c1 = plate.od(STD_CURVE1_GROUP, STD_CURVE1_CELLS[pos]);
            let c2 = plate.od(STD_CURVE2_GROUP, STD_CURVE2_CELLS[pos]);
            let aligned = if series.contains(pos) {
                c1.is_some() && c2.is_some()
            } else {
                c1.is_none() && c2.is_none()
            };
            if !aligned {
                return Err(AnalysisError::MisalignedStandards {
                    label: standard_label(pos),
                });
            }
        }

        let mut curve = StandardCurve {
            positions: Vec::with_capacity(series.len()),
            concentrations: Vec::with_capacity(series.len()),
            od1: Vec::with_capacity(series.len()),
            od2: Vec::with_capacity(series.len()),
            midpoints: Vec::with_capacity(series.len()),
        };
        for &(pos, conc) in series.entries() {
            let (Some(a), Some(b)) = (
                plate.od(STD_CURVE1_GROUP, STD_CURVE1_CELLS[pos]),
                plate.od(STD_CURVE2_GROUP, STD_CURVE2_CELLS[pos]),
            ) else {
                return Err(AnalysisError::MisalignedStandards {
                    label: standard_label(pos),
                });
            };
            curve.positions.push(pos);
            curve.concentrations.push(conc);
            curve.od1.push(a);
            curve.od2.push(b);
            curve.midpoints.push((a + b) / 2.0);
        }

        if curve.len() < 4 {
            return Err(AnalysisError::TooFewStandards { count: curve.len() });
        }
        Ok(curve)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.positions.iter().map(|&p| standard_label(p)).collect()
    }

    /// Midpoint OD of the highest-concentration standard.
    pub fn first_midpoint(&self) -> Option<f64> {
        self.midpoints.first().copied()
    }

    /// Midpoint OD of the lowest-concentration standard.
    pub fn last_midpoint(&self) -> Option<f64> {
        self.midpoints.last().copied()
    }

    /// Midpoint OD at original position `position`, if that standard survived.
    pub fn midpoint_at(&self, position: usize) -> Option<f64> {
        self.positions
            .iter()
            .position(|&p| p == position)
            .map(|i| self.midpoints[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IgnoreEntry, StandardSet};
    use crate::plate::resolve_exclusions;

    fn plate() -> PlateReadings {
        let mut p = PlateReadings::new();
        for i in 0..STANDARD_COUNT {
            p.push(STD_CURVE1_GROUP, STD_CURVE1_CELLS[i], 2.0 - 0.15 * i as f64);
            p.push(STD_CURVE2_GROUP, STD_CURVE2_CELLS[i], 2.1 - 0.15 * i as f64);
        }
        p
    }

    #[test]
    fn builds_midpoints_in_series_order() {
        let series = StandardSeries::from_set(StandardSet::Hero);
        let curve = StandardCurve::from_plate(&plate(), &series).unwrap();
        assert_eq!(curve.len(), 12);
        assert!((curve.midpoints[0] - 2.05).abs() < 1e-12);
        assert_eq!(curve.concentrations[0], 1000.0);
        assert_eq!(curve.labels()[11], "Std12");
        assert!(curve.first_midpoint().unwrap() > curve.last_midpoint().unwrap());
    }

    #[test]
    fn dropped_standard_shrinks_every_array() {
        let out = resolve_exclusions(
            plate(),
            StandardSeries::from_set(StandardSet::Hero),
            &[IgnoreEntry::new("J23", "std_curve1"), IgnoreEntry::new("J24", "std_curve2")],
        )
        .unwrap();
        let curve = StandardCurve::from_plate(&out.plate, &out.series).unwrap();
        assert_eq!(curve.len(), 11);
        assert_eq!(curve.od1.len(), 11);
        assert_eq!(curve.od2.len(), 11);
        assert_eq!(curve.concentrations.len(), 11);
        assert!(!curve.positions.contains(&8));
        assert_eq!(curve.midpoint_at(8), None);
        assert!(curve.midpoint_at(9).is_some());
    }

    #[test]
    fn row24_exclusion_alone_is_rejected_as_misaligned() {
        let out = resolve_exclusions(
            plate(),
            StandardSeries::from_set(StandardSet::Hero),
            &[IgnoreEntry::new("D24", "std_curve2")],
        )
        .unwrap();
        let err = StandardCurve::from_plate(&out.plate, &out.series).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::MisalignedStandards {
                label: "Std03".to_string()
            }
        );
    }

    #[test]
    fn too_few_standards() {
        let mut series = StandardSeries::from_set(StandardSet::Hero);
        let mut p = plate();
        for pos in 3..STANDARD_COUNT {
            series.drop_position(pos);
            p.remove(STD_CURVE1_GROUP, STD_CURVE1_CELLS[pos]);
            p.remove(STD_CURVE2_GROUP, STD_CURVE2_CELLS[pos]);
        }
        let err = StandardCurve::from_plate(&p, &series).unwrap_err();
        assert_eq!(err, AnalysisError::TooFewStandards { count: 3 });
    }
}
