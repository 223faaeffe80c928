//! Fixed lookup tables: standard concentration series and antigen cutoffs.
//!
//! These are assay constants supplied by the lab, not derived values.

use crate::domain::{Antigen, StandardSet};

/// Number of points in every standard series.
pub const STANDARD_COUNT: usize = 12;

/// 0-based positions of the index standards (`Std09`, `Std10`, `Std11`).
pub const INDEX_STANDARD_POSITIONS: [usize; 3] = [8, 9, 10];

/// CV at or above which a standard is flagged as failed.
pub const STANDARD_CV_LIMIT: f64 = 0.10;

const HERO: [f64; STANDARD_COUNT] = [
    1000.0,
    571.4285714,
    326.5306122,
    186.5889213,
    106.6222407,
    60.9269947,
    34.81542555,
    19.89452888,
    11.36830222,
    6.496172697,
    3.712098684,
    2.121199248,
];

const WHO_S: [f64; STANDARD_COUNT] = [
    922.74,
    527.28,
    301.3028571,
    172.1730612,
    98.38460641,
    56.21977509,
    32.12558577,
    18.35747758,
    10.48998719,
    5.994278394,
    3.425301939,
    1.957315394,
];

const WHO_N: [f64; STANDARD_COUNT] = [
    976.32,
    557.8971429,
    318.7983673,
    182.1704956,
    104.0974261,
    59.48424347,
    33.99099627,
    19.42342644,
    11.09910082,
    6.342343327,
    3.624196187,
    2.07096925,
];

impl StandardSet {
    /// Known concentrations, descending, aligned with columns B..M.
    pub fn concentrations(self) -> &'static [f64; STANDARD_COUNT] {
        match self {
            StandardSet::Hero => &HERO,
            StandardSet::WhoS => &WHO_S,
            StandardSet::WhoN => &WHO_N,
        }
    }
}

impl Antigen {
    /// Blank-subtracted mean OD above which a sample is called positive in
    /// concentration mode.
    pub fn od_cutoff(self) -> f64 {
        match self {
            Antigen::Spike => 0.175,
            Antigen::NucleocapsidSpecificity => 0.722,
            Antigen::NucleocapsidSensitivity => 0.1905,
        }
    }

    /// Index cutoffs for `Std09`, `Std10`, `Std11`, in that order.
    pub fn index_cutoffs(self) -> [f64; 3] {
        match self {
            Antigen::Spike => [0.643, 1.087, 1.707],
            Antigen::NucleocapsidSpecificity => [0.825, 1.287, 2.049],
            Antigen::NucleocapsidSensitivity => [0.340, 0.541, 0.873],
        }
    }
}

/// `Std01`..`Std12` label for a 0-based standard position.
pub fn standard_label(position: usize) -> String {
    format!("Std{:02}", position + 1)
}
