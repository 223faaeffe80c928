//! Shared domain types.
//!
//! Run configuration enums double as `clap` value enums so the CLI layer can
//! parse them directly, and as `serde` types so they can be written into the
//! exported curve JSON.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Antigen the plate was coated with.
///
/// Each antigen carries its own concentration-mode OD cutoff and index
/// cutoffs (see `domain::tables`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Antigen {
    #[value(name = "s", alias = "spike")]
    #[serde(rename = "s")]
    Spike,
    #[value(name = "n", alias = "N-Spec")]
    #[serde(rename = "n")]
    NucleocapsidSpecificity,
    #[value(name = "n2", alias = "N-Sens")]
    #[serde(rename = "n2")]
    NucleocapsidSensitivity,
}

impl Antigen {
    /// Short identifier used on the command line (`s`, `n`, `n2`).
    pub fn id(self) -> &'static str {
        match self {
            Antigen::Spike => "s",
            Antigen::NucleocapsidSpecificity => "n",
            Antigen::NucleocapsidSensitivity => "n2",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Antigen::Spike => "Spike",
            Antigen::NucleocapsidSpecificity => "Nucleocapsid (specificity)",
            Antigen::NucleocapsidSensitivity => "Nucleocapsid (sensitivity)",
        }
    }
}

/// Which predefined 12-point concentration series the standards follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StandardSet {
    Hero,
    WhoS,
    WhoN,
}

impl StandardSet {
    pub fn id(self) -> &'static str {
        match self {
            StandardSet::Hero => "hero",
            StandardSet::WhoS => "who-s",
            StandardSet::WhoN => "who-n",
        }
    }
}

/// How positive/negative calls are made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CallMode {
    /// Compare the sample mean OD against the antigen cutoff.
    Conc,
    /// Compare sample/standard OD ratios against the index cutoff table.
    Index,
}

impl CallMode {
    pub fn id(self) -> &'static str {
        match self {
            CallMode::Conc => "conc",
            CallMode::Index => "index",
        }
    }
}

/// Fitted 4PL parameters.
///
/// `a` is the response at zero concentration, `d` the response at infinite
/// concentration, `c` the inflection point and `b` the Hill slope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl FitParameters {
    /// Solver seed used for every plate.
    pub const SEED: FitParameters = FitParameters {
        a: 0.0,
        b: 1.0,
        c: 1.0,
        d: 1.0,
    };

    pub fn to_array(self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    pub fn from_slice(p: &[f64]) -> Self {
        Self {
            a: p[0],
            b: p[1],
            c: p[2],
            d: p[3],
        }
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
    pub iterations: usize,
}

/// Summary statistics of a group of wells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub mean: f64,
    pub cv: f64,
}

/// Positive/negative call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    Pos,
    Neg,
}

impl Call {
    pub fn label(self) -> &'static str {
        match self {
            Call::Pos => "Pos",
            Call::Neg => "Neg",
        }
    }

    pub fn from_bool(positive: bool) -> Self {
        if positive { Call::Pos } else { Call::Neg }
    }
}

/// Back-calculated antibody units, or where the sample fell off the curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AbUnits {
    Concentration(f64),
    BelowCurve,
    AboveCurve,
}

/// One (well, group) line of an ignore list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IgnoreEntry {
    pub well: String,
    pub group: String,
}

impl IgnoreEntry {
    pub fn new(well: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            well: well.into(),
            group: group.into(),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub plate_id: String,
    pub antigen: Antigen,
    pub standard_set: StandardSet,
    pub mode: CallMode,
    pub include_pdf: bool,

    pub reader_path: PathBuf,
    pub plan_path: PathBuf,
    /// Ignore list; a missing file means "no exclusions".
    pub ignore_path: PathBuf,
    pub out_dir: PathBuf,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_curve: Option<PathBuf>,
}
