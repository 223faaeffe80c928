//! Error types.
//!
//! `AppError` is what the binary reports: an exit code plus a message.
//! `AnalysisError` covers the numeric pipeline so that callers (and tests)
//! can match on the failure kind before it is flattened into an `AppError`.
//!
//! Exit codes:
//! - 2: input files, I/O, malformed rows
//! - 3: lookups that fail against loaded data
//! - 4: numeric failures (zero means, fit, inversion)

use thiserror::Error;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures raised by the exclusion/normalization/fit/calculation stages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Ignore entry references unknown well '{well}' (group '{group}').")]
    UnknownWell { well: String, group: String },

    #[error("Plate data has no '{0}' group.")]
    MissingGroup(String),

    #[error("Group '{0}' has no wells left to summarise.")]
    EmptyGroup(String),

    #[error("Mean OD of '{0}' is zero; CV is undefined.")]
    ZeroMean(String),

    #[error("Standard {label} has a reading in only one duplicate row; standard arrays are misaligned.")]
    MisalignedStandards { label: String },

    #[error("Only {count} standards remain; at least 4 are needed to fit a 4PL curve.")]
    TooFewStandards { count: usize },

    #[error("Standard curve fit did not converge after {iterations} iterations.")]
    FitDidNotConverge { iterations: usize },

    #[error("Standard curve fit produced non-finite parameters.")]
    NonFiniteFit,

    #[error("Concentration for {sample} is not finite (mean OD {mean_od}).")]
    NonFiniteConcentration { sample: String, mean_od: f64 },

    #[error("Sample '{0}' is missing from the plate plan.")]
    MissingSampleMetadata(String),

    #[error("Plate plan entry for '{group}' is not NAME-DILUTION or EMPTY: '{descriptor}'.")]
    MalformedDescriptor { group: String, descriptor: String },
}

impl AnalysisError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AnalysisError::MalformedDescriptor { .. } => 2,
            AnalysisError::UnknownWell { .. }
            | AnalysisError::MissingGroup(_)
            | AnalysisError::EmptyGroup(_)
            | AnalysisError::MisalignedStandards { .. }
            | AnalysisError::TooFewStandards { .. }
            | AnalysisError::MissingSampleMetadata(_) => 3,
            AnalysisError::ZeroMean(_)
            | AnalysisError::FitDidNotConverge { .. }
            | AnalysisError::NonFiniteFit
            | AnalysisError::NonFiniteConcentration { .. } => 4,
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}
