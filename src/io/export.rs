//! Export per-sample results to CSV.
//!
//! The row format is fixed by downstream consumers:
//! `sampleid, dilution, od, cv, abunits, posneg`, with `", "` between fields.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::AbUnits;
use crate::error::AppError;
use crate::results::SampleResult;

pub const RESULTS_HEADER: &str = "sampleid, dilution, od, cv, abunits, posneg";

/// Write the per-sample results table.
pub fn write_results_csv(path: &Path, results: &[SampleResult]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create results CSV '{}': {e}", path.display())))?;
    file.write_all(format_results_csv(results).as_bytes())
        .map_err(|e| AppError::new(2, format!("Failed to write results CSV '{}': {e}", path.display())))?;
    Ok(())
}

pub fn format_results_csv(results: &[SampleResult]) -> String {
    let mut out = String::new();
    out.push_str(RESULTS_HEADER);
    out.push('\n');
    for r in results {
        // Unused slots keep their raw plan descriptor and have no dilution.
        let (id, dilution) = match r.slot.dilution() {
            Some(d) => (r.slot.sample_id(), d),
            None => (r.slot.raw_descriptor.as_str(), "NA"),
        };
        out.push_str(&format!(
            "{id}, {dilution}, {}, {}, {}, {}\n",
            fmt_number(r.mean_od),
            fmt_number(r.cv),
            fmt_abunits(r.abunits),
            r.call.label()
        ));
    }
    out
}

pub fn fmt_abunits(units: AbUnits) -> String {
    match units {
        AbUnits::Concentration(c) => fmt_number(c),
        AbUnits::BelowCurve => "BelowCurve".to_string(),
        AbUnits::AboveCurve => "AboveCurve".to_string(),
    }
}

/// Shortest round-trip form, keeping a trailing `.0` on integral values.
pub fn fmt_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}
