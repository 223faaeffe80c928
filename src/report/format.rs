//! Formatted terminal output.
//!
//! Formatting lives here so the numeric stages stay free of presentation
//! and output changes stay local.

use crate::io::{fmt_abunits, fmt_number};
use crate::report::PlateReport;
use crate::results::SampleResult;

/// Run summary: configuration, controls, fit diagnostics and QC.
pub fn format_run_summary(report: &PlateReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== elisa - plate {} ===\n", report.plate_id));
    out.push_str(&format!(
        "Antigen: {} ({}) | standards: {} | mode: {}\n",
        report.antigen.display_name(),
        report.antigen.id(),
        report.standard_set.id(),
        report.mode.id()
    ));
    out.push_str(&format!("Analysed: {}\n", report.analysed_on));
    out.push_str(&format!("{}\n", report.cutoff_text()));

    out.push_str("\nControls (mean / CV):\n");
    for (name, stats) in [
        ("blank", report.controls.blank),
        ("positive", report.controls.positive),
        ("negative", report.controls.negative),
    ] {
        out.push_str(&format!("  {name:<9} {:>8.3} {:>7.3}\n", stats.mean, stats.cv));
    }

    let p = &report.fit.params;
    let q = &report.fit.quality;
    out.push_str("\n4PL fit:\n");
    out.push_str(&format!(
        "- A={:.6} B={:.6} C={:.6} D={:.6}\n",
        p.a, p.b, p.c, p.d
    ));
    out.push_str(&format!(
        "- n={} SSE={:.3e} RMSE={:.5} iterations={}\n",
        q.n, q.sse, q.rmse, q.iterations
    ));

    out.push_str(&format!("\nQC: {}\n", report.qc.summary_text()));
    out.push_str(&format!("Exclusions: {}\n", report.exclusion_text()));
    out.push_str(&format!(
        "Positive: {} of {} samples\n\n",
        report.positive_count(),
        report.samples.len()
    ));

    out
}

/// The 32-row sample table.
pub fn format_sample_table(samples: &[SampleResult]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<6} {:<16} {:<8} {:>8} {:>6} {:>14} {:<6}\n",
            "slot", "sample", "dilution", "od", "cv", "abunits", "call"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<6} {:-<16} {:-<8} {:-<8} {:-<6} {:-<14} {:-<6}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in samples {
        out.push_str(
            format!(
                "{:<6} {:<16} {:<8} {:>8} {:>6} {:>14} {:<6}\n",
                r.slot.group,
                truncate(r.slot.sample_id(), 16),
                r.slot.dilution().unwrap_or("NA"),
                fmt_number(r.mean_od),
                fmt_number(r.cv),
                fmt_abunits(r.abunits),
                r.call.label(),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
