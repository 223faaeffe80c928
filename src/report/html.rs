//! HTML report.
//!
//! A single self-contained page: run metadata, control summaries, QC and
//! exclusion notes, the standard-curve SVG inline, and the sample table.

use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

use crate::domain::Call;
use crate::error::AppError;
use crate::io::{fmt_abunits, fmt_number};
use crate::report::PlateReport;

pub fn write_html_report(path: &Path, report: &PlateReport, curve_svg: &str) -> Result<(), AppError> {
    let html = render_html(report, curve_svg)
        .map_err(|e| AppError::new(2, format!("Failed to render HTML report: {e}")))?;
    fs::write(path, html)
        .map_err(|e| AppError::new(2, format!("Failed to write HTML report '{}': {e}", path.display())))
}

pub fn render_html(report: &PlateReport, curve_svg: &str) -> Result<String, std::fmt::Error> {
    let mut html = String::with_capacity(64 * 1024);

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(html, "<title>ELISA report: {}</title>", escape(&report.plate_id))?;
    writeln!(html, "<style>")?;
    writeln!(
        html,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#222;background:#fff;}}"
    )?;
    writeln!(html, "h1{{margin:0 0 8px 0;font-size:24px;}}")?;
    writeln!(html, "h2{{margin:24px 0 8px 0;font-size:20px;}}")?;
    writeln!(html, ".meta{{color:#555;font-size:13px;margin-bottom:16px;}}")?;
    writeln!(
        html,
        ".table{{border-collapse:collapse;width:100%;max-width:900px;font-size:12px;}}"
    )?;
    writeln!(
        html,
        ".table th,.table td{{border:1px solid #ddd;padding:4px 6px;text-align:right;}}"
    )?;
    writeln!(html, ".table th:first-child,.table td:first-child{{text-align:left;}}")?;
    writeln!(html, ".pos{{color:#c00000;font-weight:bold;}}")?;
    writeln!(html, "svg{{background:#fafafa;border:1px solid #e5e5e5;}}")?;
    writeln!(html, "</style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;

    writeln!(html, "<h1>ELISA plate {}</h1>", escape(&report.plate_id))?;
    writeln!(
        html,
        "<div class=\"meta\">Antigen: <b>{}</b><br/>Standards: {}<br/>Mode: {}<br/>{}<br/>Analysed: {}</div>",
        report.antigen.display_name(),
        report.standard_set.id(),
        report.mode.id(),
        escape(&report.cutoff_text()),
        report.analysed_on
    )?;

    writeln!(html, "<h2>Controls</h2>")?;
    writeln!(html, "<table class=\"table\">")?;
    writeln!(html, "<tr><th>Control</th><th>Mean OD</th><th>CV</th></tr>")?;
    for (name, stats) in [
        ("Blank", report.controls.blank),
        ("Positive", report.controls.positive),
        ("Negative", report.controls.negative),
    ] {
        writeln!(
            html,
            "<tr><td>{name}</td><td>{:.3}</td><td>{:.3}</td></tr>",
            stats.mean, stats.cv
        )?;
    }
    writeln!(html, "</table>")?;

    writeln!(html, "<h2>Standard curve</h2>")?;
    writeln!(html, "<div class=\"plot\">{curve_svg}</div>")?;
    let p = &report.fit.params;
    writeln!(
        html,
        "<div class=\"meta\">A={:.6} B={:.6} C={:.6} D={:.6} | RMSE {:.5}</div>",
        p.a, p.b, p.c, p.d, report.fit.quality.rmse
    )?;
    writeln!(html, "<p>QC: {}</p>", escape(&report.qc.summary_text()))?;
    writeln!(html, "<p>{}</p>", escape(&report.exclusion_text()))?;

    writeln!(html, "<h2>Samples</h2>")?;
    writeln!(html, "<table class=\"table\">")?;
    writeln!(
        html,
        "<tr><th>Sample</th><th>Dilution</th><th>OD</th><th>CV</th><th>Ab units</th><th>Call</th></tr>"
    )?;
    for r in &report.samples {
        let class = if r.call == Call::Pos { " class=\"pos\"" } else { "" };
        writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td{class}>{}</td></tr>",
            escape(r.slot.sample_id()),
            escape(r.slot.dilution().unwrap_or("NA")),
            fmt_number(r.mean_od),
            fmt_number(r.cv),
            fmt_abunits(r.abunits),
            r.call.label()
        )?;
    }
    writeln!(html, "</table>")?;

    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;
    Ok(html)
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CallMode;
    use crate::report::fixtures;

    #[test]
    fn page_embeds_plot_and_escapes_names() {
        let report = fixtures::report(CallMode::Conc);
        let html = render_html(&report, "<svg id=\"curve\"></svg>").unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<svg id=\"curve\"></svg>"));
        assert!(html.contains("PT&lt;1&gt;"));
        assert!(!html.contains("PT<1>"));
        assert!(html.contains("all standards have a CV &lt;0.1"));
        assert_eq!(html.matches("<tr><td>EMPTY</td><td>NA</td>").count(), 31);
    }

    #[test]
    fn writes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("P001.html");
        write_html_report(&path, &fixtures::report(CallMode::Index), "<svg></svg>").unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Index cutoffs: Std09 0.643"));
    }
}
