//! The plate-analysis pipeline shared by the CLI and the integration tests.
//!
//! load -> exclude -> sample CV -> blank -> fit -> QC (-> index gate) -> calculate -> emit
//!
//! Each stage takes the previous stage's structure and returns a new one.
//! The index gate is the only early stop; it is not an error.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use log::info;

use crate::domain::{AnalysisConfig, CallMode};
use crate::error::AppError;
use crate::fit::{StandardCurve, fit_standard_curve};
use crate::io::{load_ignore_list, load_plate_plan, load_plate_readings, write_results_csv};
use crate::plate::layout::build_sample_slots;
use crate::plate::{StandardSeries, normalize_blanks, resolve_exclusions};
use crate::plot::render_curve_svg;
use crate::qc::{evaluate_standards, sample_cvs};
use crate::report::{PlateReport, render_pdf, write_html_report};
use crate::results::{CalculationInputs, calculate_results, control_summary};

const FIGURE_SIZE: (u32, u32) = (800, 560);

/// Files written by a completed run.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    pub results_csv: PathBuf,
    pub curve_svg: PathBuf,
    pub html_report: PathBuf,
    pub pdf_report: Option<PathBuf>,
}

/// All computed outputs of a single `elisa analyze` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub report: PlateReport,
    pub artifacts: RunArtifacts,
}

#[derive(Debug, Clone)]
pub enum PlateAnalysis {
    Report(Box<PlateReport>),
    /// Fewer than two index standards are usable; carries the operator message.
    IndexQcFailed(String),
}

#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Completed(Box<RunOutput>),
    IndexQcFailed(String),
}

/// Analyze the plate and write every artifact.
pub fn run_analysis(config: &AnalysisConfig) -> Result<PipelineOutcome, AppError> {
    let analysed_on = Local::now().date_naive();
    match analyze_plate(config, analysed_on)? {
        PlateAnalysis::Report(report) => {
            let artifacts = emit_artifacts(config, &report)?;
            Ok(PipelineOutcome::Completed(Box::new(RunOutput {
                report: *report,
                artifacts,
            })))
        }
        PlateAnalysis::IndexQcFailed(message) => Ok(PipelineOutcome::IndexQcFailed(message)),
    }
}

/// Run every numeric stage and assemble the report, without touching the output directory.
pub fn analyze_plate(config: &AnalysisConfig, analysed_on: NaiveDate) -> Result<PlateAnalysis, AppError> {
    info!("Reading plate data from '{}'.", config.reader_path.display());
    let raw = load_plate_readings(&config.reader_path)?;
    info!("Reading plate plan from '{}'.", config.plan_path.display());
    let plan = load_plate_plan(&config.plan_path)?;
    let ignore = load_ignore_list(&config.ignore_path)?;
    info!(
        "Antigen {} | standards {} | mode {}.",
        config.antigen.display_name(),
        config.standard_set.id(),
        config.mode.id()
    );

    let slots = build_sample_slots(|group| plan.descriptor(group))?;
    let excluded = resolve_exclusions(raw, StandardSeries::from_set(config.standard_set), &ignore)?;

    // Replicate CVs come from the readings before blank subtraction.
    let cvs = sample_cvs(&excluded.plate, &slots)?;
    let normalized = normalize_blanks(excluded.plate)?;

    let standards = StandardCurve::from_plate(&normalized.plate, &excluded.series)?;
    let fit = fit_standard_curve(&standards)?;
    let qc = evaluate_standards(&standards)?;

    if config.mode == CallMode::Index && !qc.index_gate_passed() {
        return Ok(PlateAnalysis::IndexQcFailed(qc.index_failure_message()));
    }

    let controls = control_summary(normalized.blank, &normalized.plate)?;
    let samples = calculate_results(&CalculationInputs {
        normalized: &normalized.plate,
        slots: &slots,
        sample_cvs: &cvs,
        curve: &standards,
        fit: &fit,
        qc: &qc,
        antigen: config.antigen,
        mode: config.mode,
    })?;

    Ok(PlateAnalysis::Report(Box::new(PlateReport {
        plate_id: config.plate_id.clone(),
        analysed_on,
        antigen: config.antigen,
        standard_set: config.standard_set,
        mode: config.mode,
        controls,
        qc,
        excluded_wells: excluded.applied,
        dropped_standards: excluded.dropped_standards,
        standards,
        fit,
        samples,
    })))
}

/// Write the results CSV, curve figure, HTML report and (optionally) PDF.
pub fn emit_artifacts(config: &AnalysisConfig, report: &PlateReport) -> Result<RunArtifacts, AppError> {
    let figs = config.out_dir.join("figs");
    let html_dir = config.out_dir.join("html_reports");
    for dir in [&config.out_dir, &figs, &html_dir] {
        create_dir(dir)?;
    }

    let results_csv = config.out_dir.join(format!("{}.csv", report.plate_id));
    info!("Writing results to '{}'.", results_csv.display());
    write_results_csv(&results_csv, &report.samples)?;

    let svg = render_curve_svg(&report.standards, &report.fit.params, FIGURE_SIZE)?;
    let curve_svg = figs.join(format!("{}.svg", report.plate_id));
    fs::write(&curve_svg, &svg)
        .map_err(|e| AppError::new(2, format!("Failed to write figure '{}': {e}", curve_svg.display())))?;

    let html_report = html_dir.join(format!("{}.html", report.plate_id));
    info!("Writing report to '{}'.", html_report.display());
    write_html_report(&html_report, report, &svg)?;

    let pdf_report = if config.include_pdf {
        let path = config.out_dir.join(format!("{}.pdf", report.plate_id));
        render_pdf(&html_report, &path)?;
        Some(path)
    } else {
        None
    };

    Ok(RunArtifacts {
        results_csv,
        curve_svg,
        html_report,
        pdf_report,
    })
}

fn create_dir(dir: &Path) -> Result<(), AppError> {
    fs::create_dir_all(dir).map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", dir.display())))
}
