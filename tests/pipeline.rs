//! End-to-end runs of the plate pipeline on simulated plates.

use std::fs;
use std::path::Path;

use elisa_curves::app::pipeline::{PipelineOutcome, RunOutput, run_analysis};
use elisa_curves::data::{SimulatedPlate, SimulationConfig, simulate_plate, write_simulated_plate};
use elisa_curves::domain::{AbUnits, AnalysisConfig, Antigen, CallMode, StandardSet};
use elisa_curves::io::RESULTS_HEADER;

const PLATE_ID: &str = "SIM01";

fn simulate(dir: &Path, exclude: &[&str]) -> SimulatedPlate {
    let cfg = SimulationConfig {
        noise_cv: 0.002,
        exclude: exclude.iter().map(|w| w.to_string()).collect(),
        ..SimulationConfig::default()
    };
    let plate = simulate_plate(&cfg).unwrap();
    write_simulated_plate(&plate, PLATE_ID, dir).unwrap();
    plate
}

fn config(input: &Path, out: &Path, mode: CallMode) -> AnalysisConfig {
    AnalysisConfig {
        plate_id: PLATE_ID.to_string(),
        antigen: Antigen::Spike,
        standard_set: StandardSet::Hero,
        mode,
        include_pdf: false,
        reader_path: input.join(format!("{PLATE_ID}-preader.csv")),
        plan_path: input.join(format!("{PLATE_ID}-pplan.csv")),
        ignore_path: input.join(format!("{PLATE_ID}-ignore.csv")),
        out_dir: out.to_path_buf(),
        plot: false,
        plot_width: 80,
        plot_height: 20,
        export_curve: None,
    }
}

fn completed(outcome: PipelineOutcome) -> RunOutput {
    match outcome {
        PipelineOutcome::Completed(run) => *run,
        PipelineOutcome::IndexQcFailed(msg) => panic!("unexpected QC stop: {msg}"),
    }
}

#[test]
fn conc_mode_writes_every_artifact() {
    let input = tempfile::tempdir().unwrap();
    let out = input.path().join("out");
    let plate = simulate(input.path(), &[]);

    let run = completed(run_analysis(&config(input.path(), &out, CallMode::Conc)).unwrap());

    let csv = fs::read_to_string(&run.artifacts.results_csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], RESULTS_HEADER);
    assert_eq!(lines.len(), 33);
    assert!(lines[32].starts_with("EMPTY, NA, "));

    assert_eq!(run.artifacts.curve_svg, out.join("figs").join("SIM01.svg"));
    assert!(fs::read_to_string(&run.artifacts.curve_svg).unwrap().contains("<svg"));
    let html = fs::read_to_string(&run.artifacts.html_report).unwrap();
    assert!(html.contains("SIM01"));
    assert!(run.artifacts.pdf_report.is_none());

    // Mid-curve samples back-calculate close to the concentration they were simulated at.
    let mut checked = 0;
    for &(slot, truth) in &plate.sample_truth {
        if !(10.0..=400.0).contains(&truth) {
            continue;
        }
        let result = &run.report.samples[slot - 1];
        let AbUnits::Concentration(conc) = result.abunits else {
            panic!("slot {slot} fell off the curve: {:?}", result.abunits);
        };
        assert!((conc - truth).abs() / truth < 0.1, "slot {slot}: {conc} vs {truth}");
        checked += 1;
    }
    assert!(checked > 0);
    assert!(run.report.qc.index_gate_passed());
}

#[test]
fn paired_standard_exclusion_is_reported() {
    let input = tempfile::tempdir().unwrap();
    let out = input.path().join("out");
    simulate(input.path(), &["E23", "E24", "A1"]);

    let run = completed(run_analysis(&config(input.path(), &out, CallMode::Conc)).unwrap());
    let report = &run.report;
    assert_eq!(report.dropped_standards, vec![3]);
    assert_eq!(report.standards.len(), 11);
    assert_eq!(report.excluded_wells.len(), 3);
    assert!(report.exclusion_text().contains("E23 (std_curve1)"));
    assert!(report.exclusion_text().contains("Std04"));
}

#[test]
fn index_mode_scores_three_standards() {
    let input = tempfile::tempdir().unwrap();
    let out = input.path().join("out");
    simulate(input.path(), &[]);

    let run = completed(run_analysis(&config(input.path(), &out, CallMode::Index)).unwrap());
    let named = &run.report.samples[0];
    assert_eq!(named.indices.len(), 3);
    assert_eq!(named.indices[0].label, "Std09");
}

#[test]
fn index_gate_stops_without_artifacts() {
    let input = tempfile::tempdir().unwrap();
    let out = input.path().join("out");
    simulate(input.path(), &["J23", "J24", "K23", "K24"]);

    match run_analysis(&config(input.path(), &out, CallMode::Index)).unwrap() {
        PipelineOutcome::IndexQcFailed(msg) => {
            assert!(msg.contains("Std09"));
            assert!(msg.contains("Std10"));
        }
        PipelineOutcome::Completed(_) => panic!("index gate should have stopped the run"),
    }
    assert!(!out.exists());

    // The same exclusions are fine for concentration calls.
    let run = completed(run_analysis(&config(input.path(), &out, CallMode::Conc)).unwrap());
    assert_eq!(run.report.dropped_standards, vec![8, 9]);
}

#[test]
fn missing_plate_plan_is_an_input_error() {
    let input = tempfile::tempdir().unwrap();
    simulate(input.path(), &[]);
    fs::remove_file(input.path().join(format!("{PLATE_ID}-pplan.csv"))).unwrap();

    let err = run_analysis(&config(input.path(), &input.path().join("out"), CallMode::Conc)).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
