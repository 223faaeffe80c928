//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the plate pipeline
//! - prints the summary, sample table and plots
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;
use log::info;

use crate::cli::{AnalyzeArgs, Command, PlotArgs, SimulateArgs};
use crate::data::{SimulationConfig, simulate_plate, write_simulated_plate};
use crate::domain::AnalysisConfig;
use crate::error::AppError;
use crate::io::{CurveFile, read_curve_json, write_curve_json};

pub mod pipeline;

use pipeline::PipelineOutcome;

/// Entry point for the `elisa` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Plot(args) => handle_plot(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args);
    let run = match pipeline::run_analysis(&config)? {
        PipelineOutcome::Completed(run) => run,
        PipelineOutcome::IndexQcFailed(message) => {
            println!("{message}");
            return Ok(());
        }
    };
    let report = &run.report;

    println!("{}", crate::report::format_run_summary(report));
    println!("{}", crate::report::format_sample_table(&report.samples));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &report.standards,
            &report.fit.params,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export_curve {
        let curve = CurveFile::new(
            &report.plate_id,
            report.analysed_on,
            report.antigen,
            report.standard_set,
            &report.standards,
            &report.fit,
        );
        write_curve_json(path, &curve)?;
        info!("Curve written to '{}'.", path.display());
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let curve = read_curve_json(&args.curve)?;
    let plot = crate::plot::render_ascii_plot_from_curve_file(&curve, args.width, args.height);

    println!("{plot}");
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = SimulationConfig {
        seed: args.seed,
        noise_cv: args.noise_cv,
        standard_set: args.standards,
        empty_slots: args.empty_slots,
        exclude: args.exclude.clone(),
        ..SimulationConfig::default()
    };
    let plate = simulate_plate(&config)?;
    let files = write_simulated_plate(&plate, &args.plate_id, &args.out_dir)?;

    println!("reader: {}", files.reader.display());
    println!("plan:   {}", files.plan.display());
    if let Some(ignore) = &files.ignore {
        println!("ignore: {}", ignore.display());
    }
    Ok(())
}

/// Resolve input paths and flags into a pipeline configuration.
///
/// Input files default to `<input-dir>/<PLATE_ID>-preader.csv`,
/// `-pplan.csv` and `-ignore.csv`; explicit paths win.
pub fn analysis_config_from_args(args: &AnalyzeArgs) -> AnalysisConfig {
    let default_path = |suffix: &str| args.input_dir.join(format!("{}-{suffix}.csv", args.plate_id));
    let pick = |explicit: &Option<PathBuf>, suffix: &str| {
        explicit.clone().unwrap_or_else(|| default_path(suffix))
    };

    AnalysisConfig {
        plate_id: args.plate_id.clone(),
        antigen: args.antigen,
        standard_set: args.standards,
        mode: args.mode,
        include_pdf: args.pdf,

        reader_path: pick(&args.reader, "preader"),
        plan_path: pick(&args.plan, "pplan"),
        ignore_path: pick(&args.ignore, "ignore"),
        out_dir: args.out_dir.clone(),

        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_curve: args.export_curve.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::cli::Cli;

    fn analyze_args(argv: &[&str]) -> AnalyzeArgs {
        let mut full = vec!["elisa", "analyze"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Analyze(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn default_input_paths_follow_plate_id() {
        let args = analyze_args(&["P7", "-a", "s", "--input-dir", "runs"]);
        let config = analysis_config_from_args(&args);
        assert_eq!(config.reader_path, Path::new("runs").join("P7-preader.csv"));
        assert_eq!(config.plan_path, Path::new("runs").join("P7-pplan.csv"));
        assert_eq!(config.ignore_path, Path::new("runs").join("P7-ignore.csv"));
        assert!(!config.include_pdf);
    }

    #[test]
    fn explicit_paths_override_defaults() {
        let args = analyze_args(&["P7", "-a", "n", "--plan", "/tmp/plan.csv", "--pdf", "-m", "index"]);
        let config = analysis_config_from_args(&args);
        assert_eq!(config.plan_path, PathBuf::from("/tmp/plan.csv"));
        assert_eq!(config.reader_path, PathBuf::from("./P7-preader.csv"));
        assert!(config.include_pdf);
        assert_eq!(config.mode, crate::domain::CallMode::Index);
    }
}
