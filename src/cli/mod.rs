//! Command-line parsing for the ELISA plate analyzer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the assay math.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{Antigen, CallMode, StandardSet};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "elisa", version, about = "ELISA standard-curve plate analyzer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze one plate: fit the standard curve, call samples, write reports.
    Analyze(AnalyzeArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
    /// Write a synthetic plate (reader, plan and optional ignore CSVs).
    Simulate(SimulateArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    /// Plate identifier; input files are `<PLATE_ID>-preader.csv`, `-pplan.csv`, `-ignore.csv`.
    pub plate_id: String,

    /// Antigen the plate was coated with (s, n, n2; aliases spike, N-Spec, N-Sens).
    #[arg(short = 'a', long, value_enum)]
    pub antigen: Antigen,

    /// Standard concentration series.
    #[arg(short = 's', long, value_enum, default_value_t = StandardSet::Hero)]
    pub standards: StandardSet,

    /// How positive/negative calls are made.
    #[arg(short = 'm', long, value_enum, default_value_t = CallMode::Conc)]
    pub mode: CallMode,

    /// Also render the HTML report to PDF (needs `wkhtmltopdf`).
    #[arg(long)]
    pub pdf: bool,

    /// Directory holding the plate's input files.
    #[arg(long, default_value = ".")]
    pub input_dir: PathBuf,

    /// Plate reader CSV (overrides `<input-dir>/<PLATE_ID>-preader.csv`).
    #[arg(long)]
    pub reader: Option<PathBuf>,

    /// Plate plan CSV (overrides `<input-dir>/<PLATE_ID>-pplan.csv`).
    #[arg(long)]
    pub plan: Option<PathBuf>,

    /// Ignore list (overrides `<input-dir>/<PLATE_ID>-ignore.csv`).
    #[arg(long)]
    pub ignore: Option<PathBuf>,

    /// Directory for the CSV, figure and report outputs.
    #[arg(short = 'o', long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Render an ASCII plot of the standard curve in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the fitted curve (parameters + standards + grid) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,
}

/// Options for plotting a saved curve.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Curve JSON file produced by `elisa analyze --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Plate identifier used for the output file names.
    pub plate_id: String,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Relative SD of the per-well noise.
    #[arg(long, default_value_t = 0.03)]
    pub noise_cv: f64,

    /// Standard concentration series.
    #[arg(short = 's', long, value_enum, default_value_t = StandardSet::Hero)]
    pub standards: StandardSet,

    /// Number of trailing sample slots marked EMPTY.
    #[arg(long, default_value_t = 2)]
    pub empty_slots: usize,

    /// Well to list in the ignore file (repeatable).
    #[arg(long = "exclude", value_name = "WELL")]
    pub exclude: Vec<String>,

    /// Output directory.
    #[arg(short = 'o', long, default_value = ".")]
    pub out_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_defaults_and_aliases() {
        let cli = Cli::try_parse_from(["elisa", "analyze", "P001", "--antigen", "N-Sens"]).unwrap();
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.plate_id, "P001");
        assert_eq!(args.antigen, Antigen::NucleocapsidSensitivity);
        assert_eq!(args.standards, StandardSet::Hero);
        assert_eq!(args.mode, CallMode::Conc);
        assert!(!args.pdf);
        assert_eq!(args.input_dir, PathBuf::from("."));
    }

    #[test]
    fn analyze_requires_an_antigen() {
        assert!(Cli::try_parse_from(["elisa", "analyze", "P001"]).is_err());
        assert!(Cli::try_parse_from(["elisa", "analyze", "P001", "-a", "x"]).is_err());
    }

    #[test]
    fn simulate_collects_exclusions() {
        let cli = Cli::try_parse_from([
            "elisa", "simulate", "SIM", "--exclude", "E23", "--exclude", "E24", "-s", "who-s",
        ])
        .unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.exclude, vec!["E23", "E24"]);
        assert_eq!(args.standards, StandardSet::WhoS);
    }
}
