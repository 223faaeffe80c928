//! Synthetic plate generation.
//!
//! Builds a plate whose standards and samples follow a known 4PL curve plus
//! a constant blank level, with multiplicative Gaussian noise per well. The
//! output uses the same CSV layouts the `analyze` command reads, so a
//! simulated plate can be analysed end to end.
//!
//! Layout (384-well plate, rows A..P, columns 1..24):
//! - sample slot *k* (0-based): row `A + k % 16`, columns `1 + 3·(k / 16)` ..+2
//! - positive control A20..C20, negative control D20..F20, blanks G20..J20
//! - standards: column 23 (`std_curve1`) and column 24 (`std_curve2`), rows B..M

use std::fs::File;
use std::path::{Path, PathBuf};

use log::info;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{FitParameters, IgnoreEntry, StandardSet};
use crate::error::AppError;
use crate::models::logistic4;
use crate::plate::PlateReadings;
use crate::plate::layout::{
    BLANK_GROUP, EMPTY_DESCRIPTOR, NEGATIVE_CONTROL_GROUP, POSITIVE_CONTROL_GROUP, SAMPLE_SLOT_COUNT, STD_CURVE1_CELLS,
    STD_CURVE1_GROUP, STD_CURVE2_CELLS, STD_CURVE2_GROUP, sample_group_name,
};

const REPLICATES: usize = 3;
const ROWS: &[u8; 16] = b"ABCDEFGHIJKLMNOP";

/// Blank-free 4PL used for simulated plates.
pub const DEFAULT_TRUTH: FitParameters = FitParameters {
    a: 0.0,
    b: 1.1,
    c: 80.0,
    d: 2.6,
};

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub seed: u64,
    /// Relative SD of the per-well multiplicative noise.
    pub noise_cv: f64,
    pub standard_set: StandardSet,
    pub truth: FitParameters,
    pub blank_od: f64,
    /// Trailing slots written as `EMPTY` in the plan.
    pub empty_slots: usize,
    /// Wells to list in the generated ignore file.
    pub exclude: Vec<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            noise_cv: 0.03,
            standard_set: StandardSet::Hero,
            truth: DEFAULT_TRUTH,
            blank_od: 0.05,
            empty_slots: 2,
            exclude: Vec::new(),
        }
    }
}

/// One row of the plate-reader CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedWell {
    pub group: String,
    pub well: String,
    pub od: f64,
}

#[derive(Debug, Clone)]
pub struct SimulatedPlate {
    pub wells: Vec<SimulatedWell>,
    /// `(group, descriptor)` rows of the plate plan.
    pub plan: Vec<(String, String)>,
    pub ignore: Vec<IgnoreEntry>,
    /// True concentration of each named sample, by slot (1-based).
    pub sample_truth: Vec<(usize, f64)>,
}

impl SimulatedPlate {
    pub fn readings(&self) -> PlateReadings {
        let mut plate = PlateReadings::new();
        for w in &self.wells {
            plate.push(&w.group, w.well.clone(), w.od);
        }
        plate
    }
}

/// Paths written by `write_simulated_plate`.
#[derive(Debug, Clone)]
pub struct SimulatedFiles {
    pub reader: PathBuf,
    pub plan: PathBuf,
    pub ignore: Option<PathBuf>,
}

pub fn simulate_plate(config: &SimulationConfig) -> Result<SimulatedPlate, AppError> {
    if !(config.noise_cv.is_finite() && config.noise_cv >= 0.0 && config.noise_cv < 0.5) {
        return Err(AppError::new(2, "Noise CV must be in [0, 0.5)."));
    }
    if config.empty_slots > SAMPLE_SLOT_COUNT {
        return Err(AppError::new(2, format!("At most {SAMPLE_SLOT_COUNT} slots can be empty.")));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise =
        Normal::new(0.0, config.noise_cv).map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
    let read = |signal: f64, rng: &mut StdRng| (config.blank_od + signal) * (1.0 + noise.sample(rng));

    let concs = config.standard_set.concentrations();
    let (lo, hi) = (concs[concs.len() - 1].ln(), concs[0].ln());

    let mut wells = Vec::new();
    let mut plan = Vec::with_capacity(SAMPLE_SLOT_COUNT);
    let mut sample_truth = Vec::new();

    for k in 0..SAMPLE_SLOT_COUNT {
        let slot = k + 1;
        let group = sample_group_name(slot);
        let named = slot <= SAMPLE_SLOT_COUNT - config.empty_slots;

        // Named samples span slightly past both ends of the curve.
        let signal = if named {
            let conc = rng.gen_range((lo - 0.7)..(hi + 0.7)).exp();
            sample_truth.push((slot, conc));
            plan.push((group.clone(), format!("S{slot:03}-100")));
            logistic4(conc, &config.truth)
        } else {
            plan.push((group.clone(), EMPTY_DESCRIPTOR.to_string()));
            0.0
        };

        let row = ROWS[k % 16] as char;
        let first_col = 1 + 3 * (k / 16);
        for rep in 0..REPLICATES {
            wells.push(SimulatedWell {
                group: group.clone(),
                well: format!("{row}{}", first_col + rep),
                od: read(signal, &mut rng),
            });
        }
    }

    let controls = [
        (POSITIVE_CONTROL_GROUP, 0usize, 3usize, logistic4(concs[1], &config.truth)),
        (NEGATIVE_CONTROL_GROUP, 3, 3, 0.0),
        (BLANK_GROUP, 6, 4, 0.0),
    ];
    for (group, start, count, signal) in controls {
        for r in start..start + count {
            wells.push(SimulatedWell {
                group: group.to_string(),
                well: format!("{}20", ROWS[r] as char),
                od: read(signal, &mut rng),
            });
        }
    }

    for (group, cells) in [(STD_CURVE1_GROUP, STD_CURVE1_CELLS), (STD_CURVE2_GROUP, STD_CURVE2_CELLS)] {
        for (cell, &conc) in cells.iter().zip(concs.iter()) {
            wells.push(SimulatedWell {
                group: group.to_string(),
                well: cell.to_string(),
                od: read(logistic4(conc, &config.truth), &mut rng),
            });
        }
    }

    let mut ignore = Vec::with_capacity(config.exclude.len());
    for well in &config.exclude {
        let Some(w) = wells.iter().find(|w| &w.well == well) else {
            return Err(AppError::new(2, format!("Cannot exclude '{well}': not on the simulated plate.")));
        };
        ignore.push(IgnoreEntry::new(well.clone(), w.group.clone()));
    }

    Ok(SimulatedPlate {
        wells,
        plan,
        ignore,
        sample_truth,
    })
}

/// Write `<id>-preader.csv`, `<id>-pplan.csv` and, when there are
/// exclusions, `<id>-ignore.csv` into `out_dir`.
pub fn write_simulated_plate(plate: &SimulatedPlate, plate_id: &str, out_dir: &Path) -> Result<SimulatedFiles, AppError> {
    std::fs::create_dir_all(out_dir)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", out_dir.display())))?;

    let reader = out_dir.join(format!("{plate_id}-preader.csv"));
    let mut w = csv_writer(&reader)?;
    write_record(&mut w, &reader, ["group", "well", "od"])?;
    for well in &plate.wells {
        let od = format!("{:.4}", well.od);
        write_record(&mut w, &reader, [well.group.as_str(), well.well.as_str(), od.as_str()])?;
    }
    flush(&mut w, &reader)?;

    let plan = out_dir.join(format!("{plate_id}-pplan.csv"));
    let mut w = csv_writer(&plan)?;
    write_record(&mut w, &plan, ["group", "sample"])?;
    for (group, descriptor) in &plate.plan {
        write_record(&mut w, &plan, [group.as_str(), descriptor.as_str()])?;
    }
    flush(&mut w, &plan)?;

    let ignore = if plate.ignore.is_empty() {
        None
    } else {
        let path = out_dir.join(format!("{plate_id}-ignore.csv"));
        let mut w = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;
        for entry in &plate.ignore {
            write_record(&mut w, &path, [entry.well.as_str(), entry.group.as_str()])?;
        }
        flush(&mut w, &path)?;
        Some(path)
    };

    info!("Wrote simulated plate '{plate_id}' to '{}'.", out_dir.display());
    Ok(SimulatedFiles { reader, plan, ignore })
}

fn csv_writer(path: &Path) -> Result<csv::Writer<File>, AppError> {
    csv::Writer::from_path(path).map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))
}

fn write_record<const N: usize>(w: &mut csv::Writer<File>, path: &Path, fields: [&str; N]) -> Result<(), AppError> {
    w.write_record(fields)
        .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))
}

fn flush(w: &mut csv::Writer<File>, path: &Path) -> Result<(), AppError> {
    w.flush()
        .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))
}
