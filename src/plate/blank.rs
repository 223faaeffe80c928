//! Blank normalizer.

use log::info;

use crate::domain::GroupStats;
use crate::error::AnalysisError;
use crate::math::group_stats;
use crate::plate::PlateReadings;
use crate::plate::layout::BLANK_GROUP;

#[derive(Debug, Clone)]
pub struct BlankNormalized {
    /// Every reading minus the blank mean (blanks and standards included).
    pub plate: PlateReadings,
    /// Blank statistics before subtraction.
    pub blank: GroupStats,
}

/// Subtract the mean of the `blk` wells from every reading on the plate.
pub fn normalize_blanks(plate: PlateReadings) -> Result<BlankNormalized, AnalysisError> {
    let blank = group_stats(BLANK_GROUP, &plate.ods(BLANK_GROUP)?)?;
    info!("Blank mean {:.3} (CV {:.3}) subtracted from all wells.", blank.mean, blank.cv);

    let plate = plate.map_ods(|od| od - blank.mean);
    Ok(BlankNormalized { plate, blank })
}
