//! CSV ingest for the three plate inputs.
//!
//! - plate reader export: `group,well,od`, one row per well
//! - plate plan: `group,sample`, one row per sample slot
//! - ignore list: headerless `well,group` lines, `#` comments allowed
//!
//! Design goals:
//! - **Strict schema** for required fields (clear errors + exit code 2)
//! - **No partial loads**: the first bad row fails the run with its line number
//! - **Order preserved**: wells keep file order within their group

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::info;

use crate::domain::IgnoreEntry;
use crate::error::AppError;
use crate::plate::PlateReadings;

/// Sample-metadata store: plate-plan descriptor per well group, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatePlan {
    entries: Vec<(String, String)>,
}

impl PlatePlan {
    pub fn descriptor(&self, group: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(g, _)| g == group)
            .map(|(_, d)| d.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load the plate-reader export.
pub fn load_plate_readings(path: &Path) -> Result<PlateReadings, AppError> {
    let file = open(path, "plate reader CSV")?;
    let plate = read_plate_readings(file, &path.display().to_string())?;
    info!("Loaded {} wells from '{}'.", plate.well_count(), path.display());
    Ok(plate)
}

pub fn read_plate_readings<R: Read>(input: R, source: &str) -> Result<PlateReadings, AppError> {
    let mut reader = headered_reader(input);
    let header_map = read_header_map(&mut reader, source)?;
    ensure_columns(&header_map, &["group", "well", "od"], source)?;

    let mut plate = PlateReadings::new();
    let mut seen = HashSet::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| row_error(source, line, format!("CSV parse error: {e}")))?;

        let group = get_required(&record, &header_map, "group").map_err(|e| row_error(source, line, e))?;
        let well = get_required(&record, &header_map, "well").map_err(|e| row_error(source, line, e))?;
        let od_raw = get_required(&record, &header_map, "od").map_err(|e| row_error(source, line, e))?;
        let od = parse_f64(od_raw).ok_or_else(|| row_error(source, line, format!("Invalid OD value '{od_raw}'.")))?;

        if !seen.insert(well.to_string()) {
            return Err(row_error(source, line, format!("Well '{well}' appears more than once.")));
        }
        plate.push(group, well, od);
    }

    if plate.well_count() == 0 {
        return Err(AppError::new(2, format!("'{source}' contains no wells.")));
    }
    Ok(plate)
}

/// Load the plate plan.
pub fn load_plate_plan(path: &Path) -> Result<PlatePlan, AppError> {
    let file = open(path, "plate plan CSV")?;
    read_plate_plan(file, &path.display().to_string())
}

pub fn read_plate_plan<R: Read>(input: R, source: &str) -> Result<PlatePlan, AppError> {
    let mut reader = headered_reader(input);
    let header_map = read_header_map(&mut reader, source)?;
    ensure_columns(&header_map, &["group", "sample"], source)?;

    let mut plan = PlatePlan::default();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| row_error(source, line, format!("CSV parse error: {e}")))?;
        let group = get_required(&record, &header_map, "group").map_err(|e| row_error(source, line, e))?;
        let sample = get_required(&record, &header_map, "sample").map_err(|e| row_error(source, line, e))?;

        if plan.descriptor(group).is_some() {
            return Err(row_error(source, line, format!("Group '{group}' is listed more than once.")));
        }
        plan.entries.push((group.to_string(), sample.to_string()));
    }
    Ok(plan)
}

/// Load the ignore list. A missing file means no exclusions.
pub fn load_ignore_list(path: &Path) -> Result<Vec<IgnoreEntry>, AppError> {
    if !path.exists() {
        info!("No ignore list at '{}'; no wells excluded.", path.display());
        return Ok(Vec::new());
    }
    let file = open(path, "ignore list")?;
    let entries = read_ignore_list(file, &path.display().to_string())?;
    info!("Loaded {} ignore entries from '{}'.", entries.len(), path.display());
    Ok(entries)
}

pub fn read_ignore_list<R: Read>(input: R, source: &str) -> Result<Vec<IgnoreEntry>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::new(2, format!("'{source}': CSV parse error: {e}")))?;
        let line = record.position().map_or(idx + 1, |p| p.line() as usize);

        let fields: Vec<&str> = record.iter().map(|f| f.trim_start_matches('\u{feff}')).collect();
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }
        match fields.as_slice() {
            [well, group, ..] if !well.is_empty() && !group.is_empty() => {
                out.push(IgnoreEntry::new(*well, *group));
            }
            _ => {
                return Err(row_error(
                    source,
                    line,
                    format!("Expected 'well,group', found '{}'.", fields.join(",")),
                ));
            }
        }
    }
    Ok(out)
}

fn open(path: &Path, what: &str) -> Result<File, AppError> {
    File::open(path).map_err(|e| AppError::new(2, format!("Failed to open {what} '{}': {e}", path.display())))
}

fn headered_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn read_header_map<R: Read>(reader: &mut csv::Reader<R>, source: &str) -> Result<HashMap<String, usize>, AppError> {
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers of '{source}': {e}")))?;
    Ok(build_header_map(headers))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often carry a UTF-8 BOM on the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_columns(header_map: &HashMap<String, usize>, names: &[&str], source: &str) -> Result<(), AppError> {
    for name in names {
        if !header_map.contains_key(*name) {
            return Err(AppError::new(2, format!("'{source}' is missing required column `{name}`.")));
        }
    }
    Ok(())
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn row_error(source: &str, line: usize, message: impl std::fmt::Display) -> AppError {
    AppError::new(2, format!("'{source}' line {line}: {message}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_csv_keeps_well_order_and_strips_bom() {
        let csv = "\u{feff}Group, Well ,OD\nblk,G20,0.05\nsample01,A1,0.40\nblk,H20,0.06\n";
        let plate = read_plate_readings(csv.as_bytes(), "t").unwrap();
        assert_eq!(plate.ods("blk").unwrap(), vec![0.05, 0.06]);
        assert_eq!(plate.group_of("A1"), Some("sample01"));
    }

    #[test]
    fn reader_csv_rejects_bad_rows() {
        let err = read_plate_readings("group,well,od\nblk,G20,abc\n".as_bytes(), "t").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("line 2"), "{err}");

        let err = read_plate_readings("group,well,od\nblk,G20,0.1\npos,G20,0.2\n".as_bytes(), "t").unwrap_err();
        assert!(err.to_string().contains("more than once"), "{err}");

        let err = read_plate_readings("group,od\nblk,0.1\n".as_bytes(), "t").unwrap_err();
        assert!(err.to_string().contains("`well`"), "{err}");

        let err = read_plate_readings("group,well,od\nblk,G20,NaN\n".as_bytes(), "t").unwrap_err();
        assert!(err.to_string().contains("Invalid OD"), "{err}");
    }

    #[test]
    fn plan_lookup() {
        let plan = read_plate_plan("group,sample\nsample01,PT1-100\nsample02,EMPTY\n".as_bytes(), "t").unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.descriptor("sample02"), Some("EMPTY"));
        assert_eq!(plan.descriptor("sample03"), None);

        let err = read_plate_plan("group,sample\nsample01,A-1\nsample01,B-2\n".as_bytes(), "t").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn ignore_list_skips_comments_and_blank_lines() {
        let text = "# excluded after review\nA3, sample01\n\nE23,std_curve1\n";
        let entries = read_ignore_list(text.as_bytes(), "t").unwrap();
        assert_eq!(
            entries,
            vec![IgnoreEntry::new("A3", "sample01"), IgnoreEntry::new("E23", "std_curve1")]
        );
    }

    #[test]
    fn ignore_list_rejects_lines_without_group() {
        let err = read_ignore_list("A3,sample01\nB4\n".as_bytes(), "t").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn missing_ignore_file_means_no_exclusions() {
        let dir = tempfile::tempdir().unwrap();
        let entries = load_ignore_list(&dir.path().join("P1-ignore.csv")).unwrap();
        assert!(entries.is_empty());
    }
}
