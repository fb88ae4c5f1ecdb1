use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use walkdir::WalkDir;

use crate::types::{IngestError, Result};

pub(crate) fn is_csv_path(path: &Path) -> bool {
    path.extension()
        .and_then(|value| value.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Date carried by an extract filename: the segment after the last `_`, up to
/// the first `.`, e.g. `report_SITEA_2024-06-01.csv`.
pub fn batch_date_from_filename(path: &Path) -> Result<NaiveDate> {
    let name = display_name(path);
    let Some((_, tail)) = name.rsplit_once('_') else {
        return Err(IngestError::InvalidFilename(name));
    };
    let stamp = tail.split('.').next().unwrap_or_default();
    NaiveDate::parse_from_str(stamp, "%Y-%m-%d").map_err(|_| IngestError::InvalidFilename(name))
}

/// Checks every filename and returns the shared batch date. Nothing is read.
pub fn validate_batch(paths: &[PathBuf]) -> Result<NaiveDate> {
    let Some((first, rest)) = paths.split_first() else {
        return Err(IngestError::NoFiles);
    };
    let expected = batch_date_from_filename(first)?;
    for path in rest {
        let found = batch_date_from_filename(path)?;
        if found != expected {
            return Err(IngestError::DateMismatch {
                first: display_name(first),
                expected,
                file: display_name(path),
                found,
            });
        }
    }
    Ok(expected)
}

/// Expands directories into the `.csv` files beneath them, sorted. Plain file
/// inputs are kept whatever their extension.
pub fn collect_extract_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            paths.push(input.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(input).follow_links(false) {
            let entry = entry?;
            if entry.file_type().is_file() && is_csv_path(entry.path()) {
                found.push(entry.into_path());
            }
        }
        found.sort();
        paths.extend(found);
    }
    Ok(paths)
}
