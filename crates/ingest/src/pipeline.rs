use std::path::PathBuf;
use std::time::Instant;

use ggr_db::Db;
use rates::RateResolver;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::batch::{collect_extract_paths, validate_batch};
use crate::extract::{ParsedExtract, read_extract};
use crate::normalize::{Normalized, Normalizer};
use crate::types::{IngestError, IngestStats, Result};

/// Consolidates one batch of extracts for a single date.
///
/// Filenames are validated before any file is opened; every file is parsed
/// before the rate for the batch date is resolved; records are inserted in
/// one transaction at the end. Rows whose key is already stored, or that
/// collide with a concurrent writer, are counted as skipped.
pub fn ingest_files(db: &mut Db, resolver: &RateResolver, inputs: &[PathBuf]) -> Result<IngestStats> {
    let started = Instant::now();
    let paths = collect_extract_paths(inputs)?;
    if paths.is_empty() {
        return Err(IngestError::NoFiles);
    }
    let batch_date = validate_batch(&paths)?;
    let mut stats = IngestStats {
        batch_date: Some(batch_date),
        ..IngestStats::default()
    };

    let parsed = paths
        .par_iter()
        .map(|path| read_extract(path))
        .collect::<Result<Vec<ParsedExtract>>>()?;
    stats.files_read = parsed.len();

    let rates = resolver.resolve(db, batch_date)?;
    let currency = resolver.currency();
    let normalizer = Normalizer::new(currency, &currency.house_accounts, &rates);

    let mut records = Vec::new();
    for file in parsed {
        debug!(
            file = %file.file_path,
            rows = file.records.len(),
            issues = file.issues.len(),
            "parsed extract"
        );
        stats.rows_read += file.records.len();
        stats.issues.extend(file.issues);
        for raw in file.records {
            match normalizer.normalize(db, raw)? {
                Normalized::Record(record) => records.push(record),
                Normalized::Excluded => stats.excluded += 1,
                Normalized::Duplicate => stats.skipped += 1,
            }
        }
    }

    let outcome = db.insert_records(&records)?;
    stats.inserted = outcome.inserted;
    stats.skipped += outcome.skipped;
    stats.unresolved_rows = outcome.unresolved_rows;
    stats.unresolved_currencies = outcome.unresolved_currencies;
    for code in &stats.unresolved_currencies {
        warn!(%batch_date, currency = %code, "no exchange rate for currency, fx_rate set to 0");
    }
    if outcome.skipped > 0 {
        warn!(
            %batch_date,
            dropped = outcome.skipped,
            "dropped rows that conflicted with stored records"
        );
    }
    info!(
        %batch_date,
        files = stats.files_read,
        rows = stats.rows_read,
        inserted = stats.inserted,
        skipped = stats.skipped,
        excluded = stats.excluded,
        unresolved = stats.unresolved_rows,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "ingest complete"
    );
    Ok(stats)
}
