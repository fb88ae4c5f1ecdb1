use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

/// Ingest summary returned after consolidating one batch of extracts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    pub batch_date: Option<NaiveDate>,
    pub files_read: usize,
    pub rows_read: usize,
    pub inserted: usize,
    pub skipped: usize,
    /// House-account rows dropped before storage. Informational only; they
    /// never reach any aggregate.
    pub excluded: usize,
    /// Stored rows with no rate for their currency, counted after dedup.
    pub unresolved_rows: usize,
    pub unresolved_currencies: BTreeSet<String>,
    pub issues: Vec<IngestIssue>,
}

/// Non-fatal issues encountered during ingest.
#[derive(Debug, Clone, Serialize)]
pub struct IngestIssue {
    pub file_path: String,
    pub line: Option<u64>,
    pub message: String,
}

/// Errors emitted by the ingest pipeline.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("no extract files supplied")]
    NoFiles,
    #[error("invalid filename format for {0}, expected '_YYYY-MM-DD' before the extension")]
    InvalidFilename(String),
    #[error("extract files have inconsistent dates: {first} ({expected}) and {file} ({found})")]
    DateMismatch {
        first: String,
        expected: NaiveDate,
        file: String,
        found: NaiveDate,
    },
    #[error("unsupported extract format for {0}, only .csv is readable")]
    UnsupportedFormat(String),
    #[error("{path} is missing columns: {columns}")]
    MissingColumns { path: String, columns: String },
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("csv error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Rates(#[from] rates::RateError),
    #[error(transparent)]
    Db(#[from] ggr_db::DbError),
}

impl IngestError {
    /// Errors raised before anything is read or persisted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoFiles
                | Self::InvalidFilename(_)
                | Self::DateMismatch { .. }
                | Self::UnsupportedFormat(_)
                | Self::MissingColumns { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
