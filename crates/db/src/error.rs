#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("duplicate daily summary for {0}")]
    DuplicateSummary(chrono::NaiveDate),
}

pub type Result<T> = std::result::Result<T, DbError>;
