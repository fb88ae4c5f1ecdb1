use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("rate source request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rate source returned an unsuccessful response for {date}: {detail}")]
    Unsuccessful { date: NaiveDate, detail: String },
    #[error("rate source has no quotes for {0}")]
    NoQuotes(NaiveDate),
    #[error("missing {currency} anchor rate for {date}")]
    MissingAnchor { currency: &'static str, date: NaiveDate },
    #[error(transparent)]
    Db(#[from] ggr_db::DbError),
}

pub type Result<T> = std::result::Result<T, RateError>;
