use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use ggr_core::format_date;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which per-date summary a caller asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryTarget {
    Date(NaiveDate),
    Latest,
    All,
}

impl FromStr for SummaryTarget {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "all" => Ok(Self::All),
            other => parse_date(other).map(Self::Date),
        }
    }
}

impl fmt::Display for SummaryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => f.write_str(&format_date(*date)),
            Self::Latest => f.write_str("latest"),
            Self::All => f.write_str("all"),
        }
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date '{value}', expected YYYY-MM-DD")))
}
