use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use ggr_core::RawRecord;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer};

use crate::batch::is_csv_path;
use crate::types::{IngestError, IngestIssue, Result};

pub(crate) const REQUIRED_COLUMNS: &[&str] = &[
    "Date",
    "Username",
    "Account_ID",
    "Game Name",
    "Game_ID",
    "Currency",
    "Site Name",
    "Bet",
    "Win",
    "Number of Spins",
    "Cash bet",
    "Bonus bet",
    "Cash win",
    "Bonus win",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// One extract row as it appears in the file.
#[derive(Debug, Deserialize)]
struct ExtractRow {
    #[serde(rename = "Date", deserialize_with = "deserialize_extract_date")]
    date: NaiveDate,
    #[serde(rename = "Username")]
    username: String,
    #[serde(rename = "Account_ID")]
    account_id: String,
    #[serde(rename = "Game Name")]
    game_name: String,
    #[serde(rename = "Game_ID")]
    game_id: String,
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Site Name")]
    site_name: String,
    #[serde(rename = "Bet", deserialize_with = "deserialize_amount")]
    bet: Decimal,
    #[serde(rename = "Win", deserialize_with = "deserialize_amount")]
    win: Decimal,
    #[serde(rename = "Number of Spins", deserialize_with = "deserialize_spins")]
    number_of_spins: i64,
    #[serde(rename = "Cash bet", deserialize_with = "deserialize_optional_amount")]
    cash_bet: Decimal,
    #[serde(rename = "Bonus bet", deserialize_with = "deserialize_optional_amount")]
    bonus_bet: Decimal,
    #[serde(rename = "Cash win", deserialize_with = "deserialize_optional_amount")]
    cash_win: Decimal,
    #[serde(rename = "Bonus win", deserialize_with = "deserialize_optional_amount")]
    bonus_win: Decimal,
}

impl From<ExtractRow> for RawRecord {
    fn from(row: ExtractRow) -> Self {
        Self {
            date: row.date,
            username: row.username,
            account_id: row.account_id,
            game_name: row.game_name,
            game_id: row.game_id,
            currency: row.currency,
            site_name: row.site_name,
            bet: row.bet,
            win: row.win,
            number_of_spins: row.number_of_spins,
            cash_bet: row.cash_bet,
            bonus_bet: row.bonus_bet,
            cash_win: row.cash_win,
            bonus_win: row.bonus_win,
        }
    }
}

pub(crate) fn parse_extract_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|value| value.date())
        })
}

pub(crate) fn parse_amount(raw: &str) -> Option<Decimal> {
    let value = raw.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// Spin counts sometimes arrive float-formatted (`12.0`); fractions are rejected.
pub(crate) fn parse_spins(raw: &str) -> Option<i64> {
    let value = parse_amount(raw)?;
    if !value.fract().is_zero() {
        return None;
    }
    value.to_i64()
}

fn deserialize_extract_date<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<NaiveDate, D::Error> {
    let raw: String = Deserialize::deserialize(d)?;
    parse_extract_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
}

fn deserialize_amount<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Decimal, D::Error> {
    let raw: String = Deserialize::deserialize(d)?;
    parse_amount(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid amount '{raw}'")))
}

fn deserialize_optional_amount<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Decimal, D::Error> {
    let raw: String = Deserialize::deserialize(d)?;
    if raw.trim().is_empty() {
        return Ok(Decimal::ZERO);
    }
    parse_amount(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid amount '{raw}'")))
}

fn deserialize_spins<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<i64, D::Error> {
    let raw: String = Deserialize::deserialize(d)?;
    parse_spins(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid spin count '{raw}'")))
}

/// Rows parsed from one extract plus the rows that could not be used.
#[derive(Debug, Default)]
pub struct ParsedExtract {
    pub file_path: String,
    pub records: Vec<RawRecord>,
    pub issues: Vec<IngestIssue>,
}

/// Parses an extract from any reader. A bad header is fatal; a bad row is an issue.
pub fn records_from_reader<R: Read>(reader: R, file_path: &str) -> Result<ParsedExtract> {
    let csv_error = |source| IngestError::Csv {
        path: file_path.to_string(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers().map_err(csv_error)?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns {
            path: file_path.to_string(),
            columns: missing.join(", "),
        });
    }

    let mut parsed = ParsedExtract {
        file_path: file_path.to_string(),
        ..ParsedExtract::default()
    };
    for row in rdr.deserialize::<ExtractRow>() {
        match row {
            Ok(row) => parsed.records.push(row.into()),
            Err(err) => {
                if err.is_io_error() {
                    return Err(csv_error(err));
                }
                parsed.issues.push(IngestIssue {
                    file_path: file_path.to_string(),
                    line: err.position().map(|position| position.line()),
                    message: err.to_string(),
                });
            }
        }
    }
    Ok(parsed)
}

/// Opens and parses one extract file. Unreadable files are hard errors.
pub fn read_extract(path: &Path) -> Result<ParsedExtract> {
    let file_path = path.to_string_lossy().to_string();
    if !is_csv_path(path) {
        return Err(IngestError::UnsupportedFormat(file_path));
    }
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    records_from_reader(file, &file_path)
}
