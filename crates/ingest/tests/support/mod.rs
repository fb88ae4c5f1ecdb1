#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use ggr_core::{CurrencyConfig, RateMap};
use ggr_db::Db;
use rates::{RateResolver, StaticRateSource};
use rust_decimal_macros::dec;
use tempfile::TempDir;

pub const HEADER: &str = "Date,Username,Account_ID,Game Name,Game_ID,Currency,Site Name,Bet,Win,Number of Spins,Cash bet,Bonus bet,Cash win,Bonus win";

pub struct TestEnv {
    pub dir: TempDir,
    pub db: Db,
    pub source: Arc<StaticRateSource>,
    pub resolver: RateResolver,
}

pub fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("date")
}

/// USD 1.25/EUR, GBP 0.8/EUR, BTC 0.00002/EUR.
pub fn standard_quotes() -> RateMap {
    [
        ("USD", dec!(1.25)),
        ("GBP", dec!(0.8)),
        ("BTC", dec!(0.00002)),
        ("EUR", dec!(1)),
    ]
    .into_iter()
    .map(|(code, quote)| (code.to_string(), quote))
    .collect()
}

pub fn setup(dates: &[&str]) -> TestEnv {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut db = Db::open(dir.path().join("ingest.sqlite")).expect("open db");
    db.migrate().expect("migrate db");
    let source = dates.iter().fold(StaticRateSource::new(), |source, date| {
        source.with_quotes(day(date), standard_quotes())
    });
    let source = Arc::new(source);
    let resolver = RateResolver::new(source.clone(), Arc::new(CurrencyConfig::default()));
    TestEnv {
        dir,
        db,
        source,
        resolver,
    }
}

pub fn write_extract(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut body = String::from(HEADER);
    for row in rows {
        body.push('\n');
        body.push_str(row);
    }
    body.push('\n');
    fs::write(&path, body).expect("write extract");
    path
}
