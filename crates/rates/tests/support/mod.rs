#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use ggr_core::{CurrencyConfig, RateMap};
use ggr_db::Db;
use rates::{RateResolver, StaticRateSource};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut db = Db::open(dir.path().join("rates.sqlite")).expect("open db");
    db.migrate().expect("migrate db");
    TestDb { _dir: dir, db }
}

pub fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("date")
}

pub fn quotes(pairs: &[(&str, Decimal)]) -> RateMap {
    pairs
        .iter()
        .map(|(code, quote)| (code.to_string(), *quote))
        .collect()
}

/// USD at 1.25 per EUR (rate 0.8), GBP at 0.8 (rate 1.25), BTC at 0.00002
/// (rate 50000).
pub fn standard_quotes() -> RateMap {
    quotes(&[
        ("USD", dec!(1.25)),
        ("GBP", dec!(0.8)),
        ("BTC", dec!(0.00002)),
        ("EUR", dec!(1)),
    ])
}

pub fn resolver_for(source: Arc<StaticRateSource>) -> RateResolver {
    RateResolver::new(source, Arc::new(CurrencyConfig::default()))
}
