#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use ggr_app::{AppConfig, AppState};
use ggr_core::{ConsolidatedRecord, CurrencyConfig, RateMap};
use rates::{FixerSettings, StaticRateSource};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

pub const HEADER: &str = "Date,Username,Account_ID,Game Name,Game_ID,Currency,Site Name,Bet,Win,Number of Spins,Cash bet,Bonus bet,Cash win,Bonus win";

pub struct TestApp {
    pub dir: TempDir,
    pub state: AppState,
    pub source: Arc<StaticRateSource>,
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

pub fn setup_app(quote_dates: &[&str]) -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = AppConfig {
        db_path: dir.path().join("app.sqlite"),
        report_dir: dir.path().join("reports"),
        rates: FixerSettings::default(),
        currency: CurrencyConfig::default(),
    };
    let source = quote_dates
        .iter()
        .fold(StaticRateSource::new(), |source, date| {
            source.with_quotes(day(date), standard_quotes())
        });
    let source = Arc::new(source);
    let state = AppState::with_rate_source(config, source.clone());
    state.setup_db().expect("setup db");
    TestApp { dir, state, source }
}

pub fn write_extract(app: &TestApp, name: &str, rows: &[&str]) -> PathBuf {
    let path = app.dir.path().join(name);
    let mut body = String::from(HEADER);
    for row in rows {
        body.push('\n');
        body.push_str(row);
    }
    body.push('\n');
    fs::write(&path, body).expect("write extract");
    path
}

/// Stores fixed rates for a date so no source call is needed.
pub fn seed_rates(app: &TestApp, date: &str, gbp: Decimal) {
    let mut db = app.state.open_db().expect("open db");
    let rates: RateMap = [
        ("EUR", Decimal::ONE),
        ("USD", dec!(0.8)),
        ("BTC", dec!(50000)),
        ("GBP", gbp),
    ]
    .into_iter()
    .map(|(code, rate)| (code.to_string(), rate))
    .collect();
    db.insert_rates(day(date), &rates).expect("seed rates");
}

pub fn eur_record(date: &str, username: &str, account_id: &str, bet: Decimal, win: Decimal, spins: i64) -> ConsolidatedRecord {
    ConsolidatedRecord {
        date: day(date),
        username: username.to_string(),
        account_id: account_id.to_string(),
        game_name: "Fruit Reels".to_string(),
        game_id: "g-1".to_string(),
        currency: "EUR".to_string(),
        fx_rate: Decimal::ONE,
        bet,
        win,
        bet_eur: bet,
        win_eur: win,
        number_of_spins: spins,
        cash_bet: bet,
        bonus_bet: Decimal::ZERO,
        cash_win: win,
        bonus_win: Decimal::ZERO,
        site_name: "SiteA".to_string(),
    }
}

pub fn seed_records(app: &TestApp, records: &[ConsolidatedRecord]) {
    let mut db = app.state.open_db().expect("open db");
    db.insert_records(records).expect("seed records");
}
