#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;
use ggr_core::{ConsolidatedRecord, DailySummary};
use ggr_db::Db;
use rust_decimal::Decimal;
use tempfile::TempDir;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("date")
}

pub fn make_record(
    date: &str,
    username: &str,
    account_id: &str,
    currency: &str,
    fx_rate: Decimal,
    bet: Decimal,
    win: Decimal,
    spins: i64,
) -> ConsolidatedRecord {
    ConsolidatedRecord {
        date: day(date),
        username: username.to_string(),
        account_id: account_id.to_string(),
        game_name: "Fruit Reels".to_string(),
        game_id: "g-1".to_string(),
        currency: currency.to_string(),
        fx_rate,
        bet,
        win,
        bet_eur: bet * fx_rate,
        win_eur: win * fx_rate,
        number_of_spins: spins,
        cash_bet: bet,
        bonus_bet: Decimal::ZERO,
        cash_win: win,
        bonus_win: Decimal::ZERO,
        site_name: "SiteA".to_string(),
    }
}

pub fn make_summary(date: &str, total_bet: Decimal, total_win: Decimal) -> DailySummary {
    DailySummary {
        date: day(date),
        total_bet,
        total_win,
        reel_spins: 10,
        social_spins: 0,
        total_spins: 10,
        rtp: Decimal::ZERO,
        ggr_eur: total_bet - total_win,
        ggr_gbp: total_bet - total_win,
    }
}
