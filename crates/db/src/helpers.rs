use std::str::FromStr;

use ggr_core::{ConsolidatedRecord, DailySummary};
use rusqlite::Row;
use rusqlite::types::Type;
use rust_decimal::Decimal;

pub(crate) const RECORD_COLUMNS: &str = r#"
    date, username, account_id, game_name, game_id, currency, fx_rate, bet, win,
    bet_eur, win_eur, number_of_spins, cash_bet, bonus_bet, cash_win, bonus_win, site_name
"#;

pub(crate) const SUMMARY_COLUMNS: &str = r#"
    date, total_bet, total_win, reel_spins, social_spins, total_spins, rtp, ggr_eur, ggr_gbp
"#;

/// Decimals are stored as TEXT so they round-trip without float drift.
pub(crate) fn decimal_at(row: &Row<'_>, idx: usize) -> std::result::Result<Decimal, rusqlite::Error> {
    let text: String = row.get(idx)?;
    Decimal::from_str(text.trim())
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

pub(crate) fn decimal_text(value: Decimal) -> String {
    value.to_string()
}

pub(crate) fn row_to_record(
    row: &Row<'_>,
) -> std::result::Result<ConsolidatedRecord, rusqlite::Error> {
    Ok(ConsolidatedRecord {
        date: row.get(0)?,
        username: row.get(1)?,
        account_id: row.get(2)?,
        game_name: row.get(3)?,
        game_id: row.get(4)?,
        currency: row.get(5)?,
        fx_rate: decimal_at(row, 6)?,
        bet: decimal_at(row, 7)?,
        win: decimal_at(row, 8)?,
        bet_eur: decimal_at(row, 9)?,
        win_eur: decimal_at(row, 10)?,
        number_of_spins: row.get(11)?,
        cash_bet: decimal_at(row, 12)?,
        bonus_bet: decimal_at(row, 13)?,
        cash_win: decimal_at(row, 14)?,
        bonus_win: decimal_at(row, 15)?,
        site_name: row.get(16)?,
    })
}

pub(crate) fn row_to_summary(row: &Row<'_>) -> std::result::Result<DailySummary, rusqlite::Error> {
    Ok(DailySummary {
        date: row.get(0)?,
        total_bet: decimal_at(row, 1)?,
        total_win: decimal_at(row, 2)?,
        reel_spins: row.get(3)?,
        social_spins: row.get(4)?,
        total_spins: row.get(5)?,
        rtp: decimal_at(row, 6)?,
        ggr_eur: decimal_at(row, 7)?,
        ggr_gbp: decimal_at(row, 8)?,
    })
}
