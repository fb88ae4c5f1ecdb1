use std::collections::BTreeSet;

use chrono::NaiveDate;
use ggr_core::{ConsolidatedRecord, SummaryScope};
use rusqlite::params;

use crate::Db;
use crate::error::Result;
use crate::helpers::{RECORD_COLUMNS, decimal_text, row_to_record};

/// Result of a bulk insert. Rows hitting the (date, username, account_id)
/// key are dropped, not treated as failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub inserted: usize,
    pub skipped: usize,
    /// Stored rows carrying a zero fx_rate.
    pub unresolved_rows: usize,
    pub unresolved_currencies: BTreeSet<String>,
}

impl Db {
    pub fn record_exists(&self, date: NaiveDate, username: &str, account_id: &str) -> Result<bool> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT 1
            FROM consolidated_record
            WHERE date = ?1 AND username = ?2 AND account_id = ?3
            "#,
        )?;
        Ok(stmt.exists(params![date, username, account_id])?)
    }

    pub fn insert_records(&mut self, records: &[ConsolidatedRecord]) -> Result<InsertOutcome> {
        if records.is_empty() {
            return Ok(InsertOutcome::default());
        }
        let tx = self.conn.transaction()?;
        let mut outcome = InsertOutcome::default();
        {
            let mut stmt = tx.prepare(&format!(
                r#"
                INSERT OR IGNORE INTO consolidated_record ({RECORD_COLUMNS})
                VALUES (
                  ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17
                )
                "#
            ))?;
            for record in records {
                let rows = stmt.execute(params![
                    record.date,
                    record.username,
                    record.account_id,
                    record.game_name,
                    record.game_id,
                    record.currency,
                    decimal_text(record.fx_rate),
                    decimal_text(record.bet),
                    decimal_text(record.win),
                    decimal_text(record.bet_eur),
                    decimal_text(record.win_eur),
                    record.number_of_spins,
                    decimal_text(record.cash_bet),
                    decimal_text(record.bonus_bet),
                    decimal_text(record.cash_win),
                    decimal_text(record.bonus_win),
                    record.site_name,
                ])?;
                if rows == 0 {
                    outcome.skipped += 1;
                    continue;
                }
                outcome.inserted += 1;
                if !record.qualifies() {
                    outcome.unresolved_rows += 1;
                    outcome.unresolved_currencies.insert(record.currency.clone());
                }
            }
        }
        tx.commit()?;
        Ok(outcome)
    }

    pub fn count_records(&self) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM consolidated_record", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|value| value.max(0) as u64)
            .map_err(crate::error::DbError::from)
    }

    /// Records with a positive fx_rate, oldest date first.
    pub fn qualifying_records(&self, scope: SummaryScope) -> Result<Vec<ConsolidatedRecord>> {
        let mut sql = format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM consolidated_record
            WHERE CAST(fx_rate AS REAL) > 0
            "#
        );
        if matches!(scope, SummaryScope::Date(_)) {
            sql.push_str(" AND date = ?1 ");
        }
        sql.push_str(" ORDER BY date ASC, id ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = match scope {
            SummaryScope::Date(date) => stmt.query_map(params![date], row_to_record)?,
            SummaryScope::All => stmt.query_map([], row_to_record)?,
        };
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Oldest and newest record dates regardless of rate.
    pub fn record_date_bounds(&self) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let bounds = self.conn.query_row(
            "SELECT MIN(date), MAX(date) FROM consolidated_record",
            [],
            |row| {
                Ok((
                    row.get::<_, Option<NaiveDate>>(0)?,
                    row.get::<_, Option<NaiveDate>>(1)?,
                ))
            },
        )?;
        Ok(match bounds {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        })
    }

    pub fn latest_qualifying_date(&self) -> Result<Option<NaiveDate>> {
        self.conn
            .query_row(
                r#"
                SELECT MAX(date)
                FROM consolidated_record
                WHERE CAST(fx_rate AS REAL) > 0
                "#,
                [],
                |row| row.get::<_, Option<NaiveDate>>(0),
            )
            .map_err(crate::error::DbError::from)
    }

    /// Distinct account ids among qualifying records, optionally for one date.
    pub fn distinct_players(&self, date: Option<NaiveDate>) -> Result<u64> {
        let count: i64 = match date {
            Some(date) => self.conn.query_row(
                r#"
                SELECT COUNT(DISTINCT account_id)
                FROM consolidated_record
                WHERE CAST(fx_rate AS REAL) > 0 AND date = ?1
                "#,
                params![date],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                r#"
                SELECT COUNT(DISTINCT account_id)
                FROM consolidated_record
                WHERE CAST(fx_rate AS REAL) > 0
                "#,
                [],
                |row| row.get(0),
            )?,
        };
        Ok(count.max(0) as u64)
    }
}
