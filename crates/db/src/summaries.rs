use std::collections::BTreeSet;

use chrono::NaiveDate;
use ggr_core::DailySummary;
use rusqlite::{ErrorCode, OptionalExtension, params};

use crate::Db;
use crate::error::{DbError, Result};
use crate::helpers::{SUMMARY_COLUMNS, decimal_text, row_to_summary};

const INSERT_SUMMARY: &str = r#"
    INSERT INTO daily_summary (
      date, total_bet, total_win, reel_spins, social_spins, total_spins, rtp, ggr_eur, ggr_gbp
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#;

impl Db {
    /// Writes summaries in one transaction, replacing any row for the same date.
    pub fn upsert_summaries(&mut self, summaries: &[DailySummary]) -> Result<usize> {
        if summaries.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut written = 0usize;
        {
            let mut stmt = tx.prepare(&format!(
                r#"
                {INSERT_SUMMARY}
                ON CONFLICT(date) DO UPDATE SET
                  total_bet = excluded.total_bet,
                  total_win = excluded.total_win,
                  reel_spins = excluded.reel_spins,
                  social_spins = excluded.social_spins,
                  total_spins = excluded.total_spins,
                  rtp = excluded.rtp,
                  ggr_eur = excluded.ggr_eur,
                  ggr_gbp = excluded.ggr_gbp
                "#
            ))?;
            for summary in summaries {
                written += execute_summary(&mut stmt, summary)?;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    /// Inserts new summaries all-or-nothing. An existing date aborts the
    /// batch with `DuplicateSummary` and nothing is committed.
    pub fn insert_summaries(&mut self, summaries: &[DailySummary]) -> Result<usize> {
        if summaries.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut written = 0usize;
        {
            let mut stmt = tx.prepare(INSERT_SUMMARY)?;
            for summary in summaries {
                match execute_summary(&mut stmt, summary) {
                    Ok(rows) => written += rows,
                    Err(rusqlite::Error::SqliteFailure(err, _))
                        if err.code == ErrorCode::ConstraintViolation =>
                    {
                        return Err(DbError::DuplicateSummary(summary.date));
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
        tx.commit()?;
        Ok(written)
    }

    pub fn summary_dates(&self) -> Result<BTreeSet<NaiveDate>> {
        let mut stmt = self.conn.prepare("SELECT date FROM daily_summary")?;
        let rows = stmt.query_map([], |row| row.get::<_, NaiveDate>(0))?;
        Ok(rows.collect::<std::result::Result<BTreeSet<_>, _>>()?)
    }

    pub fn list_summaries(&self) -> Result<Vec<DailySummary>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM daily_summary
            ORDER BY date ASC
            "#
        ))?;
        let rows = stmt.query_map([], row_to_summary)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn get_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>> {
        self.conn
            .query_row(
                &format!(
                    r#"
                    SELECT {SUMMARY_COLUMNS}
                    FROM daily_summary
                    WHERE date = ?1
                    "#
                ),
                params![date],
                row_to_summary,
            )
            .optional()
            .map_err(DbError::from)
    }
}

fn execute_summary(
    stmt: &mut rusqlite::Statement<'_>,
    summary: &DailySummary,
) -> std::result::Result<usize, rusqlite::Error> {
    stmt.execute(params![
        summary.date,
        decimal_text(summary.total_bet),
        decimal_text(summary.total_win),
        summary.reel_spins,
        summary.social_spins,
        summary.total_spins,
        decimal_text(summary.rtp),
        decimal_text(summary.ggr_eur),
        decimal_text(summary.ggr_gbp),
    ])
}
