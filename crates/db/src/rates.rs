use std::collections::BTreeMap;

use chrono::NaiveDate;
use ggr_core::{GBP, RateMap};
use rusqlite::{OptionalExtension, params};
use rust_decimal::Decimal;

use crate::Db;
use crate::error::Result;
use crate::helpers::{decimal_at, decimal_text};

impl Db {
    pub fn rates_for_date(&self, date: NaiveDate) -> Result<RateMap> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT currency, rate
            FROM exchange_rate
            WHERE date_fetched = ?1
            ORDER BY currency ASC
            "#,
        )?;
        let rows = stmt.query_map(params![date], |row| {
            Ok((row.get::<_, String>(0)?, decimal_at(row, 1)?))
        })?;
        Ok(rows.collect::<std::result::Result<RateMap, _>>()?)
    }

    pub fn rate_for(&self, currency: &str, date: NaiveDate) -> Result<Option<Decimal>> {
        self.conn
            .query_row(
                r#"
                SELECT rate
                FROM exchange_rate
                WHERE currency = ?1 AND date_fetched = ?2
                "#,
                params![currency, date],
                |row| decimal_at(row, 0),
            )
            .optional()
            .map_err(crate::error::DbError::from)
    }

    /// Usable GBP rates keyed by date; zero rates are left out.
    pub fn gbp_rates(&self) -> Result<BTreeMap<NaiveDate, Decimal>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT date_fetched, rate
            FROM exchange_rate
            WHERE currency = ?1
            "#,
        )?;
        let rows = stmt
            .query_map(params![GBP], |row| {
                Ok((row.get::<_, NaiveDate>(0)?, decimal_at(row, 1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows
            .into_iter()
            .filter(|(_, rate)| *rate > Decimal::ZERO)
            .collect())
    }

    /// Stores fetched fiat rates for one date in a single transaction.
    /// Pairs already present are kept, so a concurrent resolver for the same
    /// date cannot fail the batch.
    pub fn insert_rates(&mut self, date: NaiveDate, rates: &RateMap) -> Result<usize> {
        if rates.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR IGNORE INTO exchange_rate (currency, rate, date_fetched)
                VALUES (?1, ?2, ?3)
                "#,
            )?;
            for (currency, rate) in rates {
                let rows = stmt.execute(params![currency, decimal_text(*rate), date])?;
                if rows > 0 {
                    inserted += 1;
                }
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Inserts or overwrites rates for one date in a single transaction.
    pub fn upsert_rates(&mut self, date: NaiveDate, rates: &RateMap) -> Result<usize> {
        if rates.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut written = 0usize;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO exchange_rate (currency, rate, date_fetched)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(currency, date_fetched) DO UPDATE SET
                  rate = excluded.rate
                "#,
            )?;
            for (currency, rate) in rates {
                written += stmt.execute(params![currency, decimal_text(*rate), date])?;
            }
        }
        tx.commit()?;
        Ok(written)
    }
}
