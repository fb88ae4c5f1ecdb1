use std::sync::Arc;

use chrono::NaiveDate;
use ggr_core::{Anchors, BTC, CurrencyConfig, RateMap, USD};
use ggr_db::Db;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{RateError, Result};
use crate::source::RateSource;

/// Resolves the EUR rate map for a date, caching fiat rates in the store and
/// re-deriving the social currency table on every call.
#[derive(Clone)]
pub struct RateResolver {
    source: Arc<dyn RateSource>,
    currency: Arc<CurrencyConfig>,
}

impl RateResolver {
    pub fn new(source: Arc<dyn RateSource>, currency: Arc<CurrencyConfig>) -> Self {
        Self { source, currency }
    }

    pub fn currency(&self) -> &CurrencyConfig {
        &self.currency
    }

    pub fn resolve(&self, db: &mut Db, date: NaiveDate) -> Result<RateMap> {
        let mut rates = self.fiat_rates(db, date)?;
        let anchors = Anchors {
            usd: anchor(&rates, USD, date)?,
            btc: anchor(&rates, BTC, date)?,
        };
        let social = self.currency.derive_social_rates(date, &anchors);
        db.upsert_rates(date, &social)?;
        debug!(%date, count = social.len(), "social rates refreshed");
        rates.extend(social);
        Ok(rates)
    }

    /// Stored rates for the date when present, otherwise fetched, inverted
    /// and stored in one transaction.
    fn fiat_rates(&self, db: &mut Db, date: NaiveDate) -> Result<RateMap> {
        let cached = db.rates_for_date(date)?;
        if !cached.is_empty() {
            debug!(%date, count = cached.len(), "rates cache hit");
            return Ok(cached);
        }
        let quotes = self.source.fetch(date)?;
        let rates = invert_quotes(&quotes);
        let inserted = db.insert_rates(date, &rates)?;
        info!(%date, fetched = rates.len(), inserted, "fetched exchange rates");
        Ok(rates)
    }
}

/// Provider quotes are currency per EUR; stored rates are EUR per currency.
/// Non-positive quotes become a zero rate.
pub(crate) fn invert_quotes(quotes: &RateMap) -> RateMap {
    quotes
        .iter()
        .map(|(code, quote)| {
            let rate = if *quote > Decimal::ZERO {
                Decimal::ONE.checked_div(*quote).unwrap_or(Decimal::ZERO)
            } else {
                Decimal::ZERO
            };
            (code.clone(), rate)
        })
        .collect()
}

fn anchor(rates: &RateMap, currency: &'static str, date: NaiveDate) -> Result<Decimal> {
    rates
        .get(currency)
        .copied()
        .ok_or(RateError::MissingAnchor { currency, date })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn inverts_positive_quotes() {
        let quotes = RateMap::from([
            ("GBP".to_string(), dec!(0.8)),
            ("EUR".to_string(), dec!(1)),
        ]);
        let rates = invert_quotes(&quotes);
        assert_eq!(rates.get("GBP"), Some(&dec!(1.25)));
        assert_eq!(rates.get("EUR"), Some(&dec!(1)));
    }

    #[test]
    fn zero_and_negative_quotes_become_zero() {
        let quotes = RateMap::from([
            ("XAA".to_string(), Decimal::ZERO),
            ("XBB".to_string(), dec!(-2)),
        ]);
        let rates = invert_quotes(&quotes);
        assert_eq!(rates.get("XAA"), Some(&Decimal::ZERO));
        assert_eq!(rates.get("XBB"), Some(&Decimal::ZERO));
    }

    #[test]
    fn missing_anchor_names_currency() {
        let rates = RateMap::from([("USD".to_string(), dec!(0.9))]);
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(anchor(&rates, USD, date).unwrap(), dec!(0.9));
        match anchor(&rates, BTC, date) {
            Err(RateError::MissingAnchor { currency, .. }) => assert_eq!(currency, "BTC"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
