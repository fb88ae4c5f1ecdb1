use ggr_core::{ConsolidatedRecord, CurrencyConfig, ExclusionPolicy, RateMap, RawRecord};
use ggr_db::Db;
use rust_decimal::Decimal;

use crate::types::Result;

/// Outcome of normalising one extract row.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Record(ConsolidatedRecord),
    /// House-account row; dropped without a trace.
    Excluded,
    /// The (date, username, account_id) key is already stored.
    Duplicate,
}

/// Converts raw extract rows into consolidated records for one batch.
pub struct Normalizer<'a> {
    currency: &'a CurrencyConfig,
    exclusion: &'a dyn ExclusionPolicy,
    rates: &'a RateMap,
}

impl<'a> Normalizer<'a> {
    pub fn new(
        currency: &'a CurrencyConfig,
        exclusion: &'a dyn ExclusionPolicy,
        rates: &'a RateMap,
    ) -> Self {
        Self {
            currency,
            exclusion,
            rates,
        }
    }

    /// Rate for a currency code; zero when unknown.
    pub fn fx_rate_for(&self, currency: &str) -> Decimal {
        self.rates.get(currency).copied().unwrap_or(Decimal::ZERO)
    }

    /// Normalises a row without consulting the store. The promotional remap
    /// applies to both the stored code and the rate lookup.
    pub fn convert(&self, raw: RawRecord) -> Option<ConsolidatedRecord> {
        if self.exclusion.is_excluded(&raw.site_name, &raw.username) {
            return None;
        }
        let currency = self.currency.effective_currency(&raw.currency, &raw.site_name);
        let fx_rate = self.fx_rate_for(&currency);
        Some(ConsolidatedRecord::from_raw(raw, currency, fx_rate))
    }

    pub fn normalize(&self, db: &Db, raw: RawRecord) -> Result<Normalized> {
        let Some(record) = self.convert(raw) else {
            return Ok(Normalized::Excluded);
        };
        if db.record_exists(record.date, &record.username, &record.account_id)? {
            return Ok(Normalized::Duplicate);
        }
        Ok(Normalized::Record(record))
    }
}
