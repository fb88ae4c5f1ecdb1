use chrono::NaiveDate;
use ggr_core::{GBP, RateMap};
use ggr_db::Db;
use rates::RateResolver;
use rust_decimal::Decimal;

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db};

#[derive(Clone)]
pub struct RatesService {
    config: SharedConfig,
    resolver: RateResolver,
}

impl RatesService {
    pub(super) fn new(config: SharedConfig, resolver: RateResolver) -> Self {
        Self { config, resolver }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn resolve(&self, date: NaiveDate) -> Result<RateMap> {
        let mut db = self.db()?;
        Ok(self.resolver.resolve(&mut db, date)?)
    }
}

/// GBP rate for a date, resolving the date's rates when none is stored.
pub(super) fn resolved_gbp_rate(
    db: &mut Db,
    resolver: &RateResolver,
    date: NaiveDate,
) -> Result<Decimal> {
    if let Some(rate) = db.rate_for(GBP, date)?
        && rate > Decimal::ZERO
    {
        return Ok(rate);
    }
    let rates = resolver.resolve(db, date)?;
    rates
        .get(GBP)
        .copied()
        .filter(|rate| *rate > Decimal::ZERO)
        .ok_or_else(|| AppError::NotFound(format!("no GBP rate for {date}")))
}
