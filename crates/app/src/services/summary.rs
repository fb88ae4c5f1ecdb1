use std::collections::BTreeMap;

use chrono::NaiveDate;
use ggr_core::{
    CumulativeMetrics, DailySummary, GBP, LatestMetrics, SummaryOverview, SummaryScope,
    cumulative_from_records, cumulative_from_summaries, round_rtp, rtp, summarize_by_date,
    summarize_day,
};
use ggr_db::Db;
use rates::RateResolver;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SummaryTarget;
use crate::error::{AppError, Result};
use crate::services::rates::resolved_gbp_rate;
use crate::services::{SharedConfig, open_db};
use crate::util::dates::date_span;

/// Dates backfilled by one gap fill run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GapFillReport {
    pub filled: Vec<NaiveDate>,
}

#[derive(Clone)]
pub struct SummaryService {
    config: SharedConfig,
    resolver: RateResolver,
}

impl SummaryService {
    pub(super) fn new(config: SharedConfig, resolver: RateResolver) -> Self {
        Self { config, resolver }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// Recomputes and upserts per-date summaries for the scope using the
    /// stored GBP rates. Dates without a usable GBP rate are skipped.
    pub fn summarize(&self, scope: SummaryScope) -> Result<Vec<DailySummary>> {
        let mut db = self.db()?;
        let gbp_rates = db.gbp_rates()?;
        summarize_into(&mut db, scope, &gbp_rates, &self.config.currency)
    }

    pub fn get_summary(&self, target: SummaryTarget) -> Result<Vec<DailySummary>> {
        let mut db = self.db()?;
        let date = match target {
            SummaryTarget::All => {
                let gbp_rates = db.gbp_rates()?;
                let summaries =
                    summarize_into(&mut db, SummaryScope::All, &gbp_rates, &self.config.currency)?;
                if summaries.is_empty() {
                    return Err(AppError::NotFound("no summary data available".to_string()));
                }
                return Ok(summaries);
            }
            SummaryTarget::Latest => db
                .latest_qualifying_date()?
                .ok_or_else(|| AppError::NotFound("no qualifying records stored".to_string()))?,
            SummaryTarget::Date(date) => date,
        };
        if db.qualifying_records(SummaryScope::Date(date))?.is_empty() {
            return Err(AppError::NotFound(format!("no data available for {date}")));
        }
        let gbp = resolved_gbp_rate(&mut db, &self.resolver, date)?;
        let gbp_rates = BTreeMap::from([(date, gbp)]);
        summarize_into(
            &mut db,
            SummaryScope::Date(date),
            &gbp_rates,
            &self.config.currency,
        )
    }

    /// One pass over every qualifying record, with distinct player count.
    pub fn cumulative_metrics(&self) -> Result<CumulativeMetrics> {
        let db = self.db()?;
        let records = db.qualifying_records(SummaryScope::All)?;
        if records.is_empty() {
            return Err(AppError::NotFound("no qualifying records stored".to_string()));
        }
        let gbp_rates = db.gbp_rates()?;
        let (metrics, skipped) =
            cumulative_from_records(&records, &gbp_rates, &self.config.currency);
        for date in skipped {
            warn!(%date, "no GBP rate for date, records skipped");
        }
        Ok(metrics)
    }

    /// Inserts a summary for every date between the oldest and newest record
    /// that has none yet. All-or-nothing: a date without qualifying records
    /// or without a GBP rate aborts the run before anything is written.
    pub fn fill_gaps(&self) -> Result<GapFillReport> {
        let mut db = self.db()?;
        let Some((min_date, max_date)) = db.record_date_bounds()? else {
            return Ok(GapFillReport::default());
        };
        let existing = db.summary_dates()?;
        let mut pending = Vec::new();
        for date in date_span(min_date, max_date).filter(|date| !existing.contains(date)) {
            let records = db.qualifying_records(SummaryScope::Date(date))?;
            let totals = summarize_day(date, &records, &self.config.currency).ok_or_else(|| {
                AppError::GapFill(format!("no qualifying records for missing date {date}"))
            })?;
            let gbp = db
                .rate_for(GBP, date)?
                .filter(|rate| *rate > Decimal::ZERO)
                .ok_or_else(|| AppError::GapFill(format!("no GBP rate for missing date {date}")))?;
            let summary = totals
                .into_summary(date, gbp)
                .ok_or_else(|| AppError::GapFill(format!("unusable GBP rate for {date}")))?;
            debug!(%date, "gap summary computed");
            pending.push(summary);
        }
        if pending.is_empty() {
            debug!(%min_date, %max_date, "no missing summary dates");
            return Ok(GapFillReport::default());
        }
        db.insert_summaries(&pending)?;
        let filled: Vec<NaiveDate> = pending.iter().map(|summary| summary.date).collect();
        info!(count = filled.len(), "filled missing summary dates");
        Ok(GapFillReport { filled })
    }

    /// Gap fill, then cumulative totals over stored summaries and the
    /// summary for the newest record date. A failed gap fill is logged and
    /// the read continues over what is stored.
    pub fn overview(&self) -> Result<SummaryOverview> {
        if let Err(err) = self.fill_gaps() {
            warn!(error = %err, "gap fill failed, continuing with stored summaries");
        }
        let db = self.db()?;
        let summaries = db.list_summaries()?;
        if summaries.is_empty() {
            return Err(AppError::NotFound("no summary data available".to_string()));
        }
        let (min_date, max_date) = db
            .record_date_bounds()?
            .ok_or_else(|| AppError::NotFound("no records stored".to_string()))?;

        let mut cumulative = cumulative_from_summaries(&summaries);
        cumulative.total_players = db.distinct_players(None)?;
        cumulative.min_date = Some(min_date);
        cumulative.max_date = Some(max_date);

        let latest = summaries
            .iter()
            .find(|summary| summary.date == max_date)
            .ok_or_else(|| AppError::NotFound(format!("no summary for latest date {max_date}")))?;
        let latest = LatestMetrics {
            date: latest.date,
            total_bet: latest.total_bet,
            total_win: latest.total_win,
            total_spins: latest.total_spins,
            reel_spins: latest.reel_spins,
            social_spins: latest.social_spins,
            rtp: round_rtp(rtp(latest.total_bet, latest.total_win)),
            ggr_eur: latest.ggr_eur,
            ggr_gbp: latest.ggr_gbp,
            total_players: db.distinct_players(Some(max_date))?,
        };
        Ok(SummaryOverview { cumulative, latest })
    }
}

fn summarize_into(
    db: &mut Db,
    scope: SummaryScope,
    gbp_rates: &BTreeMap<NaiveDate, Decimal>,
    currency: &ggr_core::CurrencyConfig,
) -> Result<Vec<DailySummary>> {
    let records = db.qualifying_records(scope)?;
    let rollup = summarize_by_date(&records, gbp_rates, currency);
    for date in &rollup.skipped_dates {
        warn!(%date, "no GBP rate for date, summary skipped");
    }
    if rollup.summaries.is_empty() {
        return Ok(Vec::new());
    }
    db.upsert_summaries(&rollup.summaries)?;
    info!(
        dates = rollup.summaries.len(),
        skipped = rollup.skipped_dates.len(),
        "summaries upserted"
    );
    Ok(rollup.summaries)
}
