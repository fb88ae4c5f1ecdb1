use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{ConsolidatedRecord, CumulativeMetrics, CurrencyConfig, DailySummary, PlayerBand};

pub const MONEY_DP: u32 = 3;
pub const RTP_DP: u32 = 3;
pub const PLAYER_RTP_DP: u32 = 2;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp(MONEY_DP)
}

pub fn round_rtp(value: Decimal) -> Decimal {
    value.round_dp(RTP_DP)
}

/// Return to player in percent; zero when nothing was bet.
pub fn rtp(total_bet: Decimal, total_win: Decimal) -> Decimal {
    if total_bet <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    total_win
        .checked_div(total_bet)
        .map(|ratio| ratio * HUNDRED)
        .unwrap_or(Decimal::ZERO)
}

/// GGR converted with the date's GBP rate; `None` when the rate is unusable.
pub fn ggr_gbp(ggr_eur: Decimal, gbp_rate: Decimal) -> Option<Decimal> {
    if gbp_rate <= Decimal::ZERO {
        return None;
    }
    ggr_eur.checked_div(gbp_rate)
}

/// Running sums for one date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayTotals {
    pub total_bet: Decimal,
    pub total_win: Decimal,
    pub reel_spins: i64,
    pub social_spins: i64,
}

impl DayTotals {
    pub fn add(&mut self, record: &ConsolidatedRecord, config: &CurrencyConfig) {
        self.total_bet += record.bet_eur;
        self.total_win += record.win_eur;
        if config.is_social(&record.currency) {
            self.social_spins += record.number_of_spins;
        } else {
            self.reel_spins += record.number_of_spins;
        }
    }

    pub fn total_spins(&self) -> i64 {
        self.social_spins + self.reel_spins
    }

    pub fn ggr_eur(&self) -> Decimal {
        self.total_bet - self.total_win
    }

    /// Rounded summary row. Returns `None` when the GBP rate is unusable.
    pub fn into_summary(self, date: NaiveDate, gbp_rate: Decimal) -> Option<DailySummary> {
        let ggr_eur = self.ggr_eur();
        let ggr_gbp = ggr_gbp(ggr_eur, gbp_rate)?;
        Some(DailySummary {
            date,
            total_bet: round_money(self.total_bet),
            total_win: round_money(self.total_win),
            reel_spins: self.reel_spins,
            social_spins: self.social_spins,
            total_spins: self.total_spins(),
            rtp: round_rtp(rtp(self.total_bet, self.total_win)),
            ggr_eur: round_money(ggr_eur),
            ggr_gbp: round_money(ggr_gbp),
        })
    }
}

/// Per-date aggregation output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRollup {
    pub summaries: Vec<DailySummary>,
    /// Dates with qualifying records but no usable GBP rate.
    pub skipped_dates: Vec<NaiveDate>,
}

/// Groups qualifying records by date and computes one summary per date.
pub fn summarize_by_date(
    records: &[ConsolidatedRecord],
    gbp_rates: &BTreeMap<NaiveDate, Decimal>,
    config: &CurrencyConfig,
) -> DateRollup {
    let mut by_date: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for record in records.iter().filter(|record| record.qualifies()) {
        by_date
            .entry(record.date)
            .or_default()
            .add(record, config);
    }
    let mut rollup = DateRollup::default();
    for (date, totals) in by_date {
        let summary = gbp_rates
            .get(&date)
            .and_then(|rate| totals.into_summary(date, *rate));
        match summary {
            Some(summary) => rollup.summaries.push(summary),
            None => rollup.skipped_dates.push(date),
        }
    }
    rollup
}

/// Totals for a single date; `None` when no record qualifies.
pub fn summarize_day(
    date: NaiveDate,
    records: &[ConsolidatedRecord],
    config: &CurrencyConfig,
) -> Option<DayTotals> {
    let mut totals = DayTotals::default();
    let mut seen = false;
    for record in records
        .iter()
        .filter(|record| record.date == date && record.qualifies())
    {
        totals.add(record, config);
        seen = true;
    }
    seen.then_some(totals)
}

/// One pass over every qualifying record. Records whose date lacks a GBP
/// rate are skipped and their dates returned alongside the metrics.
pub fn cumulative_from_records(
    records: &[ConsolidatedRecord],
    gbp_rates: &BTreeMap<NaiveDate, Decimal>,
    config: &CurrencyConfig,
) -> (CumulativeMetrics, Vec<NaiveDate>) {
    let mut totals = DayTotals::default();
    let mut ggr_eur = Decimal::ZERO;
    let mut ggr_gbp_sum = Decimal::ZERO;
    let mut players: BTreeSet<&str> = BTreeSet::new();
    let mut skipped: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut min_date: Option<NaiveDate> = None;
    let mut max_date: Option<NaiveDate> = None;
    for record in records.iter().filter(|record| record.qualifies()) {
        let Some(record_gbp) = gbp_rates
            .get(&record.date)
            .and_then(|rate| ggr_gbp(record.bet_eur - record.win_eur, *rate))
        else {
            skipped.insert(record.date);
            continue;
        };
        totals.add(record, config);
        ggr_eur += record.bet_eur - record.win_eur;
        ggr_gbp_sum += record_gbp;
        players.insert(record.account_id.as_str());
        min_date = Some(min_date.map_or(record.date, |date| date.min(record.date)));
        max_date = Some(max_date.map_or(record.date, |date| date.max(record.date)));
    }
    let metrics = CumulativeMetrics {
        total_bet: round_money(totals.total_bet),
        total_win: round_money(totals.total_win),
        total_spins: totals.total_spins(),
        reel_spins: totals.reel_spins,
        social_spins: totals.social_spins,
        rtp: round_rtp(rtp(totals.total_bet, totals.total_win)),
        ggr_eur: round_money(ggr_eur),
        ggr_gbp: round_money(ggr_gbp_sum),
        total_players: players.len() as u64,
        min_date,
        max_date,
    };
    (metrics, skipped.into_iter().collect())
}

/// Sums persisted summary rows. RTP is taken from the rounded totals;
/// `total_players` and the date bounds are left to the caller.
pub fn cumulative_from_summaries(summaries: &[DailySummary]) -> CumulativeMetrics {
    let mut metrics = CumulativeMetrics::default();
    for summary in summaries {
        metrics.total_bet += summary.total_bet;
        metrics.total_win += summary.total_win;
        metrics.total_spins += summary.total_spins;
        metrics.reel_spins += summary.reel_spins;
        metrics.social_spins += summary.social_spins;
        metrics.ggr_eur += summary.ggr_eur;
        metrics.ggr_gbp += summary.ggr_gbp;
    }
    metrics.total_bet = round_money(metrics.total_bet);
    metrics.total_win = round_money(metrics.total_win);
    metrics.ggr_eur = round_money(metrics.ggr_eur);
    metrics.ggr_gbp = round_money(metrics.ggr_gbp);
    metrics.rtp = round_rtp(rtp(metrics.total_bet, metrics.total_win));
    metrics
}

const SPIN_BANDS: &[(i64, &str)] = &[
    (9, "<10"),
    (50, "10-50"),
    (100, "50-100"),
    (200, "100-200"),
    (500, "200-500"),
    (1_000, "500-1000"),
    (5_000, "1000-5000"),
    (10_000, "5000-10000"),
    (20_000, "10000-20000"),
    (50_000, "20000-50000"),
];
const OPEN_BAND: &str = ">50000";

fn band_index(spins: i64) -> usize {
    SPIN_BANDS
        .iter()
        .position(|(upper, _)| spins <= *upper)
        .unwrap_or(SPIN_BANDS.len())
}

fn band_label(index: usize) -> &'static str {
    SPIN_BANDS
        .get(index)
        .map(|(_, label)| *label)
        .unwrap_or(OPEN_BAND)
}

/// Buckets accounts by their total qualifying spins. Only populated bands
/// are returned, in ascending band order.
pub fn player_bands(records: &[ConsolidatedRecord]) -> Vec<PlayerBand> {
    let mut per_account: HashMap<&str, (i64, Decimal, Decimal)> = HashMap::new();
    for record in records.iter().filter(|record| record.qualifies()) {
        let entry = per_account
            .entry(record.account_id.as_str())
            .or_insert((0, Decimal::ZERO, Decimal::ZERO));
        entry.0 += record.number_of_spins;
        entry.1 += record.bet_eur;
        entry.2 += record.win_eur;
    }
    let mut bands: BTreeMap<usize, PlayerBand> = BTreeMap::new();
    for (spins, bet, win) in per_account.into_values() {
        let index = band_index(spins);
        let band = bands.entry(index).or_insert_with(|| PlayerBand {
            spins_range: band_label(index).to_string(),
            player_count: 0,
            total_spins: 0,
            total_bet: Decimal::ZERO,
            total_win: Decimal::ZERO,
            rtp: None,
        });
        band.player_count += 1;
        band.total_spins += spins;
        band.total_bet += bet;
        band.total_win += win;
    }
    bands
        .into_values()
        .map(|mut band| {
            if band.total_bet > Decimal::ZERO {
                band.rtp = Some(rtp(band.total_bet, band.total_win).round_dp(PLAYER_RTP_DP));
            }
            band
        })
        .collect()
}
