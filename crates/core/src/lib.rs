mod currency;
mod metrics;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use currency::{
    Anchors, CurrencyConfig, CurrencyOverride, ExclusionPolicy, HouseAccountFilter,
    SocialRateRule, GHC_USD_CUTOVER,
};
pub use metrics::{
    DayTotals, DateRollup, MONEY_DP, PLAYER_RTP_DP, RTP_DP, cumulative_from_records,
    cumulative_from_summaries, ggr_gbp, player_bands, round_money, round_rtp, rtp,
    summarize_by_date, summarize_day,
};

/// Currency code to EUR multiplier, i.e. `amount_eur = amount * rate`.
pub type RateMap = BTreeMap<String, Decimal>;

pub const BASE_CURRENCY: &str = "EUR";
pub const GBP: &str = "GBP";
pub const USD: &str = "USD";
pub const BTC: &str = "BTC";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub currency: String,
    pub rate: Decimal,
    pub date_fetched: NaiveDate,
}

/// One parsed extract row before currency normalisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub date: NaiveDate,
    pub username: String,
    pub account_id: String,
    pub game_name: String,
    pub game_id: String,
    pub currency: String,
    pub site_name: String,
    pub bet: Decimal,
    pub win: Decimal,
    pub number_of_spins: i64,
    pub cash_bet: Decimal,
    pub bonus_bet: Decimal,
    pub cash_win: Decimal,
    pub bonus_win: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedRecord {
    pub date: NaiveDate,
    pub username: String,
    pub account_id: String,
    pub game_name: String,
    pub game_id: String,
    pub currency: String,
    pub fx_rate: Decimal,
    pub bet: Decimal,
    pub win: Decimal,
    pub bet_eur: Decimal,
    pub win_eur: Decimal,
    pub number_of_spins: i64,
    pub cash_bet: Decimal,
    pub bonus_bet: Decimal,
    pub cash_win: Decimal,
    pub bonus_win: Decimal,
    pub site_name: String,
}

impl ConsolidatedRecord {
    /// Converts a raw row at `fx_rate`. The EUR amounts are frozen here and
    /// never recomputed when rates change later.
    pub fn from_raw(raw: RawRecord, currency: String, fx_rate: Decimal) -> Self {
        Self {
            bet_eur: raw.bet * fx_rate,
            win_eur: raw.win * fx_rate,
            date: raw.date,
            username: raw.username,
            account_id: raw.account_id,
            game_name: raw.game_name,
            game_id: raw.game_id,
            currency,
            fx_rate,
            bet: raw.bet,
            win: raw.win,
            number_of_spins: raw.number_of_spins,
            cash_bet: raw.cash_bet,
            bonus_bet: raw.bonus_bet,
            cash_win: raw.cash_win,
            bonus_win: raw.bonus_win,
            site_name: raw.site_name,
        }
    }

    /// Zero-rate rows carry an unresolved currency and are left out of every metric.
    pub fn qualifies(&self) -> bool {
        self.fx_rate > Decimal::ZERO
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_bet: Decimal,
    pub total_win: Decimal,
    pub reel_spins: i64,
    pub social_spins: i64,
    pub total_spins: i64,
    pub rtp: Decimal,
    pub ggr_eur: Decimal,
    pub ggr_gbp: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryScope {
    Date(NaiveDate),
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeMetrics {
    pub total_bet: Decimal,
    pub total_win: Decimal,
    pub total_spins: i64,
    pub reel_spins: i64,
    pub social_spins: i64,
    pub rtp: Decimal,
    pub ggr_eur: Decimal,
    pub ggr_gbp: Decimal,
    pub total_players: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestMetrics {
    pub date: NaiveDate,
    pub total_bet: Decimal,
    pub total_win: Decimal,
    pub total_spins: i64,
    pub reel_spins: i64,
    pub social_spins: i64,
    pub rtp: Decimal,
    pub ggr_eur: Decimal,
    pub ggr_gbp: Decimal,
    pub total_players: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOverview {
    pub cumulative: CumulativeMetrics,
    pub latest: LatestMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GgrGroupRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub bet: Decimal,
    pub win: Decimal,
    pub number_of_spins: i64,
    pub ggr_eur: Decimal,
    pub ggr_gbp: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedReport {
    pub date: NaiveDate,
    pub by_site_currency: Vec<GgrGroupRow>,
    pub by_currency: Vec<GgrGroupRow>,
    pub by_site: Vec<GgrGroupRow>,
}

/// Players bucketed by their total qualifying spins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerBand {
    pub spins_range: String,
    pub player_count: u64,
    pub total_spins: i64,
    pub total_bet: Decimal,
    pub total_win: Decimal,
    pub rtp: Option<Decimal>,
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
