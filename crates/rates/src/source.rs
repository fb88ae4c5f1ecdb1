use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use ggr_core::{BASE_CURRENCY, RateMap, format_date};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RateError, Result};

/// External provider of market quotes against EUR.
///
/// A quote is units of currency per 1 EUR, exactly as the provider reports
/// it. Inverting into stored rates is the resolver's job.
pub trait RateSource: Send + Sync {
    fn fetch(&self, date: NaiveDate) -> Result<RateMap>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixerSettings {
    pub base_url: String,
    pub access_key: String,
    pub timeout_secs: u64,
}

impl Default for FixerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://data.fixer.io/api".to_string(),
            access_key: String::new(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FixerResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    rates: BTreeMap<String, Decimal>,
    #[serde(default)]
    error: Option<FixerErrorBody>,
}

#[derive(Debug, Deserialize)]
struct FixerErrorBody {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    info: Option<String>,
}

impl FixerErrorBody {
    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(code) = self.code {
            parts.push(code.to_string());
        }
        if let Some(kind) = &self.kind {
            parts.push(kind.clone());
        }
        if let Some(info) = &self.info {
            parts.push(info.clone());
        }
        parts.join(": ")
    }
}

/// Blocking client for a fixer-style historical rates endpoint.
pub struct FixerClient {
    client: reqwest::blocking::Client,
    settings: FixerSettings,
}

impl FixerClient {
    pub fn new(settings: FixerSettings) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()?;
        Ok(Self { client, settings })
    }

    fn url_for(&self, date: NaiveDate) -> String {
        format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            format_date(date)
        )
    }
}

impl RateSource for FixerClient {
    fn fetch(&self, date: NaiveDate) -> Result<RateMap> {
        let url = self.url_for(date);
        debug!(%url, "requesting historical rates");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("access_key", self.settings.access_key.as_str()),
                ("base", BASE_CURRENCY),
            ])
            .send()?
            .error_for_status()?;
        let body: FixerResponse = response.json()?;
        parse_response(date, body)
    }
}

fn parse_response(date: NaiveDate, body: FixerResponse) -> Result<RateMap> {
    if !body.success {
        let detail = body
            .error
            .as_ref()
            .map(FixerErrorBody::describe)
            .filter(|detail| !detail.is_empty())
            .unwrap_or_else(|| "success flag missing".to_string());
        return Err(RateError::Unsuccessful { date, detail });
    }
    if body.rates.is_empty() {
        return Err(RateError::NoQuotes(date));
    }
    Ok(body.rates)
}

/// In-memory source keyed by date. Dates without quotes answer like an
/// unsuccessful provider response.
#[derive(Debug, Default)]
pub struct StaticRateSource {
    quotes: BTreeMap<NaiveDate, RateMap>,
    calls: AtomicUsize,
}

impl StaticRateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quotes(mut self, date: NaiveDate, quotes: RateMap) -> Self {
        self.quotes.insert(date, quotes);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RateSource for StaticRateSource {
    fn fetch(&self, date: NaiveDate) -> Result<RateMap> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.quotes
            .get(&date)
            .cloned()
            .ok_or_else(|| RateError::Unsuccessful {
                date,
                detail: "no quotes configured".to_string(),
            })
    }
}
