use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::RateMap;

/// GHC moves from a fixed EUR value to a USD peg on this date.
pub const GHC_USD_CUTOVER: NaiveDate = match NaiveDate::from_ymd_opt(2025, 1, 29) {
    Some(date) => date,
    None => panic!("invalid cutover date"),
};

const SOCIAL_CURRENCY_CODES: &[&str] = &[
    "SSC", "WOC", "SC", "SC.", "YOH", "GEM", "BK.", "GHC", "GOC", "VBC", "GCC", "GLD", "GC",
    "GC.", "TOK", "FTN", "USDT", "BT.", "mBTC", "FC", "VSC", "WOW", "FC.",
];

/// Previously resolved fiat rates used as pivots for social currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchors {
    pub usd: Decimal,
    pub btc: Decimal,
}

/// How a platform-internal currency gets its EUR rate for a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SocialRateRule {
    /// `units` USD per coin, converted through the USD anchor.
    UsdPegged { units: Decimal },
    /// Already EUR-denominated, stored as-is.
    FixedEur { rate: Decimal },
    /// A fraction of one BTC, converted through the BTC anchor.
    BtcFraction { fraction: Decimal },
    /// Divides by the USD anchor instead of multiplying.
    UsdInverse { units: Decimal },
    /// `before` applies strictly before `date`, `from` on and after it.
    Cutover {
        date: NaiveDate,
        before: Box<SocialRateRule>,
        from: Box<SocialRateRule>,
    },
}

impl SocialRateRule {
    pub fn rate_on(&self, date: NaiveDate, anchors: &Anchors) -> Decimal {
        match self {
            Self::UsdPegged { units } => {
                if *units > Decimal::ZERO {
                    *units * anchors.usd
                } else {
                    Decimal::ZERO
                }
            }
            Self::FixedEur { rate } => *rate,
            Self::BtcFraction { fraction } => *fraction * anchors.btc,
            Self::UsdInverse { units } => units.checked_div(anchors.usd).unwrap_or(Decimal::ZERO),
            Self::Cutover {
                date: cutover,
                before,
                from,
            } => {
                if date < *cutover {
                    before.rate_on(date, anchors)
                } else {
                    from.rate_on(date, anchors)
                }
            }
        }
    }
}

/// Remaps a currency code for one site before rate lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyOverride {
    pub currency: String,
    pub site_name: String,
    pub mapped: String,
}

/// Decides whether an extract row belongs to an internal account and must be dropped.
pub trait ExclusionPolicy: Send + Sync {
    fn is_excluded(&self, site_name: &str, username: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseAccountFilter {
    pub site_names: BTreeSet<String>,
    pub username_suffix: String,
}

impl Default for HouseAccountFilter {
    fn default() -> Self {
        Self {
            site_names: ["ownlobby", "Netgaming( Internal )"]
                .into_iter()
                .map(String::from)
                .collect(),
            username_suffix: "_OWN".to_string(),
        }
    }
}

impl ExclusionPolicy for HouseAccountFilter {
    fn is_excluded(&self, site_name: &str, username: &str) -> bool {
        if self.site_names.contains(site_name.trim()) {
            return true;
        }
        !self.username_suffix.is_empty()
            && username
                .to_uppercase()
                .ends_with(&self.username_suffix.to_uppercase())
    }
}

/// Currency classification and synthetic rate rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    pub social_currency_codes: BTreeSet<String>,
    pub social_rate_rules: BTreeMap<String, SocialRateRule>,
    pub promo_override: Option<CurrencyOverride>,
    pub house_accounts: HouseAccountFilter,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            social_currency_codes: SOCIAL_CURRENCY_CODES
                .iter()
                .map(|code| code.to_string())
                .collect(),
            social_rate_rules: default_social_rate_rules(),
            promo_override: Some(CurrencyOverride {
                currency: "FC".to_string(),
                site_name: "Fortune Coins".to_string(),
                mapped: "FC.".to_string(),
            }),
            house_accounts: HouseAccountFilter::default(),
        }
    }
}

impl CurrencyConfig {
    pub fn is_social(&self, currency: &str) -> bool {
        self.social_currency_codes.contains(currency)
    }

    /// Currency code used for rate lookup and storage.
    pub fn effective_currency(&self, currency: &str, site_name: &str) -> String {
        if let Some(rule) = &self.promo_override
            && currency == rule.currency
            && site_name.trim() == rule.site_name
        {
            return rule.mapped.clone();
        }
        currency.to_string()
    }

    pub fn derive_social_rates(&self, date: NaiveDate, anchors: &Anchors) -> RateMap {
        self.social_rate_rules
            .iter()
            .map(|(code, rule)| (code.clone(), rule.rate_on(date, anchors)))
            .collect()
    }
}

fn default_social_rate_rules() -> BTreeMap<String, SocialRateRule> {
    let usd = |units: Decimal| SocialRateRule::UsdPegged { units };
    let eur = |rate: Decimal| SocialRateRule::FixedEur { rate };
    let mut rules = BTreeMap::new();
    for code in ["SSC", "WOC", "SC", "SC.", "YOH", "GEM", "BK.", "FC", "VSC"] {
        rules.insert(code.to_string(), usd(Decimal::ONE));
    }
    for code in ["GOC", "TOK"] {
        rules.insert(code.to_string(), usd(Decimal::ZERO));
    }
    for code in ["VBC", "GCC", "GLD", "GC", "GC.", "BT.", "WOW"] {
        rules.insert(code.to_string(), eur(dec!(0.0000000001)));
    }
    rules.insert("FTN".to_string(), eur(Decimal::ONE));
    rules.insert("FC.".to_string(), usd(dec!(0.01)));
    rules.insert(
        "mBTC".to_string(),
        SocialRateRule::BtcFraction {
            fraction: dec!(0.001),
        },
    );
    rules.insert(
        "USDT".to_string(),
        SocialRateRule::UsdInverse {
            units: Decimal::ONE,
        },
    );
    rules.insert(
        "GHC".to_string(),
        SocialRateRule::Cutover {
            date: GHC_USD_CUTOVER,
            before: Box::new(eur(dec!(0.001818))),
            from: Box::new(usd(Decimal::ONE)),
        },
    );
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchors() -> Anchors {
        Anchors {
            usd: dec!(0.9),
            btc: dec!(60000),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_table_covers_every_social_code() {
        let config = CurrencyConfig::default();
        assert_eq!(config.social_currency_codes.len(), 23);
        for code in &config.social_currency_codes {
            assert!(
                config.social_rate_rules.contains_key(code),
                "missing rule for {code}"
            );
        }
    }

    #[test]
    fn usd_pegged_and_inverse_are_asymmetric() {
        let config = CurrencyConfig::default();
        let rates = config.derive_social_rates(day(2024, 6, 1), &anchors());
        assert_eq!(rates["SC"], dec!(0.9));
        assert_eq!(rates["FC."], dec!(0.009));
        assert_eq!(rates["USDT"], Decimal::ONE / dec!(0.9));
        assert_eq!(rates["GOC"], Decimal::ZERO);
    }

    #[test]
    fn fixed_eur_and_btc_fraction() {
        let config = CurrencyConfig::default();
        let rates = config.derive_social_rates(day(2024, 6, 1), &anchors());
        assert_eq!(rates["GC"], dec!(0.0000000001));
        assert_eq!(rates["FTN"], Decimal::ONE);
        assert_eq!(rates["mBTC"], dec!(60.000));
    }

    #[test]
    fn ghc_switches_to_usd_peg_on_cutover() {
        let config = CurrencyConfig::default();
        let before = config.derive_social_rates(day(2025, 1, 28), &anchors());
        let on = config.derive_social_rates(GHC_USD_CUTOVER, &anchors());
        assert_eq!(before["GHC"], dec!(0.001818));
        assert_eq!(on["GHC"], dec!(0.9));
    }

    #[test]
    fn promo_override_only_applies_to_its_site() {
        let config = CurrencyConfig::default();
        assert_eq!(config.effective_currency("FC", " Fortune Coins "), "FC.");
        assert_eq!(config.effective_currency("FC", "Other Site"), "FC");
        assert_eq!(config.effective_currency("SC", "Fortune Coins"), "SC");
    }

    #[test]
    fn house_accounts_are_excluded() {
        let filter = HouseAccountFilter::default();
        assert!(filter.is_excluded("ownlobby", "anyone"));
        assert!(filter.is_excluded(" Netgaming( Internal ) ", "anyone"));
        assert!(filter.is_excluded("SiteA", "tester_own"));
        assert!(!filter.is_excluded("SiteA", "owner"));
    }
}
