use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use ggr_core::{
    ConsolidatedRecord, GgrGroupRow, GroupedReport, PlayerBand, SummaryScope, format_date,
    player_bands, round_money,
};
use ggr_db::Db;
use rates::RateResolver;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::error::{AppError, Result};
use crate::services::rates::resolved_gbp_rate;
use crate::services::{SharedConfig, open_db};

/// CSV files written for one grouped report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportFiles {
    pub by_site_currency: PathBuf,
    pub by_currency: PathBuf,
    pub by_site: PathBuf,
}

#[derive(Clone)]
pub struct ReportsService {
    config: SharedConfig,
    resolver: RateResolver,
}

impl ReportsService {
    pub(super) fn new(config: SharedConfig, resolver: RateResolver) -> Self {
        Self { config, resolver }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// GGR grouped by (site, currency), by currency and by site for one date.
    pub fn grouped_report(&self, date: NaiveDate) -> Result<GroupedReport> {
        let mut db = self.db()?;
        let records = db.qualifying_records(SummaryScope::Date(date))?;
        if records.is_empty() {
            return Err(AppError::NotFound(format!("no data available for {date}")));
        }
        let gbp = resolved_gbp_rate(&mut db, &self.resolver, date)?;
        Ok(group_records(date, &records, gbp))
    }

    /// Writes the three report tables as CSV into `dir`, or the configured
    /// report directory.
    pub fn export_report(&self, report: &GroupedReport, dir: Option<&Path>) -> Result<ReportFiles> {
        let dir = dir.unwrap_or(self.config.report_dir.as_path());
        fs::create_dir_all(dir)?;
        let stamp = format_date(report.date);
        let files = ReportFiles {
            by_site_currency: dir.join(format!("GGR_CUR_OP_{stamp}.csv")),
            by_currency: dir.join(format!("GGR_CUR_{stamp}.csv")),
            by_site: dir.join(format!("GGR_OP_{stamp}.csv")),
        };
        write_group_csv(&files.by_site_currency, &report.by_site_currency, true, true)?;
        write_group_csv(&files.by_currency, &report.by_currency, false, true)?;
        write_group_csv(&files.by_site, &report.by_site, true, false)?;
        info!(date = %stamp, dir = %dir.display(), "report files written");
        Ok(files)
    }

    /// Accounts bucketed by total qualifying spins across all dates.
    pub fn player_distribution(&self) -> Result<Vec<PlayerBand>> {
        let db = self.db()?;
        let records = db.qualifying_records(SummaryScope::All)?;
        if records.is_empty() {
            return Err(AppError::NotFound("no qualifying records stored".to_string()));
        }
        Ok(player_bands(&records))
    }
}

#[derive(Default)]
struct GroupTotals {
    bet: Decimal,
    win: Decimal,
    spins: i64,
}

impl GroupTotals {
    fn add(&mut self, record: &ConsolidatedRecord) {
        self.bet += record.bet_eur;
        self.win += record.win_eur;
        self.spins += record.number_of_spins;
    }

    fn into_row(self, site_name: Option<String>, currency: Option<String>, gbp: Decimal) -> GgrGroupRow {
        let ggr_eur = self.bet - self.win;
        let ggr_gbp = ggr_core::ggr_gbp(ggr_eur, gbp).unwrap_or(Decimal::ZERO);
        GgrGroupRow {
            site_name,
            currency,
            bet: round_money(self.bet),
            win: round_money(self.win),
            number_of_spins: self.spins,
            ggr_eur: round_money(ggr_eur),
            ggr_gbp: round_money(ggr_gbp),
        }
    }
}

pub(crate) fn group_records(
    date: NaiveDate,
    records: &[ConsolidatedRecord],
    gbp: Decimal,
) -> GroupedReport {
    let mut by_pair: BTreeMap<(String, String), GroupTotals> = BTreeMap::new();
    let mut by_currency: BTreeMap<String, GroupTotals> = BTreeMap::new();
    let mut by_site: BTreeMap<String, GroupTotals> = BTreeMap::new();
    for record in records.iter().filter(|record| record.qualifies()) {
        by_pair
            .entry((record.site_name.clone(), record.currency.clone()))
            .or_default()
            .add(record);
        by_currency
            .entry(record.currency.clone())
            .or_default()
            .add(record);
        by_site
            .entry(record.site_name.clone())
            .or_default()
            .add(record);
    }
    GroupedReport {
        date,
        by_site_currency: by_pair
            .into_iter()
            .map(|((site, currency), totals)| totals.into_row(Some(site), Some(currency), gbp))
            .collect(),
        by_currency: by_currency
            .into_iter()
            .map(|(currency, totals)| totals.into_row(None, Some(currency), gbp))
            .collect(),
        by_site: by_site
            .into_iter()
            .map(|(site, totals)| totals.into_row(Some(site), None, gbp))
            .collect(),
    }
}

fn write_group_csv(path: &Path, rows: &[GgrGroupRow], with_site: bool, with_currency: bool) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut header = Vec::new();
    if with_site {
        header.push("Site Name");
    }
    if with_currency {
        header.push("Currency");
    }
    header.extend(["Bet", "Win", "Number of Spins", "GGR_EUR", "GGR_GBP"]);
    writer.write_record(&header)?;
    for row in rows {
        let mut fields = Vec::with_capacity(header.len());
        if with_site {
            fields.push(row.site_name.clone().unwrap_or_default());
        }
        if with_currency {
            fields.push(row.currency.clone().unwrap_or_default());
        }
        fields.push(row.bet.to_string());
        fields.push(row.win.to_string());
        fields.push(row.number_of_spins.to_string());
        fields.push(row.ggr_eur.to_string());
        fields.push(row.ggr_gbp.to_string());
        writer.write_record(&fields)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(site: &str, currency: &str, bet: Decimal, win: Decimal, fx: Decimal) -> ConsolidatedRecord {
        ConsolidatedRecord {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            username: format!("{site}-{currency}"),
            account_id: "1".to_string(),
            game_name: "G".to_string(),
            game_id: "g".to_string(),
            currency: currency.to_string(),
            fx_rate: fx,
            bet,
            win,
            bet_eur: bet * fx,
            win_eur: win * fx,
            number_of_spins: 2,
            cash_bet: bet,
            bonus_bet: Decimal::ZERO,
            cash_win: win,
            bonus_win: Decimal::ZERO,
            site_name: site.to_string(),
        }
    }

    #[test]
    fn groups_by_site_and_currency() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let records = vec![
            record("SiteA", "EUR", dec!(100), dec!(50), dec!(1)),
            record("SiteA", "USD", dec!(100), dec!(50), dec!(0.8)),
            record("SiteB", "EUR", dec!(10), dec!(20), dec!(1)),
            record("SiteB", "XYZ", dec!(999), dec!(0), Decimal::ZERO),
        ];
        let report = group_records(date, &records, dec!(1.25));

        assert_eq!(report.by_site_currency.len(), 3);
        assert_eq!(report.by_currency.len(), 2);
        assert_eq!(report.by_site.len(), 2);

        let site_a = &report.by_site[0];
        assert_eq!(site_a.site_name.as_deref(), Some("SiteA"));
        assert_eq!(site_a.bet, dec!(180));
        assert_eq!(site_a.ggr_eur, dec!(90));
        assert_eq!(site_a.ggr_gbp, dec!(72));
        assert_eq!(site_a.number_of_spins, 4);

        let eur = &report.by_currency[0];
        assert_eq!(eur.currency.as_deref(), Some("EUR"));
        assert_eq!(eur.ggr_eur, dec!(40));
    }

    #[test]
    fn writes_three_csv_tables() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let report = group_records(
            date,
            &[record("SiteA", "EUR", dec!(100), dec!(50), dec!(1))],
            dec!(1.25),
        );
        let rows = &report.by_site_currency;
        let path = dir.path().join("GGR_CUR_OP_2024-06-01.csv");
        write_group_csv(&path, rows, true, true).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("Site Name,Currency,Bet,Win,Number of Spins,GGR_EUR,GGR_GBP")
        );
        let row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(&row[..6], &["SiteA", "EUR", "100", "50", "2", "50"]);
        assert_eq!(row[6].parse::<Decimal>().unwrap(), dec!(40));
    }
}
