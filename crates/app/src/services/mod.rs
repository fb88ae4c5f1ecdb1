mod ingest;
mod rates;
mod reports;
mod summary;

use std::sync::Arc;

use crate::app::AppConfig;
use crate::error::Result;
use ::rates::{RateResolver, RateSource};
use ggr_db::Db;

pub use ingest::IngestService;
pub use rates::RatesService;
pub use reports::{ReportFiles, ReportsService};
pub use summary::{GapFillReport, SummaryService};

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub ingest: IngestService,
    pub rates: RatesService,
    pub summary: SummaryService,
    pub reports: ReportsService,
}

impl AppServices {
    pub fn new(config: &AppConfig, source: Arc<dyn RateSource>) -> Self {
        let shared = Arc::new(config.clone());
        let resolver = RateResolver::new(source, Arc::new(config.currency.clone()));
        Self {
            ingest: IngestService::new(shared.clone(), resolver.clone()),
            rates: RatesService::new(shared.clone(), resolver.clone()),
            summary: SummaryService::new(shared.clone(), resolver.clone()),
            reports: ReportsService::new(shared, resolver),
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}
