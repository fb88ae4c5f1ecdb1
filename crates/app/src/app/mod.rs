use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::services::AppServices;
use ggr_core::CurrencyConfig;
use ggr_db::Db;
use rates::{FixerClient, FixerSettings, RateSource};

/// Paths and settings needed to run the pipeline.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub report_dir: PathBuf,
    pub rates: FixerSettings,
    pub currency: CurrencyConfig,
}

/// Application state shared by frontends (CLI, tests).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    /// Builds the state with the HTTP rate source from `config.rates`.
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = FixerClient::new(config.rates.clone())?;
        Ok(Self::with_rate_source(config, Arc::new(client)))
    }

    pub fn with_rate_source(config: AppConfig, source: Arc<dyn RateSource>) -> Self {
        let services = AppServices::new(&config, source);
        Self { config, services }
    }

    pub fn is_fresh_db(&self) -> bool {
        !self.config.db_path.exists()
    }

    pub fn setup_db(&self) -> Result<()> {
        setup_db(&self.config.db_path)
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }
}

pub fn setup_db(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}
