use std::path::PathBuf;

use crate::error::Result;
use crate::services::{SharedConfig, open_db};
use ggr_db::Db;
use ingest::IngestStats;
use rates::RateResolver;

#[derive(Clone)]
pub struct IngestService {
    config: SharedConfig,
    resolver: RateResolver,
}

impl IngestService {
    pub(super) fn new(config: SharedConfig, resolver: RateResolver) -> Self {
        Self { config, resolver }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// Consolidates one batch of extract files or directories.
    pub fn run(&self, inputs: &[PathBuf]) -> Result<IngestStats> {
        let mut db = self.db()?;
        Ok(ingest::ingest_files(&mut db, &self.resolver, inputs)?)
    }
}
