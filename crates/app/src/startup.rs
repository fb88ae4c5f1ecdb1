use std::path::PathBuf;

use crate::Result;

const DB_FILE_NAME: &str = "ggr-report.sqlite";
const REPORT_DIR_NAME: &str = "reports";

/// Default on-disk layout under one data directory.
#[derive(Clone, Debug)]
pub struct AppPaths {
    pub app_data_dir: PathBuf,
    pub db_path: PathBuf,
    pub report_dir: PathBuf,
}

impl AppPaths {
    pub fn new(app_data_dir: PathBuf) -> Self {
        let db_path = app_data_dir.join(DB_FILE_NAME);
        let report_dir = app_data_dir.join(REPORT_DIR_NAME);
        Self {
            app_data_dir,
            db_path,
            report_dir,
        }
    }
}

pub fn ensure_app_data_dir(paths: &AppPaths) -> Result<()> {
    std::fs::create_dir_all(&paths.app_data_dir)?;
    Ok(())
}
