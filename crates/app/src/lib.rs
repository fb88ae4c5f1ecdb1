pub mod app;
pub mod config;
pub mod error;
pub mod services;
pub mod startup;
pub mod util;

pub use app::{AppConfig, AppState};
pub use config::{SummaryTarget, parse_date};
pub use error::{ApiError, AppError, Result};
pub use services::{AppServices, GapFillReport, ReportFiles};
pub use startup::{AppPaths, ensure_app_data_dir};
pub use util::dates::date_span;
