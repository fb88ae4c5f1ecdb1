mod args;
mod config;
mod dirs;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ggr_app::{ApiError, AppConfig, AppError, AppPaths, AppState, ensure_app_data_dir};
use ingest::IngestStats;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, error, info};

use args::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::load_or_create(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    config.config.logging.init();
    if config.created {
        info!(path = %config.paths.file.display(), "created default config");
    }

    match run(cli, config.config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let api = ApiError::from(err);
            error!(status = api.status, "{}", api.message);
            match serde_json::to_string_pretty(&api) {
                Ok(body) => eprintln!("{body}"),
                Err(_) => eprintln!("{}", api.message),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: config::CliConfig) -> Result<(), AppError> {
    let data_dir = dirs::resolve_data_dir().map_err(AppError::Validation)?;
    if data_dir.matched_existing {
        debug!(dir = %data_dir.dir.display(), "using existing data dir");
    }
    let paths = AppPaths::new(data_dir.dir);
    let app_config = app_config(cli.db, &config, &paths);
    if app_config.db_path == paths.db_path {
        ensure_app_data_dir(&paths)?;
    }

    let app_state = AppState::new(app_config)?;
    if app_state.is_fresh_db() {
        info!(path = %app_state.config.db_path.display(), "creating database");
    }
    app_state.setup_db()?;
    let services = &app_state.services;

    match cli.command {
        Command::Ingest { paths } => print_json(&ingest_output(&services.ingest.run(&paths)?)),
        Command::Summary { target } => print_json(&services.summary.get_summary(target)?),
        Command::Metrics => print_json(&services.summary.cumulative_metrics()?),
        Command::Overview => print_json(&services.summary.overview()?),
        Command::Report { date, out, export } => {
            let report = services.reports.grouped_report(date)?;
            if out.is_some() || export {
                let files = services.reports.export_report(&report, out.as_deref())?;
                print_json(&json!({ "report": report, "files": files }))
            } else {
                print_json(&report)
            }
        }
        Command::Players => print_json(&services.reports.player_distribution()?),
        Command::Rates { date } => print_json(&services.rates.resolve(date)?),
        Command::FillGaps => print_json(&services.summary.fill_gaps()?),
    }
}

/// `--db` wins over the configured path; both fall back to the data dir.
fn app_config(db: Option<PathBuf>, config: &config::CliConfig, paths: &AppPaths) -> AppConfig {
    AppConfig {
        db_path: db
            .or_else(|| config.db_path.clone())
            .unwrap_or_else(|| paths.db_path.clone()),
        report_dir: config
            .report_dir
            .clone()
            .unwrap_or_else(|| paths.report_dir.clone()),
        rates: config.rates.clone(),
        currency: config.currency(),
    }
}

fn ingest_output(stats: &IngestStats) -> Value {
    json!({
        "batch_date": stats.batch_date,
        "files_read": stats.files_read,
        "rows_read": stats.rows_read,
        "inserted": stats.inserted,
        "skipped": stats.skipped,
        "unresolved_rows": stats.unresolved_rows,
        "unresolved_currencies": stats.unresolved_currencies,
        "issues": stats.issues,
        "informational": {
            "excluded_house_account_rows": stats.excluded,
        },
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
