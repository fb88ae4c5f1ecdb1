use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ggr_app::SummaryTarget;
use chrono::NaiveDate;

/// Daily GGR and RTP reporting over consolidated gaming extracts.
#[derive(Parser, Debug)]
#[command(name = "ggr-report", version)]
pub struct Cli {
    /// Config file (created with defaults when missing)
    #[arg(long, env = "GGR_REPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the configured SQLite database path
    #[arg(long)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Consolidate extract files (or directories of them) for one date
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Compute and store daily summaries: a date, `latest` or `all`
    Summary {
        #[arg(default_value = "latest")]
        target: SummaryTarget,
    },

    /// Cumulative totals straight from stored records
    Metrics,

    /// Fill missing summaries, then cumulative and latest-day totals
    Overview,

    /// GGR grouped by site and currency for one date
    Report {
        date: NaiveDate,

        /// Also write the tables as CSV into this directory
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write CSV files into the configured report directory
        #[arg(long, conflicts_with = "out")]
        export: bool,
    },

    /// Accounts bucketed by lifetime spins
    Players,

    /// Resolve and store exchange rates for one date
    Rates { date: NaiveDate },

    /// Insert summaries for dates that have records but no summary
    FillGaps,
}
