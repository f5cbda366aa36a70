//! Sift CLI - personal transaction analytics
//!
//! Usage:
//!   sift init                  Initialize database
//!   sift import --file CSV     Import a CSV export as a dataset
//!   sift report <dataset>      Monthly report
//!   sift suggest <dataset>     Budget suggestions + anomalies
//!   sift serve --port 3000     Start the REST API server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use sift_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = Config::new(
        cli.db.unwrap_or_else(Config::default_db_path),
        cli.taxonomy,
    );

    match cli.command {
        Commands::Init => commands::cmd_init(&config),
        Commands::Import { file, source } => {
            commands::cmd_import(&config, &file, source.as_deref())
        }
        Commands::Datasets => commands::cmd_datasets(&config),
        Commands::Report {
            dataset,
            month,
            json,
        } => commands::cmd_report(&config, &dataset, month.as_deref(), json),
        Commands::Merchants {
            dataset,
            month,
            limit,
        } => commands::cmd_merchants(&config, &dataset, month.as_deref(), limit),
        Commands::Suggest {
            dataset,
            month,
            count,
            no_summary,
        } => commands::cmd_suggest(&config, &dataset, month.as_deref(), count, no_summary).await,
        Commands::Analyze {
            dataset,
            month,
            count,
            no_summary,
        } => commands::cmd_analyze(&config, &dataset, month.as_deref(), count, no_summary).await,
        Commands::Serve { port, host } => commands::cmd_serve(&config, &host, port).await,
    }
}
