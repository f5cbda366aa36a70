//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sift - Turn bank CSV exports into reports, anomalies, and savings ideas
#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Personal transaction analytics pipeline", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Taxonomy file extending the built-in categorization rules
    #[arg(long, global = true)]
    pub taxonomy: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import a CSV export as a new dataset
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Optional source label (e.g. "checking 2026-01")
        #[arg(short, long)]
        source: Option<String>,
    },

    /// List stored datasets
    Datasets,

    /// Generate the monthly report for a dataset
    Report {
        /// Dataset identifier returned by import
        dataset: String,

        /// Month filter in YYYY-MM format
        #[arg(short, long)]
        month: Option<String>,

        /// Print the raw JSON payload instead of markdown
        #[arg(long)]
        json: bool,
    },

    /// Rank merchants by spend for a dataset
    Merchants {
        /// Dataset identifier
        dataset: String,

        /// Month filter in YYYY-MM format
        #[arg(short, long)]
        month: Option<String>,

        /// Maximum number of merchants to show
        #[arg(short, long, default_value = "5")]
        limit: i64,
    },

    /// Generate budget suggestions and anomaly findings
    Suggest {
        /// Dataset identifier
        dataset: String,

        /// Month filter in YYYY-MM format
        #[arg(short, long)]
        month: Option<String>,

        /// Number of suggestions to produce (3..=7)
        #[arg(short, long, default_value = "3")]
        count: usize,

        /// Skip the LLM executive summary even if configured
        #[arg(long)]
        no_summary: bool,
    },

    /// Run report + merchants + suggestions and merge into one markdown brief
    Analyze {
        /// Dataset identifier
        dataset: String,

        /// Month filter in YYYY-MM format
        #[arg(short, long)]
        month: Option<String>,

        /// Number of suggestions to include (3..=7)
        #[arg(short, long, default_value = "3")]
        count: usize,

        /// Skip the LLM executive summary even if configured
        #[arg(long)]
        no_summary: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}
