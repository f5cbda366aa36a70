//! Sift Core Library
//!
//! Shared functionality for the Sift transaction analytics pipeline:
//! - CSV import with column-alias resolution and cent-exact amounts
//! - SQLite storage for immutable transaction datasets
//! - Keyword-rule categorization with an extendable taxonomy
//! - Statistical anomaly detection (percentile outliers, category growth,
//!   recurring subscriptions, single-day spikes)
//! - Rule-based budget suggestions with optional LLM summary enrichment
//! - Monthly report and merchant ranking generation

pub mod anomalies;
pub mod categorize;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod report;
pub mod suggest;
pub mod summary;

pub use anomalies::AnomalyDetector;
pub use categorize::{
    CategorizationEngine, CategoryMatch, CategoryRule, DefaultRules, RuleSet, RuleSource,
    TaxonomyFile,
};
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use import::{parse_csv_text, upload_transactions};
pub use report::{generate_monthly_report, generate_top_merchants, validate_month};
pub use suggest::{SuggestionGenerator, MAX_RECOMMENDATIONS, MIN_RECOMMENDATIONS};
pub use summary::{MockBackend, OpenAICompatibleBackend, SummaryBackend, SummaryClient};
