//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_datasets` - List stored datasets

use anyhow::{Context, Result};

use sift_core::{Config, Database};

/// Open the configured database, creating it on first use
pub fn open_db(config: &Config) -> Result<Database> {
    Database::new(&config.db_path).context("Failed to open database")
}

pub fn cmd_init(config: &Config) -> Result<()> {
    println!("🔧 Initializing database at {}...", config.db_path.display());

    open_db(config)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import a CSV export: sift import --file statement.csv");
    println!("  2. Generate a report:   sift report <dataset-id>");

    Ok(())
}

pub fn cmd_datasets(config: &Config) -> Result<()> {
    let db = open_db(config)?;
    let datasets = db.list_datasets()?;

    if datasets.is_empty() {
        println!("No datasets stored yet. Import one with: sift import --file statement.csv");
        return Ok(());
    }

    println!();
    println!("📁 Datasets");
    println!(
        "   {:36} │ {:>6} │ {:>8} │ {:19} │ Source",
        "ID", "Rows", "Warnings", "Created"
    );
    println!("   ─────────────────────────────────────┼────────┼──────────┼─────────────────────┼────────");
    for dataset in datasets {
        println!(
            "   {:36} │ {:>6} │ {:>8} │ {:19} │ {}",
            dataset.dataset_id,
            dataset.rows_ingested,
            dataset.warnings_count,
            dataset.created_at.format("%Y-%m-%d %H:%M:%S"),
            dataset.source_name.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
