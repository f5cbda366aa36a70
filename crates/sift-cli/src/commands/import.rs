//! CSV import command

use std::path::Path;

use anyhow::{Context, Result};

use sift_core::{upload_transactions, Config};

use super::open_db;

pub fn cmd_import(config: &Config, file: &Path, source: Option<&str>) -> Result<()> {
    println!("📥 Importing {}...", file.display());

    let csv_text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let db = open_db(config)?;
    let source_name = source.or_else(|| file.file_name().and_then(|n| n.to_str()));
    let result = upload_transactions(&db, &csv_text, source_name)?;

    println!("✅ Imported {} transactions", result.rows_ingested);
    println!("   Dataset ID: {}", result.dataset_id);

    if !result.warnings.is_empty() {
        println!("   ⚠️  {} rows skipped:", result.warnings.len());
        for warning in result.warnings.iter().take(5) {
            println!("      - {}", warning);
        }
        if result.warnings.len() > 5 {
            println!("      ... and {} more", result.warnings.len() - 5);
        }
    }

    println!();
    println!("Next: sift report {}", result.dataset_id);

    Ok(())
}
