//! Report command implementations

use anyhow::Result;

use sift_core::{
    generate_monthly_report, generate_top_merchants, CategorizationEngine, Config,
};

use super::open_db;

pub fn cmd_report(
    config: &Config,
    dataset_id: &str,
    month: Option<&str>,
    json: bool,
) -> Result<()> {
    let db = open_db(config)?;
    let engine = CategorizationEngine::from_taxonomy_path(config.taxonomy_path());
    let report = generate_monthly_report(&db, &engine, dataset_id, month)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.markdown_report);
    }

    Ok(())
}

pub fn cmd_merchants(
    config: &Config,
    dataset_id: &str,
    month: Option<&str>,
    limit: i64,
) -> Result<()> {
    let db = open_db(config)?;
    let report = generate_top_merchants(&db, dataset_id, month, limit)?;

    println!();
    println!("🏪 Top Merchants ({})", report.month.as_deref().unwrap_or("all"));
    println!(
        "   {:30} │ {:>12} │ {:>5}",
        "Merchant", "Spend", "Count"
    );
    println!("   ───────────────────────────────┼──────────────┼───────");
    for merchant in &report.top_merchants {
        println!(
            "   {:30} │ {:>9.2} {} │ {:>5}",
            merchant.merchant, merchant.total_spend, merchant.currency, merchant.transactions_count
        );
    }

    Ok(())
}
