//! Budget suggestion command

use anyhow::{bail, Result};

use sift_core::models::SuggestionSet;
use sift_core::{
    validate_month, CategorizationEngine, Config, SuggestionGenerator, SummaryClient,
};

use super::open_db;

/// Fetch rows and run the suggestion generator for a dataset
pub async fn generate_suggestions(
    config: &Config,
    dataset_id: &str,
    month: Option<&str>,
    count: usize,
    no_summary: bool,
) -> Result<SuggestionSet> {
    validate_month(month)?;

    let db = open_db(config)?;
    if !db.dataset_exists(dataset_id)? {
        bail!("Unknown dataset_id: {}", dataset_id);
    }
    let rows = db.fetch_transactions(dataset_id, month)?;

    let summarizer = if no_summary {
        None
    } else {
        SummaryClient::from_env()
    };

    let engine = CategorizationEngine::from_taxonomy_path(config.taxonomy_path());
    let set = SuggestionGenerator::new(&engine)
        .generate(&rows, month, count, summarizer.as_ref())
        .await?;
    Ok(set)
}

pub async fn cmd_suggest(
    config: &Config,
    dataset_id: &str,
    month: Option<&str>,
    count: usize,
    no_summary: bool,
) -> Result<()> {
    let set = generate_suggestions(config, dataset_id, month, count, no_summary).await?;

    println!();
    println!(
        "💡 Budget Suggestions ({})",
        set.month.as_deref().unwrap_or("all")
    );
    for (idx, suggestion) in set.suggestions.iter().enumerate() {
        println!();
        println!(
            "   {}. {} [{}]",
            idx + 1,
            suggestion.title,
            suggestion.source
        );
        println!(
            "      Estimated impact: {:.2} {}/month",
            suggestion.estimated_monthly_impact, set.currency
        );
        println!("      Reason: {}", suggestion.reason);
        for step in &suggestion.action_steps {
            println!("      - {}", step);
        }
    }

    println!();
    if set.anomalies.is_empty() {
        println!("   No anomalies detected for the selected scope.");
    } else {
        println!("🚨 Anomalies");
        for anomaly in &set.anomalies {
            println!("   [{}] {}", anomaly.severity(), anomaly.message());
        }
    }

    if let Some(summary) = &set.summary {
        println!();
        println!("📝 Executive Summary");
        println!("   {}", summary);
    }

    Ok(())
}
