//! Combined analysis command
//!
//! Runs the monthly report, merchant ranking, and suggestion pipeline for one
//! dataset and merges them into a single markdown brief.

use anyhow::Result;

use sift_core::models::{MonthlyReport, SuggestionSet, TopMerchantsReport};
use sift_core::{
    generate_monthly_report, generate_top_merchants, CategorizationEngine, Config,
};

use super::{generate_suggestions, open_db};

const MERCHANT_LIMIT: i64 = 5;
const ANOMALY_DISPLAY_LIMIT: usize = 10;

pub async fn cmd_analyze(
    config: &Config,
    dataset_id: &str,
    month: Option<&str>,
    count: usize,
    no_summary: bool,
) -> Result<()> {
    let db = open_db(config)?;
    let engine = CategorizationEngine::from_taxonomy_path(config.taxonomy_path());

    let report = generate_monthly_report(&db, &engine, dataset_id, month)?;
    let merchants = generate_top_merchants(&db, dataset_id, month, MERCHANT_LIMIT)?;
    let suggestions = generate_suggestions(config, dataset_id, month, count, no_summary).await?;

    println!("{}", merge_markdown(&report, &merchants, &suggestions));
    Ok(())
}

fn merge_markdown(
    report: &MonthlyReport,
    merchants: &TopMerchantsReport,
    suggestions: &SuggestionSet,
) -> String {
    let mut lines = vec![
        "# Finance Agent Report".to_string(),
        String::new(),
        format!("- Dataset ID: `{}`", report.dataset_id),
        format!("- Month: `{}`", report.month.as_deref().unwrap_or("all")),
        format!("- Currency: `{}`", report.currency),
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("- Total spent: `{:.2}`", report.total_spent),
        format!("- Total income: `{:.2}`", report.total_income),
        format!("- Net balance: `{:.2}`", report.net_balance),
        String::new(),
        "## Top Merchants".to_string(),
        String::new(),
    ];

    for merchant in &merchants.top_merchants {
        lines.push(format!(
            "- {}: `{:.2}` ({} transactions)",
            merchant.merchant, merchant.total_spend, merchant.transactions_count
        ));
    }

    lines.extend([String::new(), "## Savings Suggestions".to_string(), String::new()]);
    for (idx, suggestion) in suggestions.suggestions.iter().enumerate() {
        lines.push(format!(
            "{}. {} (estimated impact `{:.2}`)",
            idx + 1,
            suggestion.title,
            suggestion.estimated_monthly_impact
        ));
        lines.push(format!("   - Reason: {}", suggestion.reason));
        lines.push(format!("   - Action: {}", suggestion.action_steps[0]));
    }

    lines.extend([String::new(), "## Detected Anomalies".to_string(), String::new()]);
    if suggestions.anomalies.is_empty() {
        lines.push("- No anomalies detected for the selected scope.".to_string());
    } else {
        for anomaly in suggestions.anomalies.iter().take(ANOMALY_DISPLAY_LIMIT) {
            lines.push(format!("- [{}] {}", anomaly.severity(), anomaly.message()));
        }
    }

    if let Some(summary) = &suggestions.summary {
        lines.extend([
            String::new(),
            "## LLM Executive Summary".to_string(),
            String::new(),
            summary.clone(),
        ]);
    }

    lines.join("\n")
}
