//! Aggregate reports over stored datasets
//!
//! Monthly totals with a categorized expense breakdown, plus merchant spend
//! rankings. Totals are computed in integer cents and converted to major
//! units only at the report boundary.

use std::collections::HashMap;

use regex::Regex;

use crate::categorize::CategorizationEngine;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{CategoryTotal, MonthlyReport, TopMerchantsReport, Transaction};

/// Validate an optional `YYYY-MM` month filter
pub fn validate_month(month: Option<&str>) -> Result<()> {
    let Some(month) = month else {
        return Ok(());
    };
    let pattern = Regex::new(r"^\d{4}-\d{2}$")?;
    if !pattern.is_match(month) {
        return Err(Error::InvalidData("month must be in YYYY-MM format".into()));
    }
    Ok(())
}

/// Build the monthly aggregate report for a dataset
pub fn generate_monthly_report(
    db: &Database,
    engine: &CategorizationEngine,
    dataset_id: &str,
    month: Option<&str>,
) -> Result<MonthlyReport> {
    validate_month(month)?;
    if !db.dataset_exists(dataset_id)? {
        return Err(Error::NotFound(format!("Unknown dataset_id: {}", dataset_id)));
    }

    let rows = db.fetch_transactions(dataset_id, month)?;
    if rows.is_empty() {
        return Err(Error::NotFound(
            "No transactions found for the requested dataset/month".into(),
        ));
    }

    let income_cents: i64 = rows
        .iter()
        .filter(|row| row.amount_cents > 0)
        .map(|row| row.amount_cents)
        .sum();
    let spent_cents: i64 = rows
        .iter()
        .filter(|row| row.amount_cents < 0)
        .map(|row| row.amount_cents)
        .sum::<i64>()
        .abs();
    let net_cents = income_cents - spent_cents;

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<(String, i64)> = Vec::new();
    for row in rows.iter().filter(|row| row.amount_cents < 0) {
        let category = engine.categorize(&row.merchant, &row.description).category;
        match index.get(&category) {
            Some(&i) => totals[i].1 += row.amount_cents.abs(),
            None => {
                index.insert(category.clone(), totals.len());
                totals.push((category, row.amount_cents.abs()));
            }
        }
    }
    totals.sort_by(|a, b| b.1.cmp(&a.1));

    let category_breakdown: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, cents)| CategoryTotal {
            category,
            amount: cents_to_major(cents),
        })
        .collect();

    let report_month = match month {
        Some(m) => Some(m.to_string()),
        None => infer_single_month(&rows),
    };
    let currency = resolve_currency(&rows);

    let markdown_report = render_markdown_report(
        dataset_id,
        report_month.as_deref(),
        &currency,
        cents_to_major(spent_cents),
        cents_to_major(income_cents),
        cents_to_major(net_cents),
        &category_breakdown,
    );

    Ok(MonthlyReport {
        dataset_id: dataset_id.to_string(),
        month: report_month,
        rows_analyzed: rows.len(),
        currency,
        total_spent: cents_to_major(spent_cents),
        total_income: cents_to_major(income_cents),
        net_balance: cents_to_major(net_cents),
        category_breakdown,
        markdown_report,
    })
}

/// Build the top-merchants ranking for a dataset
pub fn generate_top_merchants(
    db: &Database,
    dataset_id: &str,
    month: Option<&str>,
    limit: i64,
) -> Result<TopMerchantsReport> {
    validate_month(month)?;
    if !db.dataset_exists(dataset_id)? {
        return Err(Error::NotFound(format!("Unknown dataset_id: {}", dataset_id)));
    }

    let top_merchants = db.fetch_top_merchants(dataset_id, month, limit)?;
    if top_merchants.is_empty() {
        return Err(Error::NotFound(
            "No expense transactions found for the requested dataset/month".into(),
        ));
    }

    Ok(TopMerchantsReport {
        dataset_id: dataset_id.to_string(),
        month: month.map(|m| m.to_string()),
        currency: top_merchants[0].currency.clone(),
        top_merchants,
    })
}

fn render_markdown_report(
    dataset_id: &str,
    report_month: Option<&str>,
    currency: &str,
    total_spent: f64,
    total_income: f64,
    net_balance: f64,
    category_breakdown: &[CategoryTotal],
) -> String {
    let mut lines = vec![
        "# Monthly Finance Report".to_string(),
        String::new(),
        format!("- Dataset ID: `{}`", dataset_id),
        format!("- Month: `{}`", report_month.unwrap_or("all")),
        format!("- Currency: `{}`", currency),
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("- Total spent: `{:.2}`", total_spent),
        format!("- Total income: `{:.2}`", total_income),
        format!("- Net balance: `{:.2}`", net_balance),
        String::new(),
        "## Category Breakdown (Expenses)".to_string(),
        String::new(),
    ];

    if category_breakdown.is_empty() {
        lines.push("- No expense categories found.".to_string());
    } else {
        for category in category_breakdown {
            lines.push(format!("- {}: `{:.2}`", category.category, category.amount));
        }
    }

    lines.join("\n")
}

/// Most frequent currency code among the rows; ties go to the first seen
fn resolve_currency(rows: &[Transaction]) -> String {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for row in rows {
        match index.get(row.currency.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(&row.currency, counts.len());
                counts.push((&row.currency, 1));
            }
        }
    }
    let mut best: (&str, usize) = ("USD", 0);
    for (currency, count) in counts {
        if count > best.1 {
            best = (currency, count);
        }
    }
    best.0.to_string()
}

/// The single month covered by the rows, or None when they span several
fn infer_single_month(rows: &[Transaction]) -> Option<String> {
    let months: std::collections::HashSet<String> = rows.iter().map(|row| row.month()).collect();
    if months.len() == 1 {
        months.into_iter().next()
    } else {
        None
    }
}

fn cents_to_major(cents: i64) -> f64 {
    (cents as f64 / 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::upload_transactions;

    fn seeded() -> (Database, String) {
        let db = Database::in_memory().unwrap();
        let csv_text = "date,merchant,amount\n\
                        2026-01-03,Whole Foods,-128.45\n\
                        2026-01-07,Employer,3200.00\n\
                        2026-01-09,Netflix,-19.99\n\
                        2026-01-15,Shell,-54.20\n";
        let result = upload_transactions(&db, csv_text, None).unwrap();
        (db, result.dataset_id)
    }

    #[test]
    fn test_monthly_totals() {
        let (db, dataset_id) = seeded();
        let engine = CategorizationEngine::with_defaults();
        let report =
            generate_monthly_report(&db, &engine, &dataset_id, Some("2026-01")).unwrap();

        assert_eq!(report.rows_analyzed, 4);
        assert_eq!(report.total_spent, 202.64);
        assert_eq!(report.total_income, 3200.00);
        assert_eq!(report.net_balance, 2997.36);
        assert_eq!(report.currency, "USD");
        assert_eq!(report.month.as_deref(), Some("2026-01"));
    }

    #[test]
    fn test_category_breakdown_sorted_desc() {
        let (db, dataset_id) = seeded();
        let engine = CategorizationEngine::with_defaults();
        let report = generate_monthly_report(&db, &engine, &dataset_id, None).unwrap();

        let categories: Vec<&str> = report
            .category_breakdown
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(categories, vec!["grocery", "transport", "subscriptions"]);
        assert_eq!(report.category_breakdown[0].amount, 128.45);
        // Single-month dataset: the month is inferred even without a filter
        assert_eq!(report.month.as_deref(), Some("2026-01"));
    }

    #[test]
    fn test_markdown_rendering() {
        let (db, dataset_id) = seeded();
        let engine = CategorizationEngine::with_defaults();
        let report = generate_monthly_report(&db, &engine, &dataset_id, None).unwrap();

        assert!(report.markdown_report.starts_with("# Monthly Finance Report"));
        assert!(report.markdown_report.contains("- Total spent: `202.64`"));
        assert!(report.markdown_report.contains("- grocery: `128.45`"));
    }

    #[test]
    fn test_invalid_month_rejected() {
        let (db, dataset_id) = seeded();
        let engine = CategorizationEngine::with_defaults();
        let result = generate_monthly_report(&db, &engine, &dataset_id, Some("2026-1"));
        assert!(matches!(result, Err(Error::InvalidData(_))));
        let result = generate_monthly_report(&db, &engine, &dataset_id, Some("January"));
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_unknown_dataset_rejected() {
        let (db, _) = seeded();
        let engine = CategorizationEngine::with_defaults();
        let result = generate_monthly_report(&db, &engine, "missing", None);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_month_with_no_rows_rejected() {
        let (db, dataset_id) = seeded();
        let engine = CategorizationEngine::with_defaults();
        let result = generate_monthly_report(&db, &engine, &dataset_id, Some("1999-01"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_top_merchants_ranking() {
        let (db, dataset_id) = seeded();
        let report = generate_top_merchants(&db, &dataset_id, None, 2).unwrap();

        assert_eq!(report.top_merchants.len(), 2);
        assert_eq!(report.top_merchants[0].merchant, "Whole Foods");
        assert_eq!(report.top_merchants[0].total_spend, 128.45);
        assert_eq!(report.top_merchants[1].merchant, "Shell");
        assert_eq!(report.currency, "USD");
    }

    #[test]
    fn test_top_merchants_requires_expenses() {
        let db = Database::in_memory().unwrap();
        let csv_text = "date,merchant,amount\n2026-01-07,Employer,3200.00\n";
        let result = upload_transactions(&db, csv_text, None).unwrap();
        let report = generate_top_merchants(&db, &result.dataset_id, None, 5);
        assert!(matches!(report, Err(Error::NotFound(_))));
    }
}
