//! Statistical anomaly detection over categorized expense rows
//!
//! Four independent detectors run over one batch of transactions:
//! - Percentile outliers: single expenses above the 95th percentile of
//!   their category
//! - Category growth: target-month spend well above the historical average
//! - Recurring subscriptions: near-fixed charges across several months
//! - Single-day spikes: days whose spend towers over the month's average
//!
//! All detection arithmetic runs on integer cents; findings report major
//! units rounded to 2 decimals. Findings are derived fresh per request and
//! never stored.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::NaiveDate;

use crate::categorize::CategorizationEngine;
use crate::models::{AnomalyFinding, Severity, Transaction};

/// Global cap on percentile-outlier findings, applied across all categories
/// in grouping order.
const MAX_PERCENTILE_FINDINGS: usize = 10;

/// Global cap on recurring-subscription findings, applied across all
/// merchants in grouping order.
const MAX_SUBSCRIPTION_FINDINGS: usize = 10;

/// Growth must exceed this ratio of the historical baseline.
const GROWTH_RATIO_THRESHOLD: f64 = 1.3;

/// Growth must also exceed this absolute floor (cents), so tiny categories
/// don't get flagged.
const GROWTH_ABSOLUTE_FLOOR_CENTS: f64 = 10_000.0;

/// Maximum relative deviation from the mean for a recurring charge.
const SUBSCRIPTION_MAX_DEVIATION: f64 = 0.15;

/// An expense row enriched with its category and month bucket
struct EnrichedExpense {
    merchant: String,
    category: String,
    expense_cents: i64,
    month: String,
    date: NaiveDate,
}

/// Batch anomaly detector
pub struct AnomalyDetector<'a> {
    engine: &'a CategorizationEngine,
}

impl<'a> AnomalyDetector<'a> {
    pub fn new(engine: &'a CategorizationEngine) -> Self {
        Self { engine }
    }

    /// Run all detectors over one batch of rows
    ///
    /// `month` defaults to the latest `YYYY-MM` present among expense rows.
    /// Results are concatenated in fixed detector order; within a detector,
    /// output follows the grouping order of the input rows, so identical
    /// input yields identical output.
    pub fn detect(&self, rows: &[Transaction], month: Option<&str>) -> Vec<AnomalyFinding> {
        let expenses: Vec<EnrichedExpense> = rows
            .iter()
            .filter(|row| row.amount_cents < 0)
            .map(|row| {
                let category = self.engine.categorize(&row.merchant, &row.description);
                EnrichedExpense {
                    merchant: row.merchant.clone(),
                    category: category.category,
                    expense_cents: row.amount_cents.abs(),
                    month: row.month(),
                    date: row.txn_date,
                }
            })
            .collect();

        if expenses.is_empty() {
            return Vec::new();
        }

        let target_month = match month {
            Some(m) => m.to_string(),
            None => latest_month(&expenses),
        };

        let mut findings = Vec::new();
        findings.extend(detect_category_percentile_outliers(&expenses));
        findings.extend(detect_category_growth(&expenses, &target_month));
        findings.extend(detect_recurring_subscriptions(&expenses));
        findings.extend(detect_single_day_spike(&expenses, &target_month));
        findings
    }
}

/// Flag expenses strictly above the 95th percentile of their category.
///
/// Categories with fewer than 5 rows are skipped: the percentile is
/// meaningless on tiny samples.
fn detect_category_percentile_outliers(rows: &[EnrichedExpense]) -> Vec<AnomalyFinding> {
    let by_category = group_in_order(rows, |row| row.category.clone());

    let mut findings = Vec::new();
    for (category, values) in by_category {
        if values.len() < 5 {
            continue;
        }

        let mut amounts: Vec<i64> = values.iter().map(|row| row.expense_cents).collect();
        amounts.sort_unstable();
        let p95 = percentile(&amounts, 0.95);

        for row in values {
            if (row.expense_cents as f64) > p95 {
                findings.push(AnomalyFinding::HighTransactionWithinCategory {
                    severity: Severity::Medium,
                    merchant: row.merchant.clone(),
                    category: category.clone(),
                    date: row.date,
                    amount: cents_to_major(row.expense_cents as f64),
                    threshold_p95: cents_to_major(p95),
                    message: format!(
                        "{} is above the 95th percentile in {}.",
                        row.merchant, category
                    ),
                });
            }
        }
    }
    findings.truncate(MAX_PERCENTILE_FINDINGS);
    findings
}

/// Flag categories whose target-month spend grew sharply vs their history.
///
/// The baseline is the mean of all other months' positive totals; a category
/// with no history never fires.
fn detect_category_growth(rows: &[EnrichedExpense], target_month: &str) -> Vec<AnomalyFinding> {
    let by_category = group_in_order(rows, |row| row.category.clone());

    let mut findings = Vec::new();
    for (category, values) in by_category {
        let month_totals = group_in_order(&values, |row| row.month.clone());

        let mut current: i64 = 0;
        let mut historical: Vec<i64> = Vec::new();
        for (month, month_rows) in month_totals {
            let total: i64 = month_rows.iter().map(|row| row.expense_cents).sum();
            if month == target_month {
                current = total;
            } else if total > 0 {
                historical.push(total);
            }
        }

        if current <= 0 || historical.is_empty() {
            continue;
        }
        let baseline = historical.iter().sum::<i64>() as f64 / historical.len() as f64;
        if baseline <= 0.0 {
            continue;
        }

        let ratio = current as f64 / baseline;
        if ratio > GROWTH_RATIO_THRESHOLD && (current as f64 - baseline) > GROWTH_ABSOLUTE_FLOOR_CENTS
        {
            let growth_pct = (ratio - 1.0) * 100.0;
            findings.push(AnomalyFinding::CategoryGrowthVsHistory {
                severity: Severity::High,
                category: category.clone(),
                month: target_month.to_string(),
                current_spend: cents_to_major(current as f64),
                historical_average: cents_to_major(baseline),
                growth_pct: round2(growth_pct),
                message: format!(
                    "{} spending is {}% above historical average.",
                    category,
                    growth_pct.round() as i64
                ),
            });
        }
    }
    findings
}

/// Flag merchants whose charges look like a recurring subscription: at least
/// 3 transactions spanning at least 3 distinct months, with every amount
/// within 15% of the mean.
fn detect_recurring_subscriptions(rows: &[EnrichedExpense]) -> Vec<AnomalyFinding> {
    let by_merchant = group_in_order(rows, |row| row.merchant.clone());

    let mut findings = Vec::new();
    for (merchant, values) in by_merchant {
        let months: std::collections::HashSet<&str> =
            values.iter().map(|row| row.month.as_str()).collect();
        if values.len() < 3 || months.len() < 3 {
            continue;
        }

        let amounts: Vec<i64> = values.iter().map(|row| row.expense_cents).collect();
        let avg = amounts.iter().sum::<i64>() as f64 / amounts.len() as f64;
        if avg <= 0.0 {
            continue;
        }

        let max_dev = amounts
            .iter()
            .map(|&amount| (amount as f64 - avg).abs() / avg)
            .fold(0.0_f64, f64::max);

        if max_dev <= SUBSCRIPTION_MAX_DEVIATION {
            findings.push(AnomalyFinding::PossibleRecurringSubscription {
                severity: Severity::Medium,
                merchant: merchant.clone(),
                months_detected: months.len(),
                average_monthly_amount: cents_to_major(avg),
                message: format!("{} appears as a recurring subscription.", merchant),
            });
        }
    }
    findings.truncate(MAX_SUBSCRIPTION_FINDINGS);
    findings
}

/// Flag days in the target month whose total spend exceeds both
/// mean + 2 sigma and 1.5x the mean. The second condition keeps skewed
/// small samples from over-flagging on a pure z-score.
fn detect_single_day_spike(rows: &[EnrichedExpense], target_month: &str) -> Vec<AnomalyFinding> {
    let mut day_totals: HashMap<NaiveDate, i64> = HashMap::new();
    for row in rows {
        if row.month == target_month {
            *day_totals.entry(row.date).or_insert(0) += row.expense_cents;
        }
    }

    if day_totals.len() < 5 {
        return Vec::new();
    }

    let values: Vec<i64> = day_totals.values().copied().collect();
    let mean = values.iter().sum::<i64>() as f64 / values.len() as f64;
    let std = population_std(&values, mean);
    if std == 0.0 {
        return Vec::new();
    }
    let threshold = mean + 2.0 * std;

    // Ascending calendar order for deterministic output
    let mut days: Vec<(NaiveDate, i64)> = day_totals.into_iter().collect();
    days.sort_unstable_by_key(|(day, _)| *day);

    let mut findings = Vec::new();
    for (day, total) in days {
        if (total as f64) > threshold && (total as f64) > mean * 1.5 {
            findings.push(AnomalyFinding::SingleDaySpendingSpike {
                severity: Severity::High,
                date: day,
                total_spend: cents_to_major(total as f64),
                monthly_daily_average: cents_to_major(mean),
                message: format!("Single-day spend spike detected on {}.", day),
            });
        }
    }
    findings
}

/// Lexicographically latest `YYYY-MM` among the expense rows
fn latest_month(rows: &[EnrichedExpense]) -> String {
    rows.iter()
        .map(|row| row.month.as_str())
        .max()
        .unwrap_or_default()
        .to_string()
}

/// Group items by key, preserving first-seen key order
fn group_in_order<T, K, F>(items: &[T], key: F) -> Vec<(K, Vec<&T>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&T>)> = Vec::new();
    for item in items {
        let k = key(item);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }
    groups
}

/// Percentile via linear interpolation between order statistics.
/// `values` must be sorted ascending.
fn percentile(values: &[i64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    if values.len() == 1 {
        return values[0] as f64;
    }
    let index = (values.len() - 1) as f64 * q;
    let low = index.floor() as usize;
    let high = (low + 1).min(values.len() - 1);
    let weight = index - low as f64;
    values[low] as f64 * (1.0 - weight) + values[high] as f64 * weight
}

/// Population standard deviation
fn population_std(values: &[i64], mean: f64) -> f64 {
    let variance = values
        .iter()
        .map(|&value| {
            let diff = value as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Convert cents to major units, rounded to 2 decimal places
fn cents_to_major(cents: f64) -> f64 {
    round2(cents / 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
