//! Rule-based budgeting suggestions
//!
//! Ranks categories by spend, maps the top ones to a static savings playbook,
//! folds in anomaly-derived audit suggestions, and pads with fallback ideas
//! until the requested count is reached. Output order is significant and
//! reproducible for identical input.

use std::collections::HashMap;

use tracing::debug;

use crate::anomalies::AnomalyDetector;
use crate::categorize::CategorizationEngine;
use crate::error::{Error, Result};
use crate::models::{
    AnomalyFinding, BudgetSuggestion, SuggestionSet, SuggestionSource, Transaction,
};
use crate::summary::{SummaryBackend, SummaryClient, SummaryRequest};

/// Bounds on the number of suggestions a caller may request
pub const MIN_RECOMMENDATIONS: usize = 3;
pub const MAX_RECOMMENDATIONS: usize = 7;

/// Static savings playbook: action steps per category. Categories without an
/// entry use the "other" steps.
fn playbook_steps(category: &str) -> &'static [&'static str] {
    match category {
        "subscriptions" => &[
            "Review active subscriptions and cancel duplicates.",
            "Downgrade plans that are unused for 30+ days.",
        ],
        "transfers" => &[
            "Group non-urgent transfers into one weekly transfer.",
            "Set a weekly transfer cap and alert threshold.",
        ],
        "transport" => &[
            "Set a weekly transport budget and track against it.",
            "Batch errands to reduce fuel and ATM usage.",
        ],
        "card_payment" => &[
            "Set a card spend cap with a mid-month checkpoint.",
            "Move repeat discretionary purchases to a fixed envelope.",
        ],
        _ => &[
            "Flag this category for manual review and recategorization.",
            "Set a temporary 10% reduction target for this category.",
        ],
    }
}

/// Fixed fallback ideas, appended (deduplicated by title) when rule-based and
/// anomaly suggestions come up short.
const FALLBACK_IDEAS: &[(&str, &[&str])] = &[
    (
        "Set a weekly cash-flow checkpoint",
        &[
            "Review income vs expenses every week.",
            "Freeze discretionary spend if week-over-week burn rises above target.",
        ],
    ),
    (
        "Introduce a fixed discretionary envelope",
        &[
            "Set one monthly cap for non-essential spending.",
            "Move all discretionary purchases under that cap.",
        ],
    ),
    (
        "Create transfer guardrails",
        &[
            "Set transfer alerts for large outflows.",
            "Batch personal transfers to one weekly window.",
        ],
    ),
];

/// Suggestion generator over one batch of transactions
pub struct SuggestionGenerator<'a> {
    engine: &'a CategorizationEngine,
}

impl<'a> SuggestionGenerator<'a> {
    pub fn new(engine: &'a CategorizationEngine) -> Self {
        Self { engine }
    }

    /// Generate exactly `count` suggestions (3..=7) plus the full anomaly list
    ///
    /// The summary client is best-effort: any failure degrades to no summary,
    /// never to an error.
    pub async fn generate(
        &self,
        rows: &[Transaction],
        month: Option<&str>,
        count: usize,
        summarizer: Option<&SummaryClient>,
    ) -> Result<SuggestionSet> {
        if !(MIN_RECOMMENDATIONS..=MAX_RECOMMENDATIONS).contains(&count) {
            return Err(Error::InvalidData(format!(
                "recommendations must be between {} and {}",
                MIN_RECOMMENDATIONS, MAX_RECOMMENDATIONS
            )));
        }
        if rows.is_empty() {
            return Err(Error::NotFound(
                "No transactions found for the requested dataset/month".into(),
            ));
        }

        let expense_rows: Vec<&Transaction> =
            rows.iter().filter(|row| row.amount_cents < 0).collect();
        if expense_rows.is_empty() {
            return Err(Error::NotFound(
                "No expense transactions found for the requested dataset/month".into(),
            ));
        }

        let mut ranked = self.category_expense_totals(&expense_rows);
        // Stable sort keeps first-seen order among equal totals
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let currency = resolve_currency(rows);

        let mut suggestions: Vec<BudgetSuggestion> = Vec::new();
        for (category, cents) in &ranked {
            if suggestions.len() >= count {
                break;
            }
            suggestions.push(BudgetSuggestion {
                title: format!("Reduce {} spend by 10%", category),
                category: category.clone(),
                estimated_monthly_impact: round2((*cents as f64 / 100.0) * 0.1),
                action_steps: playbook_steps(category)
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                reason: format!("{} is a top expense category in this period.", category),
                source: SuggestionSource::RuleBased,
            });
        }

        let anomalies = AnomalyDetector::new(self.engine).detect(rows, month);
        for anomaly in &anomalies {
            if suggestions.len() >= count {
                break;
            }
            if let AnomalyFinding::PossibleRecurringSubscription {
                merchant,
                average_monthly_amount,
                message,
                ..
            } = anomaly
            {
                suggestions.push(BudgetSuggestion {
                    title: format!("Audit recurring charge: {}", merchant),
                    category: "subscriptions".to_string(),
                    estimated_monthly_impact: *average_monthly_amount,
                    action_steps: vec![
                        "Confirm if this merchant is still needed.".to_string(),
                        "Cancel or downgrade if usage is low.".to_string(),
                    ],
                    reason: message.clone(),
                    source: SuggestionSource::Anomaly,
                });
            }
        }

        let mut seen_titles: std::collections::HashSet<String> =
            suggestions.iter().map(|s| s.title.clone()).collect();
        for (title, steps) in FALLBACK_IDEAS {
            if suggestions.len() >= count {
                break;
            }
            if seen_titles.contains(*title) {
                continue;
            }
            suggestions.push(BudgetSuggestion {
                title: title.to_string(),
                category: "other".to_string(),
                estimated_monthly_impact: 100.0,
                action_steps: steps.iter().map(|s| s.to_string()).collect(),
                reason: "Baseline savings control for periods with noisy categories.".to_string(),
                source: SuggestionSource::Fallback,
            });
            seen_titles.insert(title.to_string());
        }

        while suggestions.len() < count {
            suggestions.push(BudgetSuggestion {
                title: format!("General discretionary reduction #{}", suggestions.len() + 1),
                category: "other".to_string(),
                estimated_monthly_impact: 100.0,
                action_steps: vec![
                    "Set a weekly discretionary spending ceiling.".to_string(),
                    "Review non-essential charges every Friday.".to_string(),
                ],
                reason: "Ensures baseline savings target even without strong signals.".to_string(),
                source: SuggestionSource::Fallback,
            });
        }

        suggestions.truncate(count);

        let summary = match summarizer {
            Some(client) => {
                let request = SummaryRequest::new(month, &currency, &suggestions, &anomalies);
                match client.summarize(&request).await {
                    Ok(text) => Some(text),
                    Err(e) => {
                        debug!(error = %e, "Summary generation failed, continuing without");
                        None
                    }
                }
            }
            None => None,
        };

        Ok(SuggestionSet {
            month: month.map(|m| m.to_string()),
            currency,
            recommendations_count: count,
            suggestions,
            anomalies,
            summary,
        })
    }

    /// Total expense cents per category, in first-seen category order
    fn category_expense_totals(&self, expense_rows: &[&Transaction]) -> Vec<(String, i64)> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut totals: Vec<(String, i64)> = Vec::new();
        for row in expense_rows {
            let category = self
                .engine
                .categorize(&row.merchant, &row.description)
                .category;
            match index.get(&category) {
                Some(&i) => totals[i].1 += row.amount_cents.abs(),
                None => {
                    index.insert(category.clone(), totals.len());
                    totals.push((category, row.amount_cents.abs()));
                }
            }
        }
        totals
    }
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

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::TransactionType;

    fn tx(date: &str, merchant: &str, amount_cents: i64) -> Transaction {
        Transaction {
            txn_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            merchant: merchant.to_string(),
            description: String::new(),
            amount_cents,
            currency: "USD".to_string(),
            transaction_type: TransactionType::from_amount_cents(amount_cents),
        }
    }

    fn sample_rows() -> Vec<Transaction> {
        vec![
            tx("2026-01-03", "Whole Foods", -12845),
            tx("2026-01-07", "Employer", 320000),
            tx("2026-01-09", "Netflix", -1999),
            tx("2026-01-15", "Shell", -5420),
        ]
    }

    async fn generate(
        rows: &[Transaction],
        month: Option<&str>,
        count: usize,
    ) -> Result<SuggestionSet> {
        let engine = CategorizationEngine::with_defaults();
        SuggestionGenerator::new(&engine)
            .generate(rows, month, count, None)
            .await
    }

    #[tokio::test]
    async fn test_exact_count_for_all_valid_counts() {
        for count in MIN_RECOMMENDATIONS..=MAX_RECOMMENDATIONS {
            let set = generate(&sample_rows(), Some("2026-01"), count)
                .await
                .unwrap();
            assert_eq!(set.suggestions.len(), count, "count = {}", count);
            assert_eq!(set.recommendations_count, count);
        }
    }

    #[tokio::test]
    async fn test_count_out_of_range_rejected() {
        assert!(generate(&sample_rows(), None, 2).await.is_err());
        assert!(generate(&sample_rows(), None, 8).await.is_err());
    }

    #[tokio::test]
    async fn test_no_expense_rows_rejected() {
        let rows = vec![tx("2026-01-07", "Employer", 320000)];
        let result = generate(&rows, None, 3).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_rows_rejected() {
        let result = generate(&[], None, 3).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rule_based_ranked_by_spend() {
        let set = generate(&sample_rows(), Some("2026-01"), 3).await.unwrap();
        // grocery 128.45 > transport 54.20 > subscriptions 19.99
        assert_eq!(set.suggestions[0].title, "Reduce grocery spend by 10%");
        assert_eq!(set.suggestions[0].estimated_monthly_impact, 12.85);
        assert_eq!(set.suggestions[0].source, SuggestionSource::RuleBased);
        assert_eq!(set.suggestions[1].title, "Reduce transport spend by 10%");
        assert_eq!(set.suggestions[2].title, "Reduce subscriptions spend by 10%");
    }

    #[tokio::test]
    async fn test_anomaly_suggestion_folded_in() {
        // Netflix as a 3-month recurring charge; only one spend category, so
        // the recurring audit lands right after the rule-based entry.
        let rows = vec![
            tx("2025-11-05", "Netflix", -1999),
            tx("2025-12-05", "Netflix", -1999),
            tx("2026-01-05", "Netflix", -1999),
        ];
        let set = generate(&rows, None, 3).await.unwrap();
        assert_eq!(set.suggestions[0].source, SuggestionSource::RuleBased);
        assert_eq!(set.suggestions[1].title, "Audit recurring charge: Netflix");
        assert_eq!(set.suggestions[1].estimated_monthly_impact, 19.99);
        assert_eq!(set.suggestions[1].source, SuggestionSource::Anomaly);
        assert_eq!(set.suggestions[2].source, SuggestionSource::Fallback);
    }

    #[tokio::test]
    async fn test_fallback_and_generic_padding() {
        // One expense category, no anomalies: 1 rule-based + 3 fallback ideas
        // + 3 numbered generics to reach 7.
        let rows = vec![tx("2026-01-03", "Whole Foods", -12845)];
        let set = generate(&rows, None, 7).await.unwrap();
        assert_eq!(set.suggestions.len(), 7);
        assert_eq!(set.suggestions[1].title, "Set a weekly cash-flow checkpoint");
        assert_eq!(
            set.suggestions[4].title,
            "General discretionary reduction #5"
        );
        assert_eq!(
            set.suggestions[6].title,
            "General discretionary reduction #7"
        );
    }

    #[tokio::test]
    async fn test_full_anomaly_list_returned_despite_cap() {
        let mut rows = sample_rows();
        rows.extend([
            tx("2025-11-05", "Netflix", -1999),
            tx("2025-12-05", "Netflix", -1999),
        ]);
        let set = generate(&rows, None, 3).await.unwrap();
        // The anomaly list is independent of the 3-suggestion cap
        assert!(set
            .anomalies
            .iter()
            .any(|f| matches!(f, AnomalyFinding::PossibleRecurringSubscription { .. })));
    }

    #[tokio::test]
    async fn test_idempotent_output() {
        let engine = CategorizationEngine::with_defaults();
        let generator = SuggestionGenerator::new(&engine);
        let first = generator
            .generate(&sample_rows(), Some("2026-01"), 5, None)
            .await
            .unwrap();
        let second = generator
            .generate(&sample_rows(), Some("2026-01"), 5, None)
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_summary_attached_from_backend() {
        let engine = CategorizationEngine::with_defaults();
        let client = SummaryClient::mock();
        let set = SuggestionGenerator::new(&engine)
            .generate(&sample_rows(), Some("2026-01"), 3, Some(&client))
            .await
            .unwrap();
        assert!(set.summary.is_some());
    }

    #[tokio::test]
    async fn test_summary_failure_degrades_silently() {
        let engine = CategorizationEngine::with_defaults();
        let client = SummaryClient::failing_mock();
        let set = SuggestionGenerator::new(&engine)
            .generate(&sample_rows(), Some("2026-01"), 3, Some(&client))
            .await
            .unwrap();
        assert!(set.summary.is_none());
        assert_eq!(set.suggestions.len(), 3);
    }

    #[test]
    fn test_resolve_currency_majority_wins() {
        let mut rows = sample_rows();
        for row in rows.iter_mut().take(2) {
            row.currency = "ILS".to_string();
        }
        rows.push(tx("2026-01-20", "Extra", -100));
        // USD x3, ILS x2
        assert_eq!(resolve_currency(&rows), "USD");
    }

    #[test]
    fn test_playbook_falls_back_to_other() {
        assert_eq!(playbook_steps("grocery"), playbook_steps("unknown"));
        assert_ne!(playbook_steps("subscriptions"), playbook_steps("other"));
    }
}
