//! Domain models for Sift

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a transaction, derived from the sign of the amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Neutral,
}

impl TransactionType {
    /// Derive the type from a signed amount in cents
    pub fn from_amount_cents(amount_cents: i64) -> Self {
        match amount_cents {
            c if c > 0 => Self::Income,
            c if c < 0 => Self::Expense,
            _ => Self::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Neutral => "neutral",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "neutral" => Ok(Self::Neutral),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored transaction row as returned by dataset queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub txn_date: NaiveDate,
    pub merchant: String,
    pub description: String,
    /// Negative = expense, positive = income. Exact integer count of minor
    /// currency units; no floating-point money in the core.
    pub amount_cents: i64,
    /// 3-letter currency code
    pub currency: String,
    pub transaction_type: TransactionType,
}

impl Transaction {
    /// First 7 chars of the ISO date, e.g. "2026-01"
    pub fn month(&self) -> String {
        self.txn_date.format("%Y-%m").to_string()
    }
}

/// A normalized transaction produced by CSV parsing (before DB insertion)
#[derive(Debug, Clone)]
pub struct NormalizedTransaction {
    /// Source CSV line number, diagnostic only
    pub row_number: i64,
    pub txn_date: NaiveDate,
    pub merchant: String,
    pub description: String,
    pub amount_cents: i64,
    pub currency: String,
    pub transaction_type: TransactionType,
    /// Original CSV row as JSON (for reprocessing)
    pub raw: serde_json::Value,
}

/// An ingested batch of transactions, immutable once stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub dataset_id: String,
    pub source_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub rows_ingested: i64,
    pub warnings_count: i64,
}

/// Result of ingesting a CSV payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    pub dataset_id: String,
    pub rows_ingested: usize,
    pub warnings: Vec<String>,
}

/// Severity of an anomaly finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One anomaly detector output record
///
/// Monetary fields are in major currency units rounded to 2 decimals;
/// detection itself runs on integer cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnomalyFinding {
    /// A single expense above the 95th percentile of its category
    HighTransactionWithinCategory {
        severity: Severity,
        merchant: String,
        category: String,
        date: NaiveDate,
        amount: f64,
        threshold_p95: f64,
        message: String,
    },
    /// A category whose target-month spend grew sharply vs its history
    CategoryGrowthVsHistory {
        severity: Severity,
        category: String,
        month: String,
        current_spend: f64,
        historical_average: f64,
        growth_pct: f64,
        message: String,
    },
    /// A merchant charging a near-fixed amount across several months
    PossibleRecurringSubscription {
        severity: Severity,
        merchant: String,
        months_detected: usize,
        average_monthly_amount: f64,
        message: String,
    },
    /// A calendar day whose spend towers over the month's daily average
    SingleDaySpendingSpike {
        severity: Severity,
        date: NaiveDate,
        total_spend: f64,
        monthly_daily_average: f64,
        message: String,
    },
}

impl AnomalyFinding {
    pub fn severity(&self) -> Severity {
        match self {
            Self::HighTransactionWithinCategory { severity, .. }
            | Self::CategoryGrowthVsHistory { severity, .. }
            | Self::PossibleRecurringSubscription { severity, .. }
            | Self::SingleDaySpendingSpike { severity, .. } => *severity,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::HighTransactionWithinCategory { message, .. }
            | Self::CategoryGrowthVsHistory { message, .. }
            | Self::PossibleRecurringSubscription { message, .. }
            | Self::SingleDaySpendingSpike { message, .. } => message,
        }
    }
}

/// Where a budget suggestion came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionSource {
    #[serde(rename = "rule-based")]
    RuleBased,
    #[serde(rename = "anomaly")]
    Anomaly,
    #[serde(rename = "fallback")]
    Fallback,
}

impl SuggestionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RuleBased => "rule-based",
            Self::Anomaly => "anomaly",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for SuggestionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ranked budgeting suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSuggestion {
    pub title: String,
    pub category: String,
    /// Major currency units
    pub estimated_monthly_impact: f64,
    pub action_steps: Vec<String>,
    pub reason: String,
    pub source: SuggestionSource,
}

/// Output of the suggestion generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionSet {
    pub month: Option<String>,
    pub currency: String,
    pub recommendations_count: usize,
    /// Exactly `recommendations_count` entries, in rank order
    pub suggestions: Vec<BudgetSuggestion>,
    /// The full anomaly list, independent of the suggestion cap
    pub anomalies: Vec<AnomalyFinding>,
    /// LLM executive summary; absent whenever generation is disabled or fails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Expense total for one category (major units)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

/// Monthly aggregate report for a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub dataset_id: String,
    pub month: Option<String>,
    pub rows_analyzed: usize,
    pub currency: String,
    pub total_spent: f64,
    pub total_income: f64,
    pub net_balance: f64,
    pub category_breakdown: Vec<CategoryTotal>,
    pub markdown_report: String,
}

/// Spend ranking entry for one merchant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantSummary {
    pub merchant: String,
    pub currency: String,
    pub total_spend: f64,
    pub transactions_count: i64,
}

/// Top merchants report for a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopMerchantsReport {
    pub dataset_id: String,
    pub month: Option<String>,
    pub currency: String,
    pub top_merchants: Vec<MerchantSummary>,
}
