//! Pluggable summary-generation backends
//!
//! The suggestion pipeline can optionally ask an external text-generation
//! service for a short executive summary of its output. This module keeps the
//! core free of any direct service dependency: the `SummaryBackend` trait
//! defines the interface, `SummaryClient` provides concrete dispatch, and the
//! call site treats every failure as "no summary".
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_API_KEY`: API key (required; no key means no summary client)
//! - `OPENAI_BASE_URL`: Server URL (default: https://api.openai.com)
//! - `SIFT_SUMMARY_MODEL`: Model name (default: gpt-4o-mini)

mod mock;
mod openai_compatible;

pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::models::{AnomalyFinding, BudgetSuggestion};

/// Maximum number of anomalies forwarded to the summary service
const MAX_SUMMARY_ANOMALIES: usize = 10;

/// Payload sent to the summary service
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRequest {
    pub month: String,
    pub currency: String,
    pub suggestions: Vec<BudgetSuggestion>,
    pub anomalies: Vec<AnomalyFinding>,
}

impl SummaryRequest {
    pub fn new(
        month: Option<&str>,
        currency: &str,
        suggestions: &[BudgetSuggestion],
        anomalies: &[AnomalyFinding],
    ) -> Self {
        Self {
            month: month.unwrap_or("all").to_string(),
            currency: currency.to_string(),
            suggestions: suggestions.to_vec(),
            anomalies: anomalies
                .iter()
                .take(MAX_SUMMARY_ANOMALIES)
                .cloned()
                .collect(),
        }
    }
}

/// Trait defining the interface for summary backends
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    /// Generate a short executive summary for the payload
    async fn summarize(&self, request: &SummaryRequest) -> Result<String>;

    /// Model name (for logging)
    fn model(&self) -> &str;

    /// Host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete summary client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum SummaryClient {
    /// Any server implementing the OpenAI chat completions API
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl SummaryClient {
    /// Create a summary client from environment variables
    ///
    /// Returns None when `OPENAI_API_KEY` is not set; callers then skip
    /// summary generation entirely.
    pub fn from_env() -> Option<Self> {
        OpenAICompatibleBackend::from_env().map(SummaryClient::OpenAICompatible)
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        SummaryClient::Mock(MockBackend::new())
    }

    /// Create a mock backend whose calls always fail (for testing the
    /// degrade-to-no-summary path)
    pub fn failing_mock() -> Self {
        SummaryClient::Mock(MockBackend::failing())
    }
}

#[async_trait]
impl SummaryBackend for SummaryClient {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        match self {
            SummaryClient::OpenAICompatible(b) => b.summarize(request).await,
            SummaryClient::Mock(b) => b.summarize(request).await,
        }
    }

    fn model(&self) -> &str {
        match self {
            SummaryClient::OpenAICompatible(b) => b.model(),
            SummaryClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            SummaryClient::OpenAICompatible(b) => b.host(),
            SummaryClient::Mock(b) => b.host(),
        }
    }
}
