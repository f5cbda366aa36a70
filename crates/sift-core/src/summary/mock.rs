//! Mock summary backend for testing

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::{SummaryBackend, SummaryRequest};

/// Deterministic in-process backend; never touches the network
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    fail: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self { fail: false }
    }

    /// A mock whose calls always fail, for exercising the silent-degrade path
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl SummaryBackend for MockBackend {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        if self.fail {
            return Err(Error::Summary("mock failure".into()));
        }
        Ok(format!(
            "Mock summary for {}: {} suggestions, {} anomalies.",
            request.month,
            request.suggestions.len(),
            request.anomalies.len()
        ))
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
