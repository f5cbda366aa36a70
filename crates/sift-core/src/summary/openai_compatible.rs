//! OpenAI-compatible summary backend
//!
//! Works with any server that implements the OpenAI chat completions API.
//! One attempt per request with a short timeout; the caller absorbs failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{SummaryBackend, SummaryRequest};

/// Per-request timeout. The summary is best-effort enrichment and must not
/// stall the suggestion response.
const SUMMARY_TIMEOUT: Duration = Duration::from_secs(10);

const SYSTEM_PROMPT: &str = "You are a finance assistant. Provide concise, practical advice only.";

/// OpenAI-compatible chat completions backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAICompatibleBackend {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Create from environment variables
    ///
    /// Required: `OPENAI_API_KEY`
    /// Optional: `OPENAI_BASE_URL` (default: https://api.openai.com)
    /// Optional: `SIFT_SUMMARY_MODEL` (default: gpt-4o-mini)
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;
        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let model =
            std::env::var("SIFT_SUMMARY_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        Some(Self::new(&base_url, &model, &api_key))
    }
}

#[async_trait]
impl SummaryBackend for OpenAICompatibleBackend {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        let payload = serde_json::to_string(request)?;
        let prompt = format!(
            "Create a short executive summary (max 120 words) from this JSON. \
             Focus on top savings actions and risk signals:\n{}",
            payload
        );

        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: 0.2,
            max_tokens: 220,
        };

        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(SUMMARY_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Summary(format!(
                "Summary API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;
        let text = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::Summary("Empty summary response".into()));
        }
        Ok(trimmed.to_string())
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let backend = OpenAICompatibleBackend::new("http://localhost:8080/", "gpt-4o-mini", "key");
        assert_eq!(backend.host(), "http://localhost:8080");
        assert_eq!(backend.model(), "gpt-4o-mini");
    }
}
