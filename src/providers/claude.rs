// Claude Messages API provider

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry::with_retry;
use super::{GenerationRequest, Message, TextGenerator};

const CLAUDE_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Anthropic Messages API implementation of [`TextGenerator`].
pub struct ClaudeGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl ClaudeGenerator {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: CLAUDE_API_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Override the API base URL (used for tests against a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn to_api_request(&self, request: &GenerationRequest) -> MessagesRequest {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        MessagesRequest {
            model,
            max_tokens: request.max_tokens,
            messages: request.messages.clone(),
            system: request.system.clone(),
        }
    }

    async fn send_once(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        tracing::debug!(model = %request.model, "Sending request to Claude API");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .context("Failed to send request to Claude API")?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Claude API request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        let messages_response: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse Claude API response")?;

        Ok(messages_response)
    }
}

#[async_trait]
impl TextGenerator for ClaudeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let api_request = self.to_api_request(request);
        let response = with_retry(|| self.send_once(&api_request)).await?;
        Ok(response.text())
    }

    fn name(&self) -> &str {
        "claude"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

#[derive(Debug, Clone, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[allow(dead_code)]
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

impl MessagesResponse {
    /// Concatenated text of all text content blocks.
    fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
