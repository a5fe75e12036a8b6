// Text generation capability
//
// The critique loop only needs one thing from a model provider: given an
// optional system instruction and a conversation, produce a completion.
// Everything else (transport, authentication, retries) lives behind this
// trait so the loop can be driven by the real Claude API or by stubs in
// tests.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod claude;
pub mod retry;

pub use claude::ClaudeGenerator;

/// A single conversation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A provider-agnostic generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub messages: Vec<Message>,

    /// Model name; empty means the provider's default.
    pub model: String,

    pub max_tokens: u32,

    /// System instruction (sent as `system` for Claude).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

impl GenerationRequest {
    /// Create a request from messages
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: String::new(),
            max_tokens: 2048,
            system: None,
        }
    }

    /// Set the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the system instruction
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Trait for text generation providers.
///
/// Implementations must be safe for concurrent shared use: the critique
/// loop issues many overlapping calls against one instance.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Provider name (e.g., "claude").
    fn name(&self) -> &str;

    /// Default model used when a request leaves the model empty.
    fn default_model(&self) -> &str;
}
