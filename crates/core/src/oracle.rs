//! Oracle trait — the abstraction over the hosted language model.
//!
//! The oracle is a black-box text-completion capability: it receives a
//! prompt assembled from instructions, context, and the user's question,
//! and returns free text. Its output is untrusted and must be decoded
//! defensively (see the intent decode step in the pipeline crate).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OracleError;

/// The author of a chat message sent to the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The messages making up the prompt
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature (0.0 = deterministic)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Cap on the generated reply length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.1
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: default_temperature(),
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// The core Oracle trait.
///
/// The pipeline calls `complete()` without knowing which backend serves the
/// request — a hosted API in production, a scripted mock in tests.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// A human-readable name for this oracle (e.g., "openai", "scripted").
    fn name(&self) -> &str;

    /// Send a request and get the reply text.
    async fn complete(&self, request: CompletionRequest) -> std::result::Result<String, OracleError>;
}
