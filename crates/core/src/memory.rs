//! Conversation memory trait — durable, append-only per-conversation history.
//!
//! Append is the only mutation. Context rendering applies the configured
//! policy: the full history, or a bounded window of the most recent turns
//! (oldest-first within the window).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;
use crate::request::{ConversationId, Role};

/// How much history goes into the context blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ContextPolicy {
    /// Concatenate every turn ever recorded.
    Full,
    /// Concatenate only the most recent `turns` turns.
    Window { turns: usize },
}

impl Default for ContextPolicy {
    fn default() -> Self {
        Self::Window { turns: 6 }
    }
}

/// The core ConversationMemory trait.
///
/// Appends to the SAME conversation are serialized by the implementation;
/// different conversations never block each other.
#[async_trait]
pub trait ConversationMemory: Send + Sync {
    /// The backend name (e.g., "file").
    fn name(&self) -> &str;

    /// Append one turn to the conversation's history.
    async fn append(
        &self,
        conversation: &ConversationId,
        role: Role,
        text: &str,
    ) -> std::result::Result<(), MemoryError>;

    /// Render the conversation's prior turns as a context blob, one
    /// `role: text` line per turn, chronological order, policy applied.
    async fn context(
        &self,
        conversation: &ConversationId,
    ) -> std::result::Result<String, MemoryError>;
}
