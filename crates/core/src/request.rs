//! Skill request and conversation domain types.
//!
//! These are the core value objects that flow through the system:
//! the platform POSTs a skill request → the pipeline classifies and answers
//! → the turn is appended to the conversation's history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation.
///
/// Supplied by the messaging platform with each request; conversations with
/// different identifiers are fully independent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a turn's author within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The chatbot
    Assistant,
}

impl Role {
    /// The label used when rendering context blobs (`user: ...`).
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One recorded turn of a conversation. Never mutated after append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who said it
    pub role: Role,

    /// The text content
    pub text: String,

    /// When the turn was recorded
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Create a new user turn stamped now.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new assistant turn stamped now.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An inbound skill request from the messaging platform.
///
/// Wire field names follow the platform's camelCase convention.
/// Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRequest {
    /// Raw user utterance
    pub utterance: String,

    /// Originating conversation identifier
    #[serde(rename = "conversationId")]
    pub conversation_id: ConversationId,

    /// Optional async callback address; when present, the answer is also
    /// POSTed to this URL after the minimum delivery delay.
    #[serde(
        rename = "callbackAddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub callback_address: Option<String>,
}

impl SkillRequest {
    pub fn new(utterance: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self {
            utterance: utterance.into(),
            conversation_id: ConversationId(conversation_id.into()),
            callback_address: None,
        }
    }

    pub fn with_callback(mut self, address: impl Into<String>) -> Self {
        self.callback_address = Some(address.into());
        self
    }
}
