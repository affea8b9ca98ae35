//! Intent classification — oracle prompt plus defensive decode.
//!
//! The oracle's reply is untrusted free text. `decode_intent` is the
//! isolated boundary that turns it into a tagged variant: only exact
//! (trimmed) equality with a configured label counts as a match; anything
//! else — empty output, the no-match sentinel, a sentence that merely
//! contains a label — is `Unmatched`.

use std::sync::Arc;
use tracing::info;

use skillbot_core::error::OracleError;
use skillbot_core::intent::Intent;
use skillbot_core::oracle::{ChatMessage, CompletionRequest, Oracle};

use crate::prompts;

/// Decode the oracle's free-text reply into an intent.
pub fn decode_intent(reply: &str, labels: &[String]) -> Intent {
    let trimmed = reply.trim();
    if labels.iter().any(|l| l == trimmed) {
        Intent::topic(trimmed)
    } else {
        Intent::Unmatched
    }
}

/// Classifies an utterance against the closed topic set via the oracle.
pub struct IntentClassifier {
    oracle: Arc<dyn Oracle>,
    labels: Vec<String>,
    temperature: f32,
}

impl IntentClassifier {
    pub fn new(oracle: Arc<dyn Oracle>, labels: Vec<String>, temperature: f32) -> Self {
        Self {
            oracle,
            labels,
            temperature,
        }
    }

    /// The configured topic labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Classify one utterance given the conversation context.
    pub async fn classify(&self, utterance: &str, context: &str) -> Result<Intent, OracleError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(prompts::SYSTEM_PROMPT),
            ChatMessage::user(prompts::intent_prompt(&self.labels, context, utterance)),
        ])
        .with_temperature(self.temperature);

        let reply = self.oracle.complete(request).await?;
        let intent = decode_intent(&reply, &self.labels);

        info!(reply = %reply.trim(), intent = ?intent.label(), "Intent classified");

        Ok(intent)
    }
}
