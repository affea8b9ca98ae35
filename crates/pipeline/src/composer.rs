//! Answer composition — grounded answers and the fallback path.

use std::sync::Arc;
use tracing::debug;

use skillbot_core::error::OracleError;
use skillbot_core::oracle::{ChatMessage, CompletionRequest, Oracle};

use crate::prompts;

/// Composes the final answer text via the oracle.
pub struct AnswerComposer {
    oracle: Arc<dyn Oracle>,
    temperature: f32,
    max_tokens: u32,
}

impl AnswerComposer {
    pub fn new(oracle: Arc<dyn Oracle>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            oracle,
            temperature,
            max_tokens,
        }
    }

    /// Compose a grounded answer from the retrieved passages, the question,
    /// and the conversation context. An empty passage set is passed through
    /// unmodified; the prompt asks the oracle to degrade gracefully.
    pub async fn compose(
        &self,
        passages: &[String],
        question: &str,
        context: &str,
    ) -> Result<String, OracleError> {
        debug!(passages = passages.len(), "Composing grounded answer");

        let request = CompletionRequest::new(vec![
            ChatMessage::system(prompts::SYSTEM_PROMPT),
            ChatMessage::user(prompts::guide_prompt(passages, question, context)),
        ])
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens);

        self.oracle.complete(request).await
    }

    /// Compose the polite cannot-help reply for unmatched intents. No
    /// retrieved passages are referenced.
    pub async fn compose_fallback(&self, question: &str) -> Result<String, OracleError> {
        debug!("Composing fallback answer");

        let request = CompletionRequest::new(vec![
            ChatMessage::system(prompts::SYSTEM_PROMPT),
            ChatMessage::user(prompts::fallback_prompt(question)),
        ])
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens);

        self.oracle.complete(request).await
    }
}
