//! The request orchestrator.
//!
//! Holds the explicitly constructed handles (oracle-backed classifier and
//! composer, knowledge store, conversation memory) and drives one request
//! through the sequential flow. There are no process-global handles; the
//! pipeline is built once at startup and shared via `Arc`.

use std::sync::Arc;
use tracing::{error, info, warn};

use skillbot_core::intent::Intent;
use skillbot_core::memory::ConversationMemory;
use skillbot_core::oracle::Oracle;
use skillbot_core::request::{Role, SkillRequest};
use skillbot_core::store::KnowledgeStore;

use crate::composer::AnswerComposer;
use crate::intent::IntentClassifier;
use crate::prompts;

/// Tuning knobs carried from configuration.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Sampling temperature for both oracle calls
    pub temperature: f32,
    /// Reply length cap for answer composition
    pub max_tokens: u32,
    /// Passages retrieved per query
    pub top_k: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 1024,
            top_k: 3,
        }
    }
}

/// The intent-routing + retrieval-augmented-answer pipeline.
pub struct SkillPipeline {
    classifier: IntentClassifier,
    composer: AnswerComposer,
    store: Arc<dyn KnowledgeStore>,
    memory: Arc<dyn ConversationMemory>,
    top_k: usize,
}

impl SkillPipeline {
    /// Build the pipeline from its collaborators.
    pub fn new(
        oracle: Arc<dyn Oracle>,
        store: Arc<dyn KnowledgeStore>,
        memory: Arc<dyn ConversationMemory>,
        topics: Vec<String>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(oracle.clone(), topics, options.temperature),
            composer: AnswerComposer::new(oracle, options.temperature, options.max_tokens),
            store,
            memory,
            top_k: options.top_k,
        }
    }

    /// Handle one request and return the answer text.
    ///
    /// Infallible by design: every failure path degrades to some text
    /// (grounded answer, fallback reply, or the generic apology) so the
    /// user is never left without a response.
    pub async fn handle(&self, request: &SkillRequest) -> String {
        let conversation = &request.conversation_id;
        let utterance = &request.utterance;

        let context = match self.memory.context(conversation).await {
            Ok(context) => context,
            Err(e) => {
                warn!(conversation = %conversation, error = %e, "Context load failed, proceeding without history");
                String::new()
            }
        };

        let intent = match self.classifier.classify(utterance, &context).await {
            Ok(intent) => intent,
            Err(e) => {
                error!(error = %e, "Intent classification failed after retries");
                self.record_turn(request, prompts::APOLOGY).await;
                return prompts::APOLOGY.to_string();
            }
        };

        let answer = match &intent {
            Intent::Topic { label } => {
                let passages = match self.store.query(label, utterance, self.top_k).await {
                    Ok(passages) => passages,
                    Err(e) => {
                        warn!(topic = %label, error = %e, "Retrieval failed, composing without passages");
                        Vec::new()
                    }
                };

                info!(topic = %label, passages = passages.len(), "Composing grounded answer");

                match self.composer.compose(&passages, utterance, &context).await {
                    Ok(answer) => answer,
                    Err(e) => {
                        error!(error = %e, "Answer composition failed after retries");
                        prompts::APOLOGY.to_string()
                    }
                }
            }
            Intent::Unmatched => {
                info!("No topic matched, taking fallback path");

                match self.composer.compose_fallback(utterance).await {
                    Ok(answer) => answer,
                    Err(e) => {
                        error!(error = %e, "Fallback composition failed after retries");
                        prompts::APOLOGY.to_string()
                    }
                }
            }
        };

        self.record_turn(request, &answer).await;
        answer
    }

    /// Append the user utterance and the assistant answer to memory.
    /// Memory failures are logged, not surfaced — the answer still ships.
    async fn record_turn(&self, request: &SkillRequest, answer: &str) {
        let conversation = &request.conversation_id;

        if let Err(e) = self
            .memory
            .append(conversation, Role::User, &request.utterance)
            .await
        {
            warn!(conversation = %conversation, error = %e, "Failed to append user turn");
        }

        if let Err(e) = self.memory.append(conversation, Role::Assistant, answer).await {
            warn!(conversation = %conversation, error = %e, "Failed to append assistant turn");
        }
    }
}
