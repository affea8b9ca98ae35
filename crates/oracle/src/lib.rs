//! Oracle implementations for Skillbot.
//!
//! The hosted language model is reached through an OpenAI-compatible
//! `/chat/completions` endpoint; embeddings for the knowledge store come
//! from the same API's `/embeddings` endpoint. Every production call goes
//! through the retrying wrapper, which adds the bounded timeout and
//! backoff the pipeline relies on.

pub mod chat;
pub mod embedder;
pub mod retry;

pub use chat::ChatOracle;
pub use embedder::OracleEmbedder;
pub use retry::RetryingOracle;

use std::sync::Arc;
use std::time::Duration;

use skillbot_config::AppConfig;
use skillbot_core::Oracle;

/// Build the production oracle from configuration: a chat client wrapped in
/// the retry/timeout layer.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn Oracle> {
    let api_key = config.api_key.clone().unwrap_or_default();

    let chat = ChatOracle::new(
        "openai",
        &config.oracle.base_url,
        api_key,
        &config.oracle.model,
        Duration::from_secs(config.oracle.timeout_secs),
    );

    Arc::new(RetryingOracle::new(
        Arc::new(chat),
        config.oracle.max_retries,
        Duration::from_millis(config.oracle.retry_backoff_ms),
        Duration::from_secs(config.oracle.timeout_secs),
    ))
}

/// Build the oracle-backed embedder from configuration.
pub fn build_embedder_from_config(config: &AppConfig) -> OracleEmbedder {
    let api_key = config.api_key.clone().unwrap_or_default();
    OracleEmbedder::new(
        &config.oracle.base_url,
        api_key,
        &config.oracle.embedding_model,
        Duration::from_secs(config.oracle.timeout_secs),
    )
}
