//! Oracle-backed embedder for the knowledge store.

use async_trait::async_trait;
use std::time::Duration;

use skillbot_core::embed::Embedder;
use skillbot_core::error::StoreError;

use crate::chat::ChatOracle;

/// Embeds text via the hosted API's `/embeddings` endpoint.
pub struct OracleEmbedder {
    oracle: ChatOracle,
    model: String,
}

impl OracleEmbedder {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let model = model.into();
        Self {
            oracle: ChatOracle::new("oracle-embedder", base_url, api_key, &model, timeout),
            model,
        }
    }
}

#[async_trait]
impl Embedder for OracleEmbedder {
    fn name(&self) -> &str {
        "oracle"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        self.oracle
            .embed_texts(&self.model, texts)
            .await
            .map_err(|e| StoreError::EmbeddingFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_input_short_circuits() {
        let embedder = OracleEmbedder::new(
            "https://api.openai.com/v1",
            "sk-test",
            "text-embedding-3-small",
            Duration::from_secs(5),
        );
        // No network call is made for an empty batch.
        let vectors = embedder.embed(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[test]
    fn embedder_name() {
        let embedder = OracleEmbedder::new(
            "https://api.openai.com/v1",
            "sk-test",
            "text-embedding-3-small",
            Duration::from_secs(5),
        );
        assert_eq!(embedder.name(), "oracle");
    }
}
