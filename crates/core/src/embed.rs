//! Embedder trait — text to vector for similarity search.
//!
//! The embedding mechanism is a pluggable capability: the knowledge store
//! only needs something that turns text into comparable vectors. Production
//! uses the oracle's embeddings endpoint; tests and offline runs use a
//! deterministic local embedder.

use async_trait::async_trait;

use crate::error::StoreError;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// The embedder name (e.g., "oracle", "hash").
    fn name(&self) -> &str;

    /// Embed the given texts, one vector per input, all of equal dimension.
    async fn embed(&self, texts: &[String]) -> std::result::Result<Vec<Vec<f32>>, StoreError>;
}
