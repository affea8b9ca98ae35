//! Knowledge store trait — per-topic similarity search over reference text.
//!
//! Each topic owns an isolated partition. Records are keyed by an identity
//! derived from their title; storing under an existing id overwrites.
//! Querying an empty or unknown partition returns an empty sequence, not a
//! fault.

use async_trait::async_trait;

use crate::error::StoreError;

/// The core KnowledgeStore trait.
///
/// Implementations: file-persisted vector store (production and tests).
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// The store name (e.g., "vector").
    fn name(&self) -> &str;

    /// Store or overwrite one record in the topic's partition.
    async fn upsert(
        &self,
        topic: &str,
        id: &str,
        text: &str,
    ) -> std::result::Result<(), StoreError>;

    /// Return up to `k` passage texts from the topic's partition, ranked by
    /// descending similarity to the query text.
    async fn query(
        &self,
        topic: &str,
        text: &str,
        k: usize,
    ) -> std::result::Result<Vec<String>, StoreError>;

    /// Number of records in the topic's partition (0 for unknown topics).
    async fn count(&self, topic: &str) -> std::result::Result<usize, StoreError>;
}
