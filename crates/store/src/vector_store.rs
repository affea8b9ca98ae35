//! The topic-partitioned vector store.
//!
//! Each topic owns an isolated partition held in memory and persisted as a
//! JSONL file (one JSON document per line) under the store directory.
//! Partitions are loaded on open and flushed on every mutation — fast reads
//! with durable writes. Writes only happen during ingestion; request-time
//! traffic is read-mostly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use skillbot_core::embed::Embedder;
use skillbot_core::error::StoreError;
use skillbot_core::store::KnowledgeStore;

use crate::similarity::cosine_similarity;

/// One stored record: passage text plus its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredDocument {
    id: String,
    text: String,
    embedding: Vec<f32>,
}

/// Topic-partitioned similarity-search store.
pub struct VectorStore {
    embedder: Arc<dyn Embedder>,
    data_dir: Option<PathBuf>,
    partitions: RwLock<HashMap<String, Vec<StoredDocument>>>,
}

impl VectorStore {
    /// Create a purely in-memory store (tests, ephemeral runs).
    pub fn in_memory(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            data_dir: None,
            partitions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a store rooted at `data_dir`, loading any existing partition
    /// files (`<topic>.jsonl`).
    pub fn open(embedder: Arc<dyn Embedder>, data_dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| StoreError::Storage(format!("Failed to create store directory: {e}")))?;

        let mut partitions = HashMap::new();
        let entries = std::fs::read_dir(&data_dir)
            .map_err(|e| StoreError::Storage(format!("Failed to read store directory: {e}")))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
                continue;
            }
            let Some(topic) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let docs = Self::load_partition(&path);
            debug!(topic = %topic, count = docs.len(), "Partition loaded");
            partitions.insert(topic.to_string(), docs);
        }

        Ok(Self {
            embedder,
            data_dir: Some(data_dir),
            partitions: RwLock::new(partitions),
        })
    }

    /// Load one partition file, skipping corrupted lines.
    fn load_partition(path: &PathBuf) -> Vec<StoredDocument> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<StoredDocument>(line) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted store record");
                    None
                }
            })
            .collect()
    }

    /// Flush one partition to its JSONL file. No-op for in-memory stores.
    fn flush_partition(&self, topic: &str, docs: &[StoredDocument]) -> Result<(), StoreError> {
        let Some(dir) = &self.data_dir else {
            return Ok(());
        };

        let mut content = String::new();
        for doc in docs {
            let line = serde_json::to_string(doc)
                .map_err(|e| StoreError::Storage(format!("Failed to serialize record: {e}")))?;
            content.push_str(&line);
            content.push('\n');
        }

        let path = dir.join(format!("{}.jsonl", sanitize(topic)));
        std::fs::write(&path, &content)
            .map_err(|e| StoreError::Storage(format!("Failed to write partition file: {e}")))?;

        Ok(())
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        let texts = [text.to_string()];
        let mut vectors = self.embedder.embed(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| StoreError::EmbeddingFailed("Embedder returned no vector".into()))
    }
}

/// Partition file names come from topic labels; keep them filesystem-safe.
fn sanitize(topic: &str) -> String {
    topic
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl KnowledgeStore for VectorStore {
    fn name(&self) -> &str {
        "vector"
    }

    async fn upsert(&self, topic: &str, id: &str, text: &str) -> Result<(), StoreError> {
        let embedding = self.embed_one(text).await?;

        let mut partitions = self.partitions.write().await;
        let docs = partitions.entry(topic.to_string()).or_default();

        let doc = StoredDocument {
            id: id.to_string(),
            text: text.to_string(),
            embedding,
        };

        // Overwrite-on-same-id: identity is unique within the partition.
        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => *existing = doc,
            None => docs.push(doc),
        }

        self.flush_partition(topic, docs)
    }

    async fn query(&self, topic: &str, text: &str, k: usize) -> Result<Vec<String>, StoreError> {
        {
            let partitions = self.partitions.read().await;
            match partitions.get(topic) {
                // Unknown or empty partition is not a fault.
                None => return Ok(Vec::new()),
                Some(docs) if docs.is_empty() => return Ok(Vec::new()),
                Some(_) if k == 0 => return Ok(Vec::new()),
                Some(_) => {}
            }
        }

        // Embedding may be a network call; the lock is not held across it.
        let query_embedding = self.embed_one(text).await?;

        let partitions = self.partitions.read().await;
        let Some(docs) = partitions.get(topic) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(f32, &StoredDocument)> = docs
            .iter()
            .map(|d| (cosine_similarity(&d.embedding, &query_embedding), d))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        debug!(topic = %topic, results = scored.len(), "Similarity query served");

        Ok(scored.into_iter().map(|(_, d)| d.text.clone()).collect())
    }

    async fn count(&self, topic: &str) -> Result<usize, StoreError> {
        let partitions = self.partitions.read().await;
        Ok(partitions.get(topic).map_or(0, |docs| docs.len()))
    }
}
