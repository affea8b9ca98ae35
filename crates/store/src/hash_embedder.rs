//! Deterministic local embedder — character-trigram hashing.
//!
//! Maps each text to a fixed-dimension vector by hashing its character
//! trigrams into buckets and L2-normalizing the counts. No network, no
//! model files, fully deterministic — the embedder used by tests and by
//! offline runs (`oracle.embedding_model = "local"`).
//!
//! Overlapping trigrams give related texts (shared words, shared particles)
//! higher cosine similarity than unrelated ones, which is all the ranking
//! tests and the offline mode need. It is NOT a semantic embedding.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use skillbot_core::embed::Embedder;
use skillbot_core::error::StoreError;

const DEFAULT_DIM: usize = 256;

/// Character-trigram hashing embedder.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self { dim: DEFAULT_DIM }
    }

    pub fn with_dim(dim: usize) -> Self {
        Self { dim }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        let chars: Vec<char> = text.chars().collect();

        if chars.len() < 3 {
            // Too short for trigrams: hash the whole text into one bucket.
            if !chars.is_empty() {
                vector[bucket(text, self.dim)] += 1.0;
            }
        } else {
            for window in chars.windows(3) {
                let gram: String = window.iter().collect();
                vector[bucket(&gram, self.dim)] += 1.0;
            }
        }

        // L2 normalize so cosine similarity compares direction only.
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic bucket index for a gram. `DefaultHasher::new()` uses fixed
/// keys, so the mapping is stable across runs.
fn bucket(gram: &str, dim: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    gram.hash(&mut hasher);
    (hasher.finish() as usize) % dim
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
