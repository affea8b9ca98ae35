//! Document records — the unit of ingested reference text.

use serde::{Deserialize, Serialize};

/// A (title, description) pair sourced from a topic's reference corpus.
///
/// Created once during ingestion and immutable afterward. The identity key
/// is derived deterministically from the title, so re-ingesting the same
/// title overwrites the stored record instead of duplicating it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub title: String,
    pub description: String,
}

impl DocumentRecord {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Identity key: the title with whitespace runs collapsed to `-`.
    ///
    /// Unique within a topic partition.
    pub fn id(&self) -> String {
        self.title.split_whitespace().collect::<Vec<_>>().join("-")
    }

    /// The passage text stored and retrieved for this record.
    pub fn passage(&self) -> String {
        format!("{} : {}", self.title.trim(), self.description.trim())
    }
}
