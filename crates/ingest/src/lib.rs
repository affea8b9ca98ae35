//! Reference corpus ingestion.
//!
//! Corpora are flat text files: a line starting with `#` opens a new record
//! and carries its title; the following lines up to the next `#` line are
//! concatenated into the description. Records with no description are
//! skipped. Only `.txt` files are supported — anything else is an error for
//! that file, raised before any of its records touch the store.

use std::path::Path;
use tracing::info;

use skillbot_config::TopicConfig;
use skillbot_core::error::{Error, IngestError};
use skillbot_core::store::KnowledgeStore;
use skillbot_core::DocumentRecord;

/// Parse one corpus file into document records.
pub fn parse_corpus(path: &Path) -> Result<Vec<DocumentRecord>, IngestError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if extension != "txt" {
        return Err(IngestError::UnsupportedFileType(extension.to_string()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| IngestError::Io {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;

    Ok(parse_records(&content))
}

/// Parse record text: `#`-delimited, title first, description concatenated.
pub fn parse_records(content: &str) -> Vec<DocumentRecord> {
    let mut records = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines() {
        if let Some(title_line) = line.strip_prefix('#') {
            push_record(&mut records, &current);
            current = vec![title_line];
        } else {
            current.push(line);
        }
    }
    push_record(&mut records, &current);

    records
}

fn push_record(records: &mut Vec<DocumentRecord>, lines: &[&str]) {
    let non_empty: Vec<&str> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    // A record needs a title and at least one description line.
    if non_empty.len() <= 1 {
        return;
    }

    records.push(DocumentRecord::new(non_empty[0], non_empty[1..].concat()));
}

/// Upsert parsed records into one topic's partition. Returns the number of
/// records loaded. Identity comes from the title, so reloading the same
/// corpus overwrites in place.
pub async fn load_topic(
    store: &dyn KnowledgeStore,
    topic: &str,
    records: &[DocumentRecord],
) -> Result<usize, Error> {
    for record in records {
        store
            .upsert(topic, &record.id(), &record.passage())
            .await?;
    }
    Ok(records.len())
}

/// Load every configured topic's corpus into the store.
///
/// A format error is fatal for that file only and is raised immediately;
/// topics already loaded remain intact.
pub async fn load_all(store: &dyn KnowledgeStore, topics: &[TopicConfig]) -> Result<(), Error> {
    for topic in topics {
        info!(topic = %topic.label, corpus = %topic.corpus.display(), "Ingesting corpus");
        let records = parse_corpus(&topic.corpus)?;
        let loaded = load_topic(store, &topic.label, &records).await?;
        info!(topic = %topic.label, records = loaded, "Corpus ingested");
    }
    Ok(())
}
