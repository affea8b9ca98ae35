//! Error types for the Skillbot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Skillbot operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Oracle errors ---
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    // --- Knowledge store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Conversation memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Ingestion errors ---
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    // --- Delivery errors ---
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors from the hosted language model.
///
/// Every variant is recoverable: the pipeline retries with backoff and,
/// after exhaustion, answers with a generic apology instead of failing
/// the request.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by oracle, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Oracle not configured: {0}")]
    NotConfigured(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("History read failed for conversation {conversation}: {reason}")]
    ReadFailed {
        conversation: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Not supported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Malformed record in {file}: {reason}")]
    MalformedRecord { file: String, reason: String },

    #[error("Failed to read corpus file {file}: {reason}")]
    Io { file: String, reason: String },
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Callback POST to {url} failed: {reason}")]
    CallbackFailed { url: String, reason: String },

    #[error("Callback returned status {status} from {url}")]
    CallbackRejected { url: String, status: u16 },
}
