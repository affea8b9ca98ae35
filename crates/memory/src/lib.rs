//! Conversation memory implementation for Skillbot.
//!
//! One append-only JSONL history file per conversation under the history
//! directory. Appends to the same conversation are serialized by a
//! per-conversation mutex; different conversations never block each other.

pub mod file_log;

pub use file_log::FileConversationLog;
