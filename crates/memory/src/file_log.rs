//! File-backed conversation log — durable JSONL per conversation.
//!
//! Each line is one JSON-encoded turn. Append is the only mutation; there is
//! no edit and no delete. The bounded-window policy prunes at read time
//! only — the log itself keeps everything.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use skillbot_core::error::MemoryError;
use skillbot_core::memory::{ContextPolicy, ConversationMemory};
use skillbot_core::request::{ConversationId, ConversationTurn, Role};

/// Append-only conversation history, one JSONL file per conversation.
pub struct FileConversationLog {
    history_dir: PathBuf,
    policy: ContextPolicy,
    /// Per-conversation locks. Appends and reads for the SAME conversation
    /// are serialized; different conversations proceed independently.
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl FileConversationLog {
    /// Create a log rooted at `history_dir` with the given context policy.
    pub fn new(history_dir: PathBuf, policy: ContextPolicy) -> Result<Self, MemoryError> {
        std::fs::create_dir_all(&history_dir).map_err(|e| {
            MemoryError::Storage(format!("Failed to create history directory: {e}"))
        })?;

        Ok(Self {
            history_dir,
            policy,
            locks: RwLock::new(HashMap::new()),
        })
    }

    fn file_path(&self, conversation: &ConversationId) -> PathBuf {
        self.history_dir
            .join(format!("{}.jsonl", sanitize(&conversation.0)))
    }

    /// Get or create the lock guarding one conversation's file.
    async fn lock_for(&self, conversation: &ConversationId) -> Arc<Mutex<()>> {
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(&conversation.0) {
                return lock.clone();
            }
        }

        let mut locks = self.locks.write().await;
        locks
            .entry(conversation.0.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Load all turns from a conversation's file, skipping corrupted lines.
    fn load_turns(path: &PathBuf) -> Vec<ConversationTurn> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(), // no history yet
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<ConversationTurn>(line) {
                Ok(turn) => Some(turn),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted history line");
                    None
                }
            })
            .collect()
    }

    /// Render turns as the context blob: `role: text` lines, chronological,
    /// policy applied.
    fn render(&self, turns: &[ConversationTurn]) -> String {
        let window: &[ConversationTurn] = match self.policy {
            ContextPolicy::Full => turns,
            ContextPolicy::Window { turns: n } => {
                let start = turns.len().saturating_sub(n);
                &turns[start..]
            }
        };

        window
            .iter()
            .map(|t| format!("{}: {}", t.role.label(), t.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// History file names come from platform-supplied conversation ids; keep
/// them filesystem-safe.
fn sanitize(id: &str) -> String {
    id.chars()
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
impl ConversationMemory for FileConversationLog {
    fn name(&self) -> &str {
        "file"
    }

    async fn append(
        &self,
        conversation: &ConversationId,
        role: Role,
        text: &str,
    ) -> Result<(), MemoryError> {
        let lock = self.lock_for(conversation).await;
        let _guard = lock.lock().await;

        let turn = match role {
            Role::User => ConversationTurn::user(text),
            Role::Assistant => ConversationTurn::assistant(text),
        };

        let line = serde_json::to_string(&turn)
            .map_err(|e| MemoryError::Storage(format!("Failed to serialize turn: {e}")))?;

        let path = self.file_path(conversation);
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| MemoryError::Storage(format!("Failed to open history file: {e}")))?;

        writeln!(file, "{line}")
            .map_err(|e| MemoryError::Storage(format!("Failed to append turn: {e}")))?;

        Ok(())
    }

    async fn context(&self, conversation: &ConversationId) -> Result<String, MemoryError> {
        let lock = self.lock_for(conversation).await;
        let _guard = lock.lock().await;

        let turns = Self::load_turns(&self.file_path(conversation));
        Ok(self.render(&turns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_log(policy: ContextPolicy) -> (FileConversationLog, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let log = FileConversationLog::new(dir.path().to_path_buf(), policy).unwrap();
        (log, dir)
    }

    #[tokio::test]
    async fn append_and_render_full_history() {
        let (log, _dir) = test_log(ContextPolicy::Full);
        let conv = ConversationId::from("conv-1");

        log.append(&conv, Role::User, "카카오싱크가 뭐예요?").await.unwrap();
        log.append(&conv, Role::Assistant, "간편가입 기능입니다.").await.unwrap();

        let context = log.context(&conv).await.unwrap();
        assert_eq!(
            context,
            "user: 카카오싱크가 뭐예요?\nassistant: 간편가입 기능입니다."
        );
    }

    #[tokio::test]
    async fn empty_conversation_renders_empty_context() {
        let (log, _dir) = test_log(ContextPolicy::Full);
        let context = log.context(&ConversationId::from("nobody")).await.unwrap();
        assert!(context.is_empty());
    }

    #[tokio::test]
    async fn window_keeps_most_recent_turns_oldest_first() {
        let (log, _dir) = test_log(ContextPolicy::Window { turns: 2 });
        let conv = ConversationId::from("conv-w");

        log.append(&conv, Role::User, "첫 번째").await.unwrap();
        log.append(&conv, Role::Assistant, "두 번째").await.unwrap();
        log.append(&conv, Role::User, "세 번째").await.unwrap();

        let context = log.context(&conv).await.unwrap();
        // Exactly min(N, turns) = 2 most recent turns, oldest first.
        assert_eq!(context, "assistant: 두 번째\nuser: 세 번째");
    }

    #[tokio::test]
    async fn window_larger_than_history_keeps_everything() {
        let (log, _dir) = test_log(ContextPolicy::Window { turns: 10 });
        let conv = ConversationId::from("conv-s");

        log.append(&conv, Role::User, "안녕하세요").await.unwrap();

        let context = log.context(&conv).await.unwrap();
        assert_eq!(context, "user: 안녕하세요");
    }

    #[tokio::test]
    async fn conversations_are_independent() {
        let (log, _dir) = test_log(ContextPolicy::Full);
        let a = ConversationId::from("conv-a");
        let b = ConversationId::from("conv-b");

        log.append(&a, Role::User, "A의 질문").await.unwrap();
        log.append(&b, Role::User, "B의 질문").await.unwrap();
        log.append(&a, Role::Assistant, "A의 답변").await.unwrap();

        let context_b = log.context(&b).await.unwrap();
        assert_eq!(context_b, "user: B의 질문");
        assert!(!context_b.contains("A의"));
    }

    #[tokio::test]
    async fn history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let conv = ConversationId::from("conv-p");

        {
            let log =
                FileConversationLog::new(dir.path().to_path_buf(), ContextPolicy::Full).unwrap();
            log.append(&conv, Role::User, "지속되는 질문").await.unwrap();
        }

        let reopened =
            FileConversationLog::new(dir.path().to_path_buf(), ContextPolicy::Full).unwrap();
        let context = reopened.context(&conv).await.unwrap();
        assert_eq!(context, "user: 지속되는 질문");
    }

    #[tokio::test]
    async fn corrupted_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let conv = ConversationId::from("conv-c");
        let log = FileConversationLog::new(dir.path().to_path_buf(), ContextPolicy::Full).unwrap();

        log.append(&conv, Role::User, "유효한 턴").await.unwrap();

        // Inject a corrupted line directly into the file.
        let path = dir.path().join("conv-c.jsonl");
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json at all").unwrap();

        let context = log.context(&conv).await.unwrap();
        assert_eq!(context, "user: 유효한 턴");
    }

    #[tokio::test]
    async fn concurrent_appends_to_same_conversation_all_land() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(
            FileConversationLog::new(dir.path().to_path_buf(), ContextPolicy::Full).unwrap(),
        );
        let conv = ConversationId::from("conv-busy");

        let mut handles = Vec::new();
        for i in 0..20 {
            let log = log.clone();
            let conv = conv.clone();
            handles.push(tokio::spawn(async move {
                log.append(&conv, Role::User, &format!("메시지 {i}")).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let context = log.context(&conv).await.unwrap();
        assert_eq!(context.lines().count(), 20);
    }

    #[test]
    fn sanitize_handles_platform_ids() {
        assert_eq!(sanitize("user:12/34"), "user_12_34");
        assert_eq!(sanitize("conv-ok_1.2"), "conv-ok_1.2");
    }
}
