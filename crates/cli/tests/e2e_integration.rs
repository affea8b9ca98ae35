//! End-to-end integration tests for the Skillbot pipeline.
//!
//! These tests exercise the full flow from corpus ingestion through intent
//! classification, retrieval, answer composition, conversation memory, and
//! envelope rendering — with a scripted oracle and the local deterministic
//! embedder, no network required.

use std::sync::Arc;

use skillbot_core::memory::{ContextPolicy, ConversationMemory};
use skillbot_core::store::KnowledgeStore;
use skillbot_core::{ConversationId, SkillRequest};
use skillbot_delivery::render;
use skillbot_memory::FileConversationLog;
use skillbot_pipeline::testing::ScriptedOracle;
use skillbot_pipeline::{PipelineOptions, SkillPipeline};
use skillbot_store::{HashEmbedder, VectorStore};

// ── Fixtures ─────────────────────────────────────────────────────────────

const SINK_CORPUS: &str = "\
#카카오싱크
카카오싱크는 카카오 계정으로 서비스에 간편하게 가입할 수 있도록 돕는 비즈니스 솔루션입니다.

#간편가입
간편가입은 동의 한 번으로 가입을 완료하는 카카오싱크의 핵심 기능입니다.
";

const CHANNEL_CORPUS: &str = "\
#카카오톡 채널
카카오톡 채널은 비즈니스가 고객과 소통하는 공식 계정입니다.
";

fn topics() -> Vec<String> {
    vec![
        "kakao_social".into(),
        "kakao_sink".into(),
        "kakaotalk_channel".into(),
    ]
}

struct World {
    pipeline: SkillPipeline,
    store: Arc<VectorStore>,
    memory: Arc<FileConversationLog>,
    _history: tempfile::TempDir,
}

async fn world(replies: Vec<&str>) -> World {
    let store = Arc::new(VectorStore::in_memory(Arc::new(HashEmbedder::new())));

    let sink_records = skillbot_ingest::parse_records(SINK_CORPUS);
    skillbot_ingest::load_topic(store.as_ref(), "kakao_sink", &sink_records)
        .await
        .unwrap();
    let channel_records = skillbot_ingest::parse_records(CHANNEL_CORPUS);
    skillbot_ingest::load_topic(store.as_ref(), "kakaotalk_channel", &channel_records)
        .await
        .unwrap();

    let history = tempfile::tempdir().unwrap();
    let memory = Arc::new(
        FileConversationLog::new(
            history.path().to_path_buf(),
            ContextPolicy::Window { turns: 4 },
        )
        .unwrap(),
    );

    let oracle = Arc::new(ScriptedOracle::new(
        replies.into_iter().map(String::from).collect(),
    ));

    let pipeline = SkillPipeline::new(
        oracle,
        store.clone(),
        memory.clone(),
        topics(),
        PipelineOptions::default(),
    );

    World {
        pipeline,
        store,
        memory,
        _history: history,
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn sink_question_is_answered_from_the_sink_partition() {
    let world = world(vec![
        "kakao_sink",
        "카카오싱크는 카카오 계정으로 간편하게 가입하는 기능입니다.",
    ])
    .await;

    let request = SkillRequest::new("카카오싱크가 뭐예요?", "e2e-a");
    let answer = world.pipeline.handle(&request).await;

    assert!(answer.contains("간편하게 가입"));

    // The ingested partition held both sink records, nothing else.
    assert_eq!(world.store.count("kakao_sink").await.unwrap(), 2);
    assert_eq!(world.store.count("kakao_social").await.unwrap(), 0);

    // The envelope around the answer is the platform's exact schema.
    let envelope = serde_json::to_string(&render(&answer)).unwrap();
    assert!(envelope.starts_with(r#"{"version":"2.0","template":{"outputs":[{"simpleText":{"text":"#));
}

#[tokio::test]
async fn off_topic_question_takes_the_fallback_path() {
    let world = world(vec![
        "없음",
        "죄송하지만 날씨는 안내드리기 어려워요. 카카오 서비스에 대해 물어봐 주세요.",
    ])
    .await;

    let request = SkillRequest::new("오늘 날씨 어때?", "e2e-b");
    let answer = world.pipeline.handle(&request).await;

    assert!(answer.contains("죄송"));
}

#[tokio::test]
async fn follow_up_question_sees_the_windowed_history() {
    let world = world(vec![
        "kakao_sink",
        "카카오싱크는 간편가입 기능입니다.",
        "kakao_sink",
        "동의 한 번으로 가입이 완료된다는 뜻이에요.",
    ])
    .await;

    let first = SkillRequest::new("카카오싱크가 뭐예요?", "e2e-c");
    world.pipeline.handle(&first).await;

    let second = SkillRequest::new("간편가입이 무슨 뜻이야?", "e2e-c");
    let answer = world.pipeline.handle(&second).await;

    assert!(answer.contains("가입이 완료"));

    // Four turns recorded, within the window, chronological.
    let context = world
        .memory
        .context(&ConversationId::from("e2e-c"))
        .await
        .unwrap();
    let lines: Vec<&str> = context.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("user: 카카오싱크가"));
    assert!(lines[3].starts_with("assistant: 동의 한 번으로"));
}

#[tokio::test]
async fn reingesting_the_corpus_keeps_partition_counts_stable() {
    let world = world(vec![]).await;

    let records = skillbot_ingest::parse_records(SINK_CORPUS);
    skillbot_ingest::load_topic(world.store.as_ref(), "kakao_sink", &records)
        .await
        .unwrap();

    assert_eq!(world.store.count("kakao_sink").await.unwrap(), 2);
}
