//! HTTP skill endpoint for Skillbot.
//!
//! Exposes the platform-facing skill route and a health check.
//! Built on Axum; request tracing via tower-http.
//!
//! The handler never leaves a request unanswered: pipeline failures degrade
//! to the generic apology inside the pipeline, and the response body always
//! carries a well-formed envelope.

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use skillbot_config::AppConfig;
use skillbot_core::{Embedder, KnowledgeStore, SkillRequest};
use skillbot_delivery::{DeliveryAdapter, Envelope, render};
use skillbot_memory::FileConversationLog;
use skillbot_pipeline::{PipelineOptions, SkillPipeline};
use skillbot_store::{HashEmbedder, VectorStore};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub pipeline: Arc<SkillPipeline>,
    pub delivery: Arc<DeliveryAdapter>,
    pub store: Arc<dyn KnowledgeStore>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/skill", post(skill_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the full application state from configuration.
///
/// All handles are constructed here, once, and shared via `Arc` — there are
/// no process-global stores or connections.
pub fn build_state(config: &AppConfig) -> Result<SharedState, Box<dyn std::error::Error>> {
    let oracle = skillbot_oracle::build_from_config(config);

    let embedder: Arc<dyn Embedder> =
        if config.oracle.embedding_model == "local" || !config.has_api_key() {
            info!("Using the local deterministic embedder");
            Arc::new(HashEmbedder::new())
        } else {
            Arc::new(skillbot_oracle::build_embedder_from_config(config))
        };

    let store = Arc::new(VectorStore::open(embedder, config.store.data_dir.clone())?);

    let memory = Arc::new(FileConversationLog::new(
        config.memory.history_dir.clone(),
        config.memory.context_policy(),
    )?);

    let pipeline = Arc::new(SkillPipeline::new(
        oracle,
        store.clone(),
        memory,
        config.topic_labels(),
        PipelineOptions {
            temperature: config.oracle.temperature,
            max_tokens: config.oracle.max_tokens,
            top_k: config.store.top_k,
        },
    ));

    let delivery = Arc::new(DeliveryAdapter::from_config(&config.delivery));

    Ok(Arc::new(GatewayState {
        pipeline,
        delivery,
        store,
    }))
}

/// Ingest any configured topic whose partition is still empty.
///
/// Mirrors a fresh deployment: the first boot loads the corpora, later
/// boots reuse the persisted partitions. A missing or malformed corpus is
/// logged and skipped — the server still starts and that topic simply
/// retrieves nothing.
pub async fn ingest_if_empty(state: &SharedState, config: &AppConfig) {
    for topic in &config.topics {
        let count = state.store.count(&topic.label).await.unwrap_or(0);
        if count > 0 {
            continue;
        }

        match skillbot_ingest::parse_corpus(&topic.corpus) {
            Ok(records) => {
                match skillbot_ingest::load_topic(state.store.as_ref(), &topic.label, &records)
                    .await
                {
                    Ok(loaded) => {
                        info!(topic = %topic.label, records = loaded, "Corpus ingested at startup")
                    }
                    Err(e) => warn!(topic = %topic.label, error = %e, "Startup ingestion failed"),
                }
            }
            Err(e) => {
                warn!(topic = %topic.label, corpus = %topic.corpus.display(), error = %e, "Corpus unavailable, topic starts empty")
            }
        }
    }
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = build_state(&config)?;
    ingest_if_empty(&state, &config).await;
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn skill_handler(
    State(state): State<SharedState>,
    Json(request): Json<SkillRequest>,
) -> Json<Envelope> {
    info!(
        conversation = %request.conversation_id,
        has_callback = request.callback_address.is_some(),
        "Skill request received"
    );

    let answer = state.pipeline.handle(&request).await;
    let envelope = render(&answer);

    let delivered = state
        .delivery
        .deliver(envelope, request.callback_address.as_deref())
        .await;

    Json(delivered)
}
