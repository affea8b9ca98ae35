//! `skillbot ask` — one-shot question through the full pipeline.
//!
//! The interactive stand-in for a chat UI: runs classification, retrieval,
//! and composition locally and prints the answer.

use skillbot_config::AppConfig;
use skillbot_core::SkillRequest;

pub async fn run(
    message: String,
    conversation: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let state = skillbot_gateway::build_state(&config)?;

    let request = SkillRequest::new(message, conversation.unwrap_or_else(|| "local".into()));
    let answer = state.pipeline.handle(&request).await;

    println!("{answer}");
    Ok(())
}
