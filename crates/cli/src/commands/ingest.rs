//! `skillbot ingest` — load the configured corpora into the knowledge store.

use skillbot_config::AppConfig;
use skillbot_core::KnowledgeStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let state = skillbot_gateway::build_state(&config)?;

    skillbot_ingest::load_all(state.store.as_ref(), &config.topics).await?;

    for topic in &config.topics {
        let count = state.store.count(&topic.label).await?;
        println!("{}: {} records", topic.label, count);
    }

    Ok(())
}
