//! `skillbot serve` — start the HTTP skill server.

use skillbot_config::AppConfig;

pub async fn run(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load()?;

    if let Some(port) = port {
        config.gateway.port = port;
    }

    skillbot_gateway::start(config).await
}
