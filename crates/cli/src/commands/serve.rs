//! `cutify serve`: start the HTTP API server.

use cutify_config::AppConfig;
use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config =
        AppConfig::load(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🎬 Cutify");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Provider:  {} ({})", config.default_provider, config.chat_model);
    println!("   Database:  {}", config.database.url);
    println!("   Storage:   {}", config.storage.backend);

    cutify_gateway::start(config).await?;

    Ok(())
}
