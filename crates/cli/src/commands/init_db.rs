//! `cutify init-db`: create the database schema.

use cutify_config::AppConfig;
use cutify_store::SqliteStore;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    println!("🗄️  Initializing database at {}", config.database.url);
    let store = SqliteStore::connect(&config.database.url, config.database.max_connections).await?;
    store.health_check().await?;
    println!("   ✅ Schema ready");

    Ok(())
}
