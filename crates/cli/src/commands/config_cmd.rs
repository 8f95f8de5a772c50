//! `cutify config`: show the effective configuration.

use cutify_config::AppConfig;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    print!("{}", config.redacted_toml());
    Ok(())
}
