//! `cutify doctor`: diagnose system health.

use cutify_config::{AppConfig, STORAGE_LOCAL};
use cutify_store::SqliteStore;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Cutify Doctor: System Diagnostics");
    println!("====================================\n");

    let mut issues = 0;

    let config = match AppConfig::load(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the configuration before running the other checks.");
            return Ok(());
        }
    };

    // Provider
    if config.has_api_key() {
        println!("  ✅ API key configured for '{}'", config.default_provider);
    } else {
        println!(
            "  ⚠️  No API key for '{}': set CUTIFY_API_KEY or GOOGLE_API_KEY",
            config.default_provider
        );
        issues += 1;
    }
    if cutify_providers::build_from_config(&config).default().is_none() {
        println!("  ❌ Provider '{}' could not be built", config.default_provider);
        issues += 1;
    }

    // Database
    match SqliteStore::connect(&config.database.url, 1).await {
        Ok(store) => match store.health_check().await {
            Ok(()) => println!("  ✅ Database reachable ({})", config.database.url),
            Err(e) => {
                println!("  ❌ Database check failed: {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Cannot open database: {e}");
            issues += 1;
        }
    }

    // Storage
    if config.storage.backend == STORAGE_LOCAL {
        let dir = &config.storage.local_dir;
        match tokio::fs::create_dir_all(dir).await {
            Ok(()) => println!("  ✅ Storage directory ready ({})", dir.display()),
            Err(e) => {
                println!("  ❌ Storage directory {} unusable: {e}", dir.display());
                issues += 1;
            }
        }
    } else {
        println!("  ✅ Object storage configured (bucket '{}')", config.storage.bucket);
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
