//! # Cutify Media
//!
//! Storyboard grid slicing and the storage backends generated images are
//! uploaded to.

pub mod grid;
pub mod keys;
pub mod local;
pub mod supabase;

pub use grid::{GRID_SIZE, GridSlices, SHOT_COUNT, ensure_png, slice_grid};
pub use keys::{StoryboardUrls, asset_key, upload_storyboard};
pub use local::LocalMediaStore;
pub use supabase::SupabaseMediaStore;

use cutify_config::{STORAGE_LOCAL, STORAGE_SUPABASE, StorageConfig};
use cutify_core::storage::MediaStore;
use cutify_core::{Error, Result};
use std::sync::Arc;
use tracing::info;

/// Pick the media backend named by `[storage] backend`.
pub fn build_media_store(config: &StorageConfig) -> Result<Arc<dyn MediaStore>> {
    let store: Arc<dyn MediaStore> = match config.backend.as_str() {
        STORAGE_LOCAL => Arc::new(LocalMediaStore::new(
            config.local_dir.clone(),
            config.public_base.clone(),
        )),
        STORAGE_SUPABASE => {
            let (Some(url), Some(key)) = (&config.supabase_url, &config.supabase_key) else {
                return Err(Error::Config {
                    message: "supabase storage needs supabase_url and supabase_key".into(),
                });
            };
            Arc::new(SupabaseMediaStore::new(url.clone(), key.clone(), config.bucket.clone()))
        }
        other => {
            return Err(Error::Config {
                message: format!("unknown storage backend '{other}'"),
            });
        }
    };

    info!(backend = store.name(), "Media store ready");
    Ok(store)
}
