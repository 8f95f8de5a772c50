//! Object keys and the storyboard upload.
//!
//! Every storyboard run gets its own prefix, so regenerating a scene never
//! overwrites URLs an earlier run handed out.

use cutify_core::error::StorageError;
use cutify_core::model::SceneId;
use cutify_core::storage::MediaStore;
use futures::future::try_join_all;
use tracing::info;
use uuid::Uuid;

use crate::grid::GridSlices;

pub const PNG: &str = "image/png";

/// Fresh run id: a v4 UUID in its 32-char simple form.
pub fn new_run_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn master_key(scene_id: SceneId, run_id: &str) -> String {
    format!("shots/scene_{scene_id}/{run_id}/master_grid.png")
}

/// Key of shot `number` (1-based).
pub fn shot_key(scene_id: SceneId, run_id: &str, number: usize) -> String {
    format!("shots/scene_{scene_id}/{run_id}/shot_{number}.png")
}

/// Key for a character or location reference image.
pub fn asset_key(kind: &str) -> String {
    let short = Uuid::new_v4().simple().to_string();
    format!("assets/{kind}_{}.png", &short[..8])
}

/// Public URLs of one uploaded storyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryboardUrls {
    pub run_id: String,
    pub master_url: String,
    /// In shot order
    pub shot_urls: Vec<String>,
}

/// Upload the master grid and every cell under a new run prefix.
///
/// The cells go up concurrently; the first failure aborts the lot.
pub async fn upload_storyboard(
    store: &dyn MediaStore,
    scene_id: SceneId,
    slices: &GridSlices,
) -> Result<StoryboardUrls, StorageError> {
    let run_id = new_run_id();

    let master_url = store
        .put(&master_key(scene_id, &run_id), slices.master_png.clone(), PNG)
        .await?;

    let uploads = slices.cells.iter().enumerate().map(|(index, png)| {
        let key = shot_key(scene_id, &run_id, index + 1);
        async move { store.put(&key, png.clone(), PNG).await }
    });
    let shot_urls = try_join_all(uploads).await?;

    info!(
        scene_id,
        run_id = %run_id,
        backend = store.name(),
        shots = shot_urls.len(),
        "Uploaded storyboard"
    );

    Ok(StoryboardUrls {
        run_id,
        master_url,
        shot_urls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_scheme() {
        assert_eq!(master_key(4, "abc"), "shots/scene_4/abc/master_grid.png");
        assert_eq!(shot_key(4, "abc", 9), "shots/scene_4/abc/shot_9.png");
    }

    #[test]
    fn run_ids_are_simple_uuids() {
        let a = new_run_id();
        let b = new_run_id();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn asset_keys() {
        let key = asset_key("character");
        assert!(key.starts_with("assets/character_"));
        assert!(key.ends_with(".png"));
        assert_eq!(key.len(), "assets/character_".len() + 8 + ".png".len());
    }
}
