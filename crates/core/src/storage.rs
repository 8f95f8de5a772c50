//! Where generated bitmaps end up.
//!
//! A [`MediaStore`] takes a relative key such as
//! `shots/scene_4/<run>/shot_1.png` and returns the public URL the frontend
//! should use. Implementations live in `cutify-media`.

use async_trait::async_trait;

use crate::error::StorageError;

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Backend name ("local", "supabase").
    fn name(&self) -> &str;

    /// Store `bytes` under `key` and return its public URL.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Remove the object stored under `key`. Missing objects are not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Public URL for `key` without touching the backend.
    fn public_url(&self, key: &str) -> String;
}
