//! Supabase Storage backend.
//!
//! Objects go to `{url}/storage/v1/object/{bucket}/{key}`; the bucket is
//! expected to be public so the returned URLs work without a token.

use async_trait::async_trait;
use cutify_core::error::StorageError;
use cutify_core::storage::MediaStore;
use tracing::{debug, warn};

pub struct SupabaseMediaStore {
    url: String,
    key: String,
    bucket: String,
    client: reqwest::Client,
}

impl SupabaseMediaStore {
    pub fn new(url: impl Into<String>, key: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            key: key.into(),
            bucket: bucket.into(),
            client: reqwest::Client::new(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.url, self.bucket, key)
    }

    async fn failure(&self, response: reqwest::Response) -> StorageError {
        let status_code = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        warn!(status_code, bucket = %self.bucket, "Supabase storage request failed");
        StorageError::UploadFailed {
            backend: self.name().to_string(),
            status_code,
            message,
        }
    }
}

impl std::fmt::Debug for SupabaseMediaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseMediaStore")
            .field("url", &self.url)
            .field("key", &"[REDACTED]")
            .field("bucket", &self.bucket)
            .finish()
    }
}

#[async_trait]
impl MediaStore for SupabaseMediaStore {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        if key.is_empty() || key.starts_with('/') || key.split('/').any(|part| part == "..") {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let size = bytes.len();
        let response = self
            .client
            .post(self.object_url(key))
            .bearer_auth(&self.key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.failure(response).await);
        }

        debug!(key, bytes = size, "Uploaded to Supabase");
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .delete(self.object_url(key))
            .bearer_auth(&self.key)
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(self.failure(response).await)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.url, self.bucket, key)
    }
}
