use cutify_core::error::ImageError;
use cutify_core::provider::{ImageProvider, ImageRequest};
use cutify_core::storage::MediaStore;
use cutify_core::{Error, Result};
use cutify_media::{asset_key, ensure_png, keys::PNG};
use std::sync::Arc;
use tracing::info;

use super::{AiLogger, ModelSettings};
use crate::prompts::{self, AssetKind};

const SERVICE: &str = "AssetGenerator";

/// Reference images for characters and locations.
pub struct AssetArtist {
    images: Arc<dyn ImageProvider>,
    media: Arc<dyn MediaStore>,
    settings: ModelSettings,
    logger: AiLogger,
}

impl AssetArtist {
    pub fn new(
        images: Arc<dyn ImageProvider>,
        media: Arc<dyn MediaStore>,
        settings: ModelSettings,
        logger: AiLogger,
    ) -> Self {
        Self {
            images,
            media,
            settings,
            logger,
        }
    }

    /// Generate a portrait (3:4) or an establishing shot (16:9) and return
    /// its public URL.
    pub async fn portrait(
        &self,
        kind: AssetKind,
        name: &str,
        details: &str,
        style: Option<&str>,
    ) -> Result<String> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("asset name is required".into()));
        }

        let prompt = prompts::asset(kind, name.trim(), details.trim(), style);
        let log_id = self.logger.start(SERVICE, &prompt, &[]).await;

        match self.render(kind, prompt).await {
            Ok((url, text)) => {
                self.logger
                    .success(&log_id, text.as_deref(), std::slice::from_ref(&url))
                    .await;
                info!(kind = kind.as_str(), name, url = %url, "Generated asset image");
                Ok(url)
            }
            Err(e) => {
                self.logger.failure(&log_id, &e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn render(&self, kind: AssetKind, prompt: String) -> Result<(String, Option<String>)> {
        let response = self
            .images
            .generate(ImageRequest {
                model: self.settings.image_model.clone(),
                prompt,
                aspect_ratio: Some(kind.aspect_ratio().to_string()),
            })
            .await?;

        let text = response.text.clone();
        let Some(image) = response.into_first_image() else {
            let said = text.unwrap_or_else(|| "the model returned no content".into());
            return Err(ImageError::NoImage(said).into());
        };

        let png = ensure_png(image.bytes)?;
        let url = self.media.put(&asset_key(kind.as_str()), png, PNG).await?;
        Ok((url, text))
    }
}
