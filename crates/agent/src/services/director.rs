//! Storyboards: one image call for a 3x3 contact sheet, sliced into nine
//! shots.

use chrono::Utc;
use cutify_core::error::ImageError;
use cutify_core::event::{DomainEvent, EventBus};
use cutify_core::model::{Project, Scene, SceneDetail, SceneId};
use cutify_core::provider::{ImageProvider, ImageRequest};
use cutify_core::storage::MediaStore;
use cutify_core::{Error, Result};
use cutify_media::{GridSlices, StoryboardUrls, slice_grid, upload_storyboard};
use cutify_store::SqliteStore;
use std::sync::Arc;
use tracing::{info, warn};

use super::{AiLogger, ModelSettings};
use crate::prompts;

const SERVICE: &str = "Director";

pub struct Director {
    store: SqliteStore,
    images: Arc<dyn ImageProvider>,
    media: Arc<dyn MediaStore>,
    events: Arc<EventBus>,
    settings: ModelSettings,
    logger: AiLogger,
}

impl Director {
    pub fn new(
        store: SqliteStore,
        images: Arc<dyn ImageProvider>,
        media: Arc<dyn MediaStore>,
        events: Arc<EventBus>,
        settings: ModelSettings,
        logger: AiLogger,
    ) -> Self {
        Self {
            store,
            images,
            media,
            events,
            settings,
            logger,
        }
    }

    /// Generate, slice and store the storyboard of a scene.
    pub async fn storyboard(&self, scene_id: SceneId) -> Result<SceneDetail> {
        let scene = self.store.get_scene(scene_id).await?;
        let project = self.store.get_project(scene.project_id).await?;

        match self.run(&project, &scene).await {
            Ok(detail) => Ok(detail),
            Err(e) => {
                warn!(scene_id, error = %e, "Storyboard generation failed");
                self.events.publish(DomainEvent::ErrorOccurred {
                    context: format!("storyboard for scene {scene_id}"),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(e)
            }
        }
    }

    async fn run(&self, project: &Project, scene: &Scene) -> Result<SceneDetail> {
        let cast = self.store.scene_cast(scene.id).await?;
        let location = match scene.location_id {
            Some(id) => Some(self.store.get_location(id).await?),
            None => None,
        };

        let prompt = prompts::storyboard(project, scene, &cast, location.as_ref());
        let references: Vec<String> = cast
            .iter()
            .filter_map(|c| c.image_url.clone())
            .chain(location.iter().filter_map(|l| l.image_url.clone()))
            .collect();
        let log_id = self.logger.start(SERVICE, &prompt, &references).await;

        let (slices, model_text) = match self.draw(project, prompt).await {
            Ok(drawn) => drawn,
            Err(e) => {
                self.logger.failure(&log_id, &e.to_string()).await;
                return Err(e);
            }
        };

        let urls = match upload_storyboard(self.media.as_ref(), scene.id, &slices).await {
            Ok(urls) => urls,
            Err(e) => {
                self.logger.failure(&log_id, &e.to_string()).await;
                return Err(e.into());
            }
        };

        let detail = match self.persist(scene.id, &urls).await {
            Ok(detail) => detail,
            Err(e) => {
                self.logger.failure(&log_id, &e.to_string()).await;
                return Err(e);
            }
        };
        self.logger
            .success(&log_id, model_text.as_deref(), std::slice::from_ref(&urls.master_url))
            .await;

        info!(
            project_id = project.id,
            scene_id = scene.id,
            run_id = %urls.run_id,
            cell_width = slices.cell_width,
            cell_height = slices.cell_height,
            "Storyboard generated"
        );
        self.events.publish(DomainEvent::StoryboardGenerated {
            project_id: project.id,
            scene_id: scene.id,
            storyboard_url: urls.master_url.clone(),
            shot_count: urls.shot_urls.len(),
            timestamp: Utc::now(),
        });

        Ok(detail)
    }

    async fn persist(&self, scene_id: SceneId, urls: &StoryboardUrls) -> Result<SceneDetail> {
        self.store
            .replace_shots(scene_id, &urls.master_url, &urls.shot_urls)
            .await?;
        self.store.scene_detail(scene_id).await
    }

    /// One image call, then the slice. Returns the model's text alongside.
    async fn draw(
        &self,
        project: &Project,
        prompt: String,
    ) -> Result<(GridSlices, Option<String>)> {
        let response = self
            .images
            .generate(ImageRequest {
                model: self.settings.image_model.clone(),
                prompt,
                aspect_ratio: Some(project.aspect_ratio.clone()),
            })
            .await?;

        let text = response.text.clone();
        let Some(image) = response.into_first_image() else {
            let said = text.unwrap_or_else(|| "the model returned no content".into());
            return Err(ImageError::NoImage(said).into());
        };

        let slices = tokio::task::spawn_blocking(move || slice_grid(&image.bytes))
            .await
            .map_err(|e| Error::Internal(format!("slicing task failed: {e}")))??;
        Ok((slices, text))
    }
}
