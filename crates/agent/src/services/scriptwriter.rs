use cutify_core::model::{Project, Scene, SceneId};
use cutify_core::provider::{Provider, ProviderRequest};
use cutify_core::{Error, Result};
use cutify_store::SqliteStore;
use std::sync::Arc;
use tracing::info;

use super::{AiLogger, ModelSettings};
use crate::prompts;

const SERVICE: &str = "Scriptwriter";

/// Writes the screenplay of a single scene.
pub struct Scriptwriter {
    store: SqliteStore,
    provider: Arc<dyn Provider>,
    settings: ModelSettings,
    logger: AiLogger,
}

impl Scriptwriter {
    pub fn new(
        store: SqliteStore,
        provider: Arc<dyn Provider>,
        settings: ModelSettings,
        logger: AiLogger,
    ) -> Self {
        Self {
            store,
            provider,
            settings,
            logger,
        }
    }

    pub async fn write(&self, project: &Project, scene: &Scene) -> Result<String> {
        let prompt = prompts::scene_script(project, scene);
        let log_id = self.logger.start(SERVICE, &prompt, &[]).await;

        let mut request = ProviderRequest::prompt(&self.settings.chat_model, &prompt);
        request.temperature = self.settings.temperature;
        request.max_tokens = Some(self.settings.max_tokens);

        let script = match self.provider.complete(request).await {
            Ok(response) => response.message.content.trim().to_string(),
            Err(e) => {
                self.logger.failure(&log_id, &e.to_string()).await;
                return Err(e.into());
            }
        };

        if script.is_empty() {
            let err = Error::InvalidModelOutput {
                service: SERVICE.into(),
                reason: "empty script".into(),
            };
            self.logger.failure(&log_id, &err.to_string()).await;
            return Err(err);
        }

        self.logger.success(&log_id, Some(&script), &[]).await;
        Ok(script)
    }

    /// Write and store the script; the scene moves to `in-progress`.
    pub async fn generate(&self, scene_id: SceneId) -> Result<Scene> {
        let scene = self.store.get_scene(scene_id).await?;
        let project = self.store.get_project(scene.project_id).await?;

        let script = self.write(&project, &scene).await?;
        let scene = self.store.set_scene_script(scene_id, &script).await?;

        info!(scene_id, chars = script.len(), "Generated scene script");
        Ok(scene)
    }
}
