use cutify_core::model::{Project, ProjectId, Scene, SceneBreakdown, SceneStub};
use cutify_core::provider::{Provider, ProviderRequest};
use cutify_core::{Error, Result};
use cutify_store::SqliteStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::{AiLogger, ModelSettings, strip_fences};
use crate::prompts;

const SERVICE: &str = "Screenwriter";

/// Breaks a project concept into an ordered list of scenes.
pub struct Screenwriter {
    store: SqliteStore,
    provider: Arc<dyn Provider>,
    settings: ModelSettings,
    logger: AiLogger,
}

impl Screenwriter {
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

    pub async fn breakdown(&self, project: &Project, with_cast: bool) -> Result<SceneBreakdown> {
        let prompt = prompts::scene_breakdown(project, with_cast);
        let log_id = self.logger.start(SERVICE, &prompt, &[]).await;

        let mut request = ProviderRequest::prompt(&self.settings.chat_model, &prompt);
        request.temperature = self.settings.temperature;
        request.max_tokens = Some(self.settings.max_tokens);

        let text = match self.provider.complete(request).await {
            Ok(response) => response.message.content,
            Err(e) => {
                self.logger.failure(&log_id, &e.to_string()).await;
                return Err(e.into());
            }
        };

        match parse_breakdown(&text) {
            Ok(breakdown) => {
                self.logger.success(&log_id, Some(&text), &[]).await;
                Ok(breakdown)
            }
            Err(e) => {
                self.logger.failure(&log_id, &e.to_string()).await;
                Err(e)
            }
        }
    }

    /// Generate and store a fresh breakdown, replacing the project's scenes.
    pub async fn generate(&self, project_id: ProjectId, with_cast: bool) -> Result<Vec<Scene>> {
        let project = self.store.get_project(project_id).await?;
        let breakdown = self.breakdown(&project, with_cast).await?;
        let scenes = self.store.replace_scene_breakdown(project_id, &breakdown).await?;

        info!(
            project_id,
            scenes = scenes.len(),
            characters = breakdown.characters.len(),
            locations = breakdown.locations.len(),
            "Generated scene breakdown"
        );
        Ok(scenes)
    }
}

/// Accepts a bare array of scenes or a `{scenes, characters, locations}`
/// object.
pub fn parse_breakdown(text: &str) -> Result<SceneBreakdown> {
    let invalid = |reason: String| Error::InvalidModelOutput {
        service: SERVICE.into(),
        reason,
    };

    let value: Value = serde_json::from_str(strip_fences(text))
        .map_err(|e| invalid(format!("not JSON: {e}")))?;

    let has_scene_list = value.get("scenes").is_some_and(Value::is_array);
    let breakdown = match value {
        Value::Array(_) => SceneBreakdown {
            scenes: serde_json::from_value::<Vec<SceneStub>>(value)
                .map_err(|e| invalid(e.to_string()))?,
            ..Default::default()
        },
        Value::Object(_) if has_scene_list => {
            serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?
        }
        _ => return Err(invalid("expected a list of scenes".into())),
    };

    if breakdown.scenes.is_empty() {
        return Err(invalid("the breakdown has no scenes".into()));
    }
    Ok(breakdown)
}
