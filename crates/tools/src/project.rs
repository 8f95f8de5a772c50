//! `update_project_details`

use async_trait::async_trait;
use cutify_core::Error;
use cutify_core::error::ToolError;
use cutify_core::model::{ProjectId, ProjectUpdate};
use cutify_core::tool::{Tool, ToolResult};
use cutify_store::SqliteStore;
use tracing::debug;

use crate::{execution_failed, opt_str};

pub struct UpdateProjectDetailsTool {
    store: SqliteStore,
    project_id: ProjectId,
}

impl UpdateProjectDetailsTool {
    pub fn new(store: SqliteStore, project_id: ProjectId) -> Self {
        Self { store, project_id }
    }
}

#[async_trait]
impl Tool for UpdateProjectDetailsTool {
    fn name(&self) -> &str {
        "update_project_details"
    }

    fn description(&self) -> &str {
        "Update the project's metadata. Only pass the fields that should change."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "description": "New project title" },
                "genre": { "type": "string", "description": "Genre, e.g. 'Thriller'" },
                "pitch": { "type": "string", "description": "One-paragraph pitch" },
                "visual_style": { "type": "string", "description": "Visual style of the video" },
                "target_audience": { "type": "string", "description": "Who the video is for" }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let update = ProjectUpdate {
            title: opt_str(&arguments, "title").map(str::to_string),
            genre: opt_str(&arguments, "genre").map(str::to_string),
            pitch: opt_str(&arguments, "pitch").map(str::to_string),
            visual_style: opt_str(&arguments, "visual_style").map(str::to_string),
            target_audience: opt_str(&arguments, "target_audience").map(str::to_string),
            ..Default::default()
        };

        let project = match self.store.get_project(self.project_id).await {
            Ok(project) => project,
            Err(Error::NotFound { .. }) => {
                return Ok(ToolResult::failed("Error: Project not found."));
            }
            Err(e) => return Err(execution_failed(self.name(), e)),
        };

        if update.is_empty() {
            return Ok(ToolResult::ok("No changes made."));
        }

        let mut applied = Vec::new();
        if let Some(title) = &update.title {
            applied.push(format!("Title='{title}'"));
        }
        if let Some(genre) = &update.genre {
            applied.push(format!("Genre='{genre}'"));
        }
        if update.pitch.is_some() {
            applied.push("Pitch updated".to_string());
        }
        if update.visual_style.is_some() {
            applied.push("Visual Style updated".to_string());
        }
        if let Some(audience) = &update.target_audience {
            applied.push(format!("Target Audience='{audience}'"));
        }

        self.store
            .update_project(project.id, &update)
            .await
            .map_err(|e| execution_failed(self.name(), e))?;

        debug!(project_id = project.id, fields = applied.len(), "Project details updated by agent");
        Ok(ToolResult::ok(format!(
            "Successfully updated project: {}",
            applied.join(", ")
        )))
    }
}
