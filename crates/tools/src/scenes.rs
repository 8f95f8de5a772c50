//! Scene tools: `add_scene`, `delete_scene`, `reorder_scenes`.
//!
//! Deletion and reordering both resolve the scene with
//! [`SceneQuery`](cutify_store::resolver::SceneQuery): a number is tried as a
//! sequence position, then as an id; anything else matches titles.

use async_trait::async_trait;
use cutify_core::Error;
use cutify_core::error::ToolError;
use cutify_core::model::ProjectId;
use cutify_core::tool::{Tool, ToolResult};
use cutify_store::SqliteStore;
use tracing::debug;

use crate::{execution_failed, opt_str, required_int, required_query, required_str};

const NO_SUMMARY: &str = "No summary provided.";

pub struct AddSceneTool {
    store: SqliteStore,
    project_id: ProjectId,
}

impl AddSceneTool {
    pub fn new(store: SqliteStore, project_id: ProjectId) -> Self {
        Self { store, project_id }
    }
}

#[async_trait]
impl Tool for AddSceneTool {
    fn name(&self) -> &str {
        "add_scene"
    }

    fn description(&self) -> &str {
        "Add a new scene at the end of the project."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "description": "Scene title" },
                "summary": { "type": "string", "description": "What happens in the scene" }
            },
            "required": ["title"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let title = required_str(&arguments, "title")?;
        let summary = opt_str(&arguments, "summary").unwrap_or(NO_SUMMARY);

        match self.store.append_scene(self.project_id, title, summary).await {
            Ok(scene) => Ok(ToolResult::ok(format!(
                "Successfully added scene: {} (Order: {})",
                scene.title, scene.sequence_order
            ))),
            Err(Error::NotFound { .. }) => Ok(ToolResult::failed("Error: Project not found.")),
            Err(e) => Err(execution_failed(self.name(), e)),
        }
    }
}

pub struct DeleteSceneTool {
    store: SqliteStore,
    project_id: ProjectId,
}

impl DeleteSceneTool {
    pub fn new(store: SqliteStore, project_id: ProjectId) -> Self {
        Self { store, project_id }
    }
}

#[async_trait]
impl Tool for DeleteSceneTool {
    fn name(&self) -> &str {
        "delete_scene"
    }

    fn description(&self) -> &str {
        "Delete a scene, identified by its number in the sequence, its id, or part of its title. \
         The remaining scenes are renumbered."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "scene_id_or_title_or_sequence": {
                    "type": "string",
                    "description": "e.g. '2', 'scene 2' or 'rooftop chase'"
                }
            },
            "required": ["scene_id_or_title_or_sequence"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = required_query(&arguments, "scene_id_or_title_or_sequence")?;

        let found = self
            .store
            .find_scene(self.project_id, &query)
            .await
            .map_err(|e| execution_failed(self.name(), e))?;
        let Some(scene) = found else {
            return Ok(ToolResult::failed(format!(
                "Could not find a scene matching '{query}'. Please provide the exact title or scene number."
            )));
        };

        let deleted = self
            .store
            .delete_scene(scene.id)
            .await
            .map_err(|e| execution_failed(self.name(), e))?;

        debug!(project_id = self.project_id, scene_id = deleted.id, "Scene deleted by agent");
        Ok(ToolResult::ok(format!("Successfully deleted scene: {}", deleted.title)))
    }
}

pub struct ReorderScenesTool {
    store: SqliteStore,
    project_id: ProjectId,
}

impl ReorderScenesTool {
    pub fn new(store: SqliteStore, project_id: ProjectId) -> Self {
        Self { store, project_id }
    }
}

#[async_trait]
impl Tool for ReorderScenesTool {
    fn name(&self) -> &str {
        "reorder_scenes"
    }

    fn description(&self) -> &str {
        "Move a scene to a new 1-based position in the sequence."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "moved_scene_query": {
                    "type": "string",
                    "description": "Scene number, id or part of the title of the scene to move"
                },
                "target_position": {
                    "type": "integer",
                    "description": "New position, starting at 1"
                }
            },
            "required": ["moved_scene_query", "target_position"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = required_query(&arguments, "moved_scene_query")?;
        let target_position = required_int(&arguments, "target_position")?;

        let found = self
            .store
            .find_scene(self.project_id, &query)
            .await
            .map_err(|e| execution_failed(self.name(), e))?;
        let Some(scene) = found else {
            return Ok(ToolResult::failed(format!("Scene '{query}' not found.")));
        };

        self.store
            .move_scene(self.project_id, scene.id, target_position)
            .await
            .map_err(|e| execution_failed(self.name(), e))?;

        Ok(ToolResult::ok(format!(
            "Successfully moved '{}' to position {target_position}.",
            scene.title
        )))
    }
}
