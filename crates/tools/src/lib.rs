//! Tools the showrunner can call to edit a project.
//!
//! Every tool is bound to one project at construction. Results are
//! sentences for the model; a scene that cannot be found is reported in
//! the output, not as an error. Only malformed arguments fail.

pub mod project;
pub mod scenes;

use cutify_core::error::ToolError;
use cutify_core::model::ProjectId;
use cutify_core::tool::ToolRegistry;
use cutify_store::SqliteStore;

pub use project::UpdateProjectDetailsTool;
pub use scenes::{AddSceneTool, DeleteSceneTool, ReorderScenesTool};

/// All four project tools, bound to `project_id`.
pub fn project_registry(store: SqliteStore, project_id: ProjectId) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(UpdateProjectDetailsTool::new(store.clone(), project_id)));
    registry.register(Box::new(AddSceneTool::new(store.clone(), project_id)));
    registry.register(Box::new(DeleteSceneTool::new(store.clone(), project_id)));
    registry.register(Box::new(ReorderScenesTool::new(store, project_id)));
    registry
}

/// A non-empty string argument, if present.
pub(crate) fn opt_str<'a>(arguments: &'a serde_json::Value, name: &str) -> Option<&'a str> {
    arguments[name].as_str().map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn required_str<'a>(
    arguments: &'a serde_json::Value,
    name: &str,
) -> Result<&'a str, ToolError> {
    opt_str(arguments, name)
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{name}' argument")))
}

/// Integer argument; models sometimes send numbers as strings.
pub(crate) fn required_int(arguments: &serde_json::Value, name: &str) -> Result<i64, ToolError> {
    let value = &arguments[name];
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| {
            ToolError::InvalidArguments(format!("Missing or non-numeric '{name}' argument"))
        })
}

/// Free-text references may also arrive as bare numbers.
pub(crate) fn required_query(
    arguments: &serde_json::Value,
    name: &str,
) -> Result<String, ToolError> {
    match &arguments[name] {
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => required_str(arguments, name).map(str::to_string),
    }
}

pub(crate) fn execution_failed(tool_name: &str, err: cutify_core::Error) -> ToolError {
    ToolError::ExecutionFailed {
        tool_name: tool_name.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn registry_has_all_tools_in_name_order() {
        let store = SqliteStore::in_memory().await.unwrap();
        let registry = project_registry(store, 1);
        assert_eq!(
            registry.names(),
            vec!["add_scene", "delete_scene", "reorder_scenes", "update_project_details"]
        );
        assert_eq!(registry.definitions().len(), 4);
    }

    #[test]
    fn argument_helpers() {
        let args = json!({"a": "  x ", "blank": "  ", "n": "3", "f": 2.0, "q": 7});
        assert_eq!(opt_str(&args, "a"), Some("x"));
        assert_eq!(opt_str(&args, "blank"), None);
        assert!(required_str(&args, "missing").is_err());
        assert_eq!(required_int(&args, "n").unwrap(), 3);
        assert_eq!(required_int(&args, "f").unwrap(), 2);
        assert!(required_int(&args, "a").is_err());
        assert_eq!(required_query(&args, "q").unwrap(), "7");
        assert_eq!(required_query(&args, "a").unwrap(), "x");
    }
}
