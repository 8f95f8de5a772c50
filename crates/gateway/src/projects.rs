use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use cutify_core::model::{NewProject, Project, ProjectDetail, ProjectId, ProjectUpdate, Scene};
use serde::Deserialize;
use tracing::info;

use crate::{ApiError, ApiResult, SharedState};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/projects/{id}/generate-scenes", post(generate_scenes))
}

async fn list_projects(State(state): State<SharedState>) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(state.store.list_projects().await?))
}

async fn create_project(
    State(state): State<SharedState>,
    Json(body): Json<NewProject>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state.store.create_project(&body).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_project(
    State(state): State<SharedState>,
    Path(id): Path<ProjectId>,
) -> ApiResult<Json<ProjectDetail>> {
    Ok(Json(state.store.project_detail(id).await?))
}

async fn update_project(
    State(state): State<SharedState>,
    Path(id): Path<ProjectId>,
    Json(body): Json<ProjectUpdate>,
) -> ApiResult<Json<Project>> {
    Ok(Json(state.store.update_project(id, &body).await?))
}

async fn delete_project(
    State(state): State<SharedState>,
    Path(id): Path<ProjectId>,
) -> ApiResult<StatusCode> {
    state.store.delete_project(id).await?;
    info!(project_id = id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct GenerateScenesRequest {
    #[serde(default = "with_cast_default")]
    pub with_cast: bool,
}

fn with_cast_default() -> bool {
    true
}

impl Default for GenerateScenesRequest {
    fn default() -> Self {
        Self { with_cast: true }
    }
}

/// The body is optional; an empty one means the defaults.
async fn generate_scenes(
    State(state): State<SharedState>,
    Path(id): Path<ProjectId>,
    body: Bytes,
) -> ApiResult<Json<Vec<Scene>>> {
    let request: GenerateScenesRequest = if body.iter().all(u8::is_ascii_whitespace) {
        GenerateScenesRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))?
    };

    let scenes = state.screenwriter.generate(id, request.with_cast).await?;
    Ok(Json(scenes))
}
