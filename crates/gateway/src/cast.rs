//! Characters, locations and their reference images.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post, put};
use cutify_agent::AssetKind;
use cutify_core::model::{AssetInput, Character, CharacterId, Location, LocationId, ProjectId};
use serde::{Deserialize, Serialize};

use crate::{ApiError, ApiResult, SharedState};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route(
            "/api/projects/{id}/characters",
            get(list_characters).post(create_character),
        )
        .route("/api/characters/{id}", put(update_character).delete(delete_character))
        .route(
            "/api/projects/{id}/locations",
            get(list_locations).post(create_location),
        )
        .route("/api/locations/{id}", put(update_location).delete(delete_location))
        .route("/api/generate-asset-image", post(generate_asset_image))
}

fn require_name(input: &AssetInput) -> Result<(), ApiError> {
    match input.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Ok(()),
        _ => Err(ApiError::bad_request("name is required")),
    }
}

async fn list_characters(
    State(state): State<SharedState>,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<Vec<Character>>> {
    state.store.get_project(project_id).await?;
    Ok(Json(state.store.list_characters(project_id).await?))
}

async fn create_character(
    State(state): State<SharedState>,
    Path(project_id): Path<ProjectId>,
    Json(body): Json<AssetInput>,
) -> ApiResult<(StatusCode, Json<Character>)> {
    require_name(&body)?;
    state.store.get_project(project_id).await?;
    let character = state.store.create_character(project_id, &body).await?;
    Ok((StatusCode::CREATED, Json(character)))
}

async fn update_character(
    State(state): State<SharedState>,
    Path(id): Path<CharacterId>,
    Json(body): Json<AssetInput>,
) -> ApiResult<Json<Character>> {
    Ok(Json(state.store.update_character(id, &body).await?))
}

async fn delete_character(
    State(state): State<SharedState>,
    Path(id): Path<CharacterId>,
) -> ApiResult<StatusCode> {
    state.store.delete_character(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_locations(
    State(state): State<SharedState>,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<Vec<Location>>> {
    state.store.get_project(project_id).await?;
    Ok(Json(state.store.list_locations(project_id).await?))
}

async fn create_location(
    State(state): State<SharedState>,
    Path(project_id): Path<ProjectId>,
    Json(body): Json<AssetInput>,
) -> ApiResult<(StatusCode, Json<Location>)> {
    require_name(&body)?;
    state.store.get_project(project_id).await?;
    let location = state.store.create_location(project_id, &body).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

async fn update_location(
    State(state): State<SharedState>,
    Path(id): Path<LocationId>,
    Json(body): Json<AssetInput>,
) -> ApiResult<Json<Location>> {
    Ok(Json(state.store.update_location(id, &body).await?))
}

async fn delete_location(
    State(state): State<SharedState>,
    Path(id): Path<LocationId>,
) -> ApiResult<StatusCode> {
    state.store.delete_location(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AssetImageRequest {
    /// Free-form details about the subject.
    #[serde(default)]
    pub prompt: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub style: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssetImageResponse {
    pub image_url: String,
}

async fn generate_asset_image(
    State(state): State<SharedState>,
    Json(body): Json<AssetImageRequest>,
) -> ApiResult<Json<AssetImageResponse>> {
    let kind: AssetKind = body.kind.parse().map_err(ApiError::bad_request)?;
    let image_url = state
        .artist
        .portrait(kind, &body.name, &body.prompt, body.style.as_deref())
        .await?;
    Ok(Json(AssetImageResponse { image_url }))
}
