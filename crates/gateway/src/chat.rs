//! Chat routes: the stateless concept chat, per-project chat and concept
//! extraction.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use cutify_agent::ChatReply;
use cutify_core::message::{Message, transcript};
use cutify_core::model::{ChatRecord, NewProject, Project, ProjectId};
use serde::Deserialize;
use tracing::info;

use crate::{ApiResult, SharedState};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/chat/headless", post(headless_chat))
        .route("/api/projects/{id}/chat", get(chat_history).post(project_chat))
        .route("/api/extract-concept", post(extract_concept))
}

/// A chat bubble as the client keeps it.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientMessage {
    #[serde(rename = "senderId")]
    pub sender_id: String,
    #[serde(default)]
    pub text: String,
}

impl ClientMessage {
    /// `senderId == "user"` is the user; every other sender is the agent.
    pub fn to_message(&self) -> Message {
        if self.sender_id == "user" {
            Message::user(&self.text)
        } else {
            Message::assistant(&self.text)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HeadlessChatRequest {
    #[serde(default)]
    pub messages: Vec<ClientMessage>,
    #[serde(rename = "newMessage")]
    pub new_message: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ExtractConceptRequest {
    #[serde(default)]
    pub messages: Vec<ClientMessage>,
}

async fn headless_chat(
    State(state): State<SharedState>,
    Json(body): Json<HeadlessChatRequest>,
) -> ApiResult<Json<ChatReply>> {
    let history = body.messages.iter().map(ClientMessage::to_message).collect();
    let reply = state.showrunner.headless_chat(history, &body.new_message).await?;
    Ok(Json(reply))
}

async fn chat_history(
    State(state): State<SharedState>,
    Path(id): Path<ProjectId>,
) -> ApiResult<Json<Vec<ChatRecord>>> {
    state.store.get_project(id).await?;
    let history = state.store.chat_history(id, u32::MAX).await?;
    Ok(Json(history))
}

async fn project_chat(
    State(state): State<SharedState>,
    Path(id): Path<ProjectId>,
    Json(body): Json<ChatRequest>,
) -> ApiResult<Json<ChatReply>> {
    let reply = state.showrunner.project_chat(id, &body.content).await?;
    Ok(Json(reply))
}

/// Turn the concept chat into a new project.
async fn extract_concept(
    State(state): State<SharedState>,
    Json(body): Json<ExtractConceptRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let messages: Vec<Message> = body.messages.iter().map(ClientMessage::to_message).collect();
    let concept = state.extractor.extract(&transcript(&messages)).await?;
    let project = state.store.create_project(&NewProject::from(concept)).await?;

    info!(project_id = project.id, title = %project.title, "Created project from concept");
    Ok((StatusCode::CREATED, Json(project)))
}
