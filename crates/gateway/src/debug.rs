//! AI call log inspection.

use axum::Router;
use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::get;
use cutify_core::model::AiLog;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ApiResult, SharedState};

pub fn routes() -> Router<SharedState> {
    Router::new().route("/api/debug/ai-logs", get(recent_logs).delete(clear_logs))
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub cleared: u64,
}

/// Newest first; `limit` defaults to `logs.recent_limit`.
async fn recent_logs(
    State(state): State<SharedState>,
    Query(query): Query<LogsQuery>,
) -> ApiResult<Json<Vec<AiLog>>> {
    let limit = query.limit.unwrap_or(state.config.logs.recent_limit);
    Ok(Json(state.store.recent_ai_logs(limit).await?))
}

async fn clear_logs(State(state): State<SharedState>) -> ApiResult<Json<ClearedResponse>> {
    let cleared = state.store.clear_ai_logs().await?;
    info!(cleared, "Cleared AI call logs");
    Ok(Json(ClearedResponse { cleared }))
}
