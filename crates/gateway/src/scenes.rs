use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use cutify_core::model::{Scene, SceneDetail, SceneId, SceneUpdate};
use tracing::info;

use crate::{ApiResult, SharedState};

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/scenes/{id}", get(get_scene).put(update_scene).delete(delete_scene))
        .route("/api/scenes/{id}/generate-script", post(generate_script))
        .route("/api/scenes/{id}/generate-storyboard", post(generate_storyboard))
}

async fn get_scene(
    State(state): State<SharedState>,
    Path(id): Path<SceneId>,
) -> ApiResult<Json<SceneDetail>> {
    Ok(Json(state.store.scene_detail(id).await?))
}

async fn update_scene(
    State(state): State<SharedState>,
    Path(id): Path<SceneId>,
    Json(body): Json<SceneUpdate>,
) -> ApiResult<Json<SceneDetail>> {
    state.store.update_scene(id, &body).await?;
    Ok(Json(state.store.scene_detail(id).await?))
}

/// Later scenes move up to close the gap.
async fn delete_scene(
    State(state): State<SharedState>,
    Path(id): Path<SceneId>,
) -> ApiResult<StatusCode> {
    let scene = state.store.delete_scene(id).await?;
    info!(
        scene_id = id,
        project_id = scene.project_id,
        title = %scene.title,
        "Scene deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

async fn generate_script(
    State(state): State<SharedState>,
    Path(id): Path<SceneId>,
) -> ApiResult<Json<Scene>> {
    Ok(Json(state.scriptwriter.generate(id).await?))
}

async fn generate_storyboard(
    State(state): State<SharedState>,
    Path(id): Path<SceneId>,
) -> ApiResult<Json<SceneDetail>> {
    Ok(Json(state.director.storyboard(id).await?))
}

#[cfg(test)]
mod tests {
    use crate::testing::{TestApp, body_json, png, request, test_app};
    use axum::http::StatusCode;
    use cutify_core::model::{NewProject, SceneId};
    use serde_json::json;
    use tower::ServiceExt;

    async fn with_scenes(app: &TestApp, titles: &[&str]) -> Vec<SceneId> {
        let project = app
            .store
            .create_project(&NewProject {
                title: "Scenes".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let mut ids = Vec::new();
        for title in titles {
            ids.push(app.store.append_scene(project.id, title, "summary").await.unwrap().id);
        }
        ids
    }

    #[tokio::test]
    async fn update_and_fetch_scene() {
        let app = test_app(&[], None).await;
        let ids = with_scenes(&app, &["Intro"]).await;
        let uri = format!("/api/scenes/{}", ids[0]);

        let response = app
            .router
            .clone()
            .oneshot(request(
                "PUT",
                &uri,
                Some(json!({"title": "Cold Open", "status": "in-progress"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["title"], "Cold Open");
        assert_eq!(json["status"], "in-progress");

        let response = app
            .router
            .oneshot(request("GET", &uri, None))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["title"], "Cold Open");
        assert!(json["shots"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_resequences_siblings() {
        let app = test_app(&[], None).await;
        let ids = with_scenes(&app, &["One", "Two", "Three"]).await;

        let response = app
            .router
            .clone()
            .oneshot(request("DELETE", &format!("/api/scenes/{}", ids[0]), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .router
            .oneshot(request("GET", &format!("/api/scenes/{}", ids[2]), None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["sequence_order"], 2);
    }

    #[tokio::test]
    async fn generate_script_stores_text() {
        let app = test_app(&["INT. KITCHEN - DAY\nShe waits."], None).await;
        let ids = with_scenes(&app, &["Kitchen"]).await;

        let response = app
            .router
            .oneshot(request("POST", &format!("/api/scenes/{}/generate-script", ids[0]), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["script"], "INT. KITCHEN - DAY\nShe waits.");
        assert_eq!(json["status"], "in-progress");
    }

    #[tokio::test]
    async fn generate_storyboard_returns_nine_shots() {
        let app = test_app(&[], Some(png(60, 60))).await;
        let ids = with_scenes(&app, &["Board"]).await;

        let response = app
            .router
            .oneshot(request("POST", &format!("/api/scenes/{}/generate-storyboard", ids[0]), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["shots"].as_array().unwrap().len(), 9);
        assert_eq!(json["status"], "done");
        let master = json["storyboard_url"].as_str().unwrap();
        assert!(master.starts_with("/static/shots/"));
        assert!(app.media_dir.path().join(master.trim_start_matches("/static/")).exists());
    }

    #[tokio::test]
    async fn storyboard_refusal_is_bad_gateway() {
        let app = test_app(&[], None).await;
        let ids = with_scenes(&app, &["Board"]).await;

        let response = app
            .router
            .oneshot(request("POST", &format!("/api/scenes/{}/generate-storyboard", ids[0]), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("I only speak in words."));
    }

    #[tokio::test]
    async fn unknown_scene_is_404() {
        let app = test_app(&[], None).await;
        let response = app
            .router
            .oneshot(request("GET", "/api/scenes/999", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
