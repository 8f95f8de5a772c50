//! HTTP API for Cutify.
//!
//! Projects, scenes and cast are plain CRUD over the store; the `generate-*`
//! and chat routes drive the agent services. Generated media is served from
//! `/static` when the local backend is in use.
//!
//! Built on Axum.

pub mod cast;
pub mod chat;
pub mod debug;
pub mod error;
pub mod projects;
pub mod scenes;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use cutify_agent::{
    AiLogger, AssetArtist, ConceptExtractor, Director, ModelSettings, Screenwriter, Scriptwriter,
    Showrunner,
};
use cutify_config::AppConfig;
use cutify_core::event::EventBus;
use cutify_core::provider::{ImageProvider, Provider};
use cutify_core::storage::MediaStore;
use cutify_store::SqliteStore;

pub use error::{ApiError, ApiResult, ErrorResponse};

/// Everything a handler can reach.
pub struct AppState {
    pub config: AppConfig,
    pub store: SqliteStore,
    pub events: Arc<EventBus>,
    pub showrunner: Showrunner,
    pub extractor: ConceptExtractor,
    pub screenwriter: Screenwriter,
    pub scriptwriter: Scriptwriter,
    pub director: Director,
    pub artist: AssetArtist,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wire the services around one chat provider, one image provider and
    /// one media store.
    pub fn new(
        config: AppConfig,
        store: SqliteStore,
        provider: Arc<dyn Provider>,
        images: Arc<dyn ImageProvider>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        let events = Arc::new(EventBus::default());
        let settings = ModelSettings::from_config(&config);
        let logger = AiLogger::new(store.clone());

        Self {
            showrunner: Showrunner::new(
                store.clone(),
                provider.clone(),
                settings.clone(),
                config.agent.clone(),
                events.clone(),
            ),
            extractor: ConceptExtractor::new(provider.clone(), settings.clone(), logger.clone()),
            screenwriter: Screenwriter::new(
                store.clone(),
                provider.clone(),
                settings.clone(),
                logger.clone(),
            ),
            scriptwriter: Scriptwriter::new(
                store.clone(),
                provider,
                settings.clone(),
                logger.clone(),
            ),
            director: Director::new(
                store.clone(),
                images.clone(),
                media.clone(),
                events.clone(),
                settings.clone(),
                logger.clone(),
            ),
            artist: AssetArtist::new(images, media, settings, logger),
            events,
            store,
            config,
        }
    }
}

/// Build the Axum router with every route, `/static` and the HTTP layers.
pub fn build_router(state: SharedState) -> Router {
    let gateway = &state.config.gateway;
    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&gateway.cors_origins))
        .layer(DefaultBodyLimit::max(gateway.max_body_bytes));
    let static_dir = ServeDir::new(&state.config.storage.local_dir);

    Router::new()
        .route("/health", get(health_handler))
        .merge(chat::routes())
        .merge(projects::routes())
        .merge(scenes::routes())
        .merge(cast::routes())
        .merge(debug::routes())
        .nest_service("/static", static_dir)
        .with_state(state)
        .layer(layers)
}

/// `["*"]` allows any origin; anything else is an exact allow-list.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the HTTP server: open the store, build the providers and the media
/// store, then serve until the process is stopped.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let store =
        SqliteStore::connect(&config.database.url, config.database.max_connections).await?;

    let router = cutify_providers::build_from_config(&config);
    let provider = router.default().ok_or_else(|| {
        format!(
            "provider '{}' is not configured; set an API key",
            router.default_name()
        )
    })?;
    let images = cutify_providers::build_image_provider(&config);
    let media = cutify_media::build_media_store(&config.storage)?;

    info!(
        provider = router.default_name(),
        chat_model = %config.chat_model,
        image_model = %config.image_model,
        storage = %config.storage.backend,
        "Services ready"
    );

    let state = Arc::new(AppState::new(config, store, provider, images, media));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Cutify gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{body_json, request, test_app};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint() {
        let app = test_app(&[], None).await;
        let response = app
            .router
            .oneshot(request("GET", "/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = test_app(&[], None).await;
        let response = app
            .router
            .oneshot(request("GET", "/api/nope", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn static_files_are_served() {
        let app = test_app(&[], None).await;
        std::fs::create_dir_all(app.media_dir.path().join("assets")).unwrap();
        std::fs::write(app.media_dir.path().join("assets/hello.txt"), "hi").unwrap();

        let response = app
            .router
            .oneshot(request("GET", "/static/assets/hello.txt", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cors_preflight_allows_configured_origin() {
        let app = test_app(&[], None).await;
        let preflight = axum::http::Request::builder()
            .method("OPTIONS")
            .uri("/api/projects")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .body(axum::body::Body::empty())
            .unwrap();

        let response = app
            .router
            .oneshot(preflight)
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
    }
}
