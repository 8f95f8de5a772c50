//! Router fixtures shared by the handler tests.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use cutify_config::AppConfig;
use cutify_core::error::ProviderError;
use cutify_core::message::Message;
use cutify_core::provider::{
    GeneratedImage, ImageProvider, ImageRequest, ImageResponse, Provider, ProviderRequest,
    ProviderResponse,
};
use cutify_media::LocalMediaStore;
use cutify_store::SqliteStore;
use http_body_util::BodyExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::{AppState, build_router};

/// Replies with canned text, in order. An exhausted script is a provider error.
pub struct MockProvider {
    replies: Mutex<VecDeque<String>>,
    pub requests: Mutex<Vec<ProviderRequest>>,
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::Network("mock script exhausted".into()))?;
        Ok(ProviderResponse {
            message: Message::assistant(reply),
            usage: None,
            model: "mock-model".into(),
        })
    }
}

pub struct MockImageProvider {
    image: Option<Vec<u8>>,
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    fn name(&self) -> &str {
        "mock-image"
    }

    async fn generate(&self, request: ImageRequest) -> Result<ImageResponse, ProviderError> {
        Ok(ImageResponse {
            images: self
                .image
                .iter()
                .map(|bytes| GeneratedImage {
                    bytes: bytes.clone(),
                    mime_type: "image/png".into(),
                })
                .collect(),
            text: self.image.is_none().then(|| "I only speak in words.".to_string()),
            model: request.model,
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: SqliteStore,
    pub provider: Arc<MockProvider>,
    pub media_dir: tempfile::TempDir,
}

/// A router over an in-memory store and a temp media directory.
pub async fn test_app(replies: &[&str], image: Option<Vec<u8>>) -> TestApp {
    let store = SqliteStore::in_memory().await.unwrap();
    let media_dir = tempfile::tempdir().unwrap();

    let mut config = AppConfig::default();
    config.storage.local_dir = media_dir.path().to_path_buf();

    let provider = Arc::new(MockProvider {
        replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        requests: Mutex::new(Vec::new()),
    });
    let images = Arc::new(MockImageProvider { image });
    let media = Arc::new(LocalMediaStore::new(media_dir.path(), &config.storage.public_base));

    let state = AppState::new(config, store.clone(), provider.clone(), images, media);
    TestApp {
        router: build_router(Arc::new(state)),
        store,
        provider,
        media_dir,
    }
}

pub fn request(method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(width, height);
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}
