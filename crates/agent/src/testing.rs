//! Scripted providers for unit tests.

use async_trait::async_trait;
use cutify_core::error::ProviderError;
use cutify_core::message::Message;
use cutify_core::provider::{
    GeneratedImage, ImageProvider, ImageRequest, ImageResponse, Provider, ProviderRequest,
    ProviderResponse, Usage,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Answers with pre-recorded messages, in order, and records every request.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Message>>,
    requests: Mutex<Vec<ProviderRequest>>,
    fail: bool,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Message>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn text(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Message::assistant(*r)).collect())
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(ProviderError::Network("connection refused".into()));
        }
        let message = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 500,
                message: "script exhausted".into(),
            })?;
        Ok(ProviderResponse {
            message,
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
        })
    }
}

/// Returns one fixed image (or only text) and records prompts.
pub struct ScriptedImageProvider {
    image: Option<Vec<u8>>,
    text: Option<String>,
    requests: Mutex<Vec<ImageRequest>>,
}

impl ScriptedImageProvider {
    pub fn image(bytes: Vec<u8>) -> Self {
        Self {
            image: Some(bytes),
            text: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn text_only(text: &str) -> Self {
        Self {
            image: None,
            text: Some(text.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageProvider for ScriptedImageProvider {
    fn name(&self) -> &str {
        "scripted-image"
    }

    async fn generate(&self, request: ImageRequest) -> Result<ImageResponse, ProviderError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);
        Ok(ImageResponse {
            images: self
                .image
                .iter()
                .map(|bytes| GeneratedImage {
                    bytes: bytes.clone(),
                    mime_type: "image/png".into(),
                })
                .collect(),
            text: self.text.clone(),
            model,
        })
    }
}

/// A PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(width, height);
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}
