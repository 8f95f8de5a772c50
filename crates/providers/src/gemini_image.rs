//! Native Gemini `generateContent` client for image-capable models.
//!
//! The OpenAI-compatible surface does not return inline images, so
//! storyboards and asset portraits go through the native endpoint and read
//! base64 `inlineData` parts out of the first candidate.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use cutify_core::error::ProviderError;
use cutify_core::provider::{GeneratedImage, ImageProvider, ImageRequest, ImageResponse};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::http::{build_client, check_status};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiImageProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiImageProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(GEMINI_API_BASE, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: build_client(),
        }
    }

    fn request_body(request: &ImageRequest) -> serde_json::Value {
        let mut generation_config = serde_json::json!({
            "responseModalities": ["TEXT", "IMAGE"],
        });
        if let Some(ratio) = &request.aspect_ratio {
            generation_config["imageConfig"] = serde_json::json!({ "aspectRatio": ratio });
        }

        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
            "generationConfig": generation_config,
        })
    }

    fn parse_response(
        api: GenerateContentResponse,
        model: &str,
    ) -> Result<ImageResponse, ProviderError> {
        let mut images = Vec::new();
        let mut texts = Vec::new();

        let parts = api
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        for part in parts {
            if let Some(inline) = part.inline_data {
                let bytes = BASE64.decode(inline.data.as_bytes()).map_err(|e| {
                    ProviderError::ApiError {
                        status_code: 200,
                        message: format!("Invalid base64 image data: {e}"),
                    }
                })?;
                images.push(GeneratedImage {
                    bytes,
                    mime_type: inline.mime_type,
                });
            } else if let Some(text) = part.text {
                texts.push(text);
            }
        }

        if let Some(reason) = api.prompt_feedback.and_then(|f| f.block_reason) {
            warn!(model, reason = %reason, "Image prompt was blocked");
            texts.push(format!("Prompt blocked: {reason}"));
        }

        Ok(ImageResponse {
            images,
            text: (!texts.is_empty()).then(|| texts.join("\n")),
            model: api.model_version.unwrap_or_else(|| model.to_string()),
        })
    }
}

#[async_trait]
impl ImageProvider for GeminiImageProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: ImageRequest) -> Result<ImageResponse, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        let body = Self::request_body(&request);

        debug!(
            model = %request.model,
            aspect_ratio = ?request.aspect_ratio,
            prompt_len = request.prompt.len(),
            "Sending image generation request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let response = check_status("gemini", response).await?;

        let api: GenerateContentResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        Self::parse_response(api, &request.model)
    }
}

// --- Gemini API types (internal) ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_prompt_and_aspect_ratio() {
        let request = ImageRequest {
            model: "gemini-3-pro-image-preview".into(),
            prompt: "3x3 storyboard grid".into(),
            aspect_ratio: Some("16:9".into()),
        };
        let body = GeminiImageProvider::request_body(&request);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "3x3 storyboard grid");
        assert_eq!(body["generationConfig"]["imageConfig"]["aspectRatio"], "16:9");
        assert_eq!(body["generationConfig"]["responseModalities"][1], "IMAGE");
    }

    #[test]
    fn body_without_aspect_ratio() {
        let request = ImageRequest {
            model: "m".into(),
            prompt: "p".into(),
            aspect_ratio: None,
        };
        let body = GeminiImageProvider::request_body(&request);
        assert!(body["generationConfig"].get("imageConfig").is_none());
    }

    #[test]
    fn parse_inline_image_and_text() {
        let data = BASE64.encode([0x89, b'P', b'N', b'G']);
        let json = format!(
            r#"{{
                "candidates": [{{
                    "content": {{
                        "parts": [
                            {{"text": "Here is your storyboard"}},
                            {{"inlineData": {{"mimeType": "image/png", "data": "{data}"}}}}
                        ]
                    }}
                }}],
                "modelVersion": "gemini-3-pro-image-preview"
            }}"#
        );
        let api: GenerateContentResponse = serde_json::from_str(&json).unwrap();
        let resp = GeminiImageProvider::parse_response(api, "requested").unwrap();
        assert_eq!(resp.model, "gemini-3-pro-image-preview");
        assert_eq!(resp.text.as_deref(), Some("Here is your storyboard"));
        assert_eq!(resp.images.len(), 1);
        assert_eq!(resp.images[0].mime_type, "image/png");
        assert_eq!(resp.images[0].bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn parse_text_only_response() {
        let json = r#"{"candidates": [{"content": {"parts": [{"text": "I cannot draw that."}]}}]}"#;
        let api: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let resp = GeminiImageProvider::parse_response(api, "m").unwrap();
        assert!(resp.images.is_empty());
        assert_eq!(resp.text.as_deref(), Some("I cannot draw that."));
        assert_eq!(resp.model, "m");
    }

    #[test]
    fn parse_blocked_prompt() {
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let api: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let resp = GeminiImageProvider::parse_response(api, "m").unwrap();
        assert!(resp.images.is_empty());
        assert!(resp.text.unwrap().contains("SAFETY"));
    }

    #[test]
    fn parse_bad_base64_is_error() {
        let json = r#"{"candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "image/png", "data": "***"}}
        ]}}]}"#;
        let api: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(GeminiImageProvider::parse_response(api, "m").is_err());
    }
}
