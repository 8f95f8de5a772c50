//! Provider traits: the abstraction over generative backends.
//!
//! A [`Provider`] knows how to send a conversation to an LLM and get a
//! message back, optionally with tool calls. An [`ImageProvider`] turns a
//! prompt into one or more bitmaps.
//!
//! Implementations live in `cutify-providers`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

/// Configuration for a chat provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "gemini-2.0-flash")
    pub model: String,

    /// The conversation messages
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Ask the model for a single JSON document instead of prose
    #[serde(default)]
    pub json_mode: bool,
}

fn default_temperature() -> f32 {
    0.7
}

impl ProviderRequest {
    /// A single-prompt request with no tools.
    pub fn prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![Message::user(prompt)],
            temperature: default_temperature(),
            max_tokens: None,
            tools: Vec::new(),
            json_mode: false,
        }
    }

    pub fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// A tool definition sent to the LLM so it knows what tools it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A complete response from a chat provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated message
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The chat Provider trait.
///
/// The agent loop and the one-shot services call `complete()` without knowing
/// which backend answers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini", "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError>;

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

/// A request for a generated image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    /// Requested aspect ratio, e.g. "1:1", "3:4", "16:9"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
}

/// One bitmap returned by an image provider.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// The result of an image generation call.
///
/// `images` may be empty: multimodal models sometimes answer with text only
/// (refusals, clarifying questions). Callers decide whether that is an error.
#[derive(Debug, Clone)]
pub struct ImageResponse {
    pub images: Vec<GeneratedImage>,
    pub text: Option<String>,
    pub model: String,
}

impl ImageResponse {
    /// Take the first image, if any.
    pub fn into_first_image(self) -> Option<GeneratedImage> {
        self.images.into_iter().next()
    }
}

#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(
        &self,
        request: ImageRequest,
    ) -> std::result::Result<ImageResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_request_defaults() {
        let req = ProviderRequest::prompt("gemini-2.0-flash", "Write a scene");
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert!(!req.json_mode);
        assert_eq!(req.messages.len(), 1);
        assert!(req.with_json_mode().json_mode);
    }

    #[test]
    fn tool_definition_serialization() {
        let tool = ToolDefinition {
            name: "add_scene".into(),
            description: "Append a scene".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string" }
                },
                "required": ["title"]
            }),
        };
        let json = serde_json::to_string(&tool).unwrap();
        assert!(json.contains("add_scene"));
        assert!(json.contains("title"));
    }

    #[test]
    fn image_response_first_image() {
        let resp = ImageResponse {
            images: vec![GeneratedImage {
                bytes: vec![1, 2, 3],
                mime_type: "image/png".into(),
            }],
            text: None,
            model: "img".into(),
        };
        assert_eq!(resp.into_first_image().unwrap().bytes, vec![1, 2, 3]);
    }
}
