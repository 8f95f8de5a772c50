//! Provider implementations for Cutify.
//!
//! Chat providers implement `cutify_core::Provider`; the storyboard and
//! asset image model implements `cutify_core::ImageProvider`. The router
//! builds both from configuration.

mod http;
pub mod gemini_image;
pub mod openai_compat;
pub mod router;

pub use gemini_image::GeminiImageProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config, build_image_provider};
