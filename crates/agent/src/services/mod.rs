//! One-shot generation services: concept extraction, scene breakdown,
//! scripts, storyboards and reference portraits.
//!
//! Each call is recorded through [`AiLogger`].

pub mod ai_logger;
pub mod asset_artist;
pub mod concept;
pub mod director;
pub mod screenwriter;
pub mod scriptwriter;

pub use ai_logger::AiLogger;
pub use asset_artist::AssetArtist;
pub use concept::ConceptExtractor;
pub use director::Director;
pub use screenwriter::Screenwriter;
pub use scriptwriter::Scriptwriter;

use cutify_config::AppConfig;

/// Models and sampling settings shared by the services.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub chat_model: String,
    pub extraction_model: String,
    pub image_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ModelSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            chat_model: config.chat_model.clone(),
            extraction_model: config.extraction_model.clone(),
            image_model: config.image_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Strip a surrounding markdown code fence (```json ... ```), if any.
pub(crate) fn strip_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        // Drop the info string ("json") up to the first newline.
        s = rest.split_once('\n').map_or(rest, |(_, body)| body);
        s = s.trim_end();
        s = s.strip_suffix("```").unwrap_or(s);
    }
    s.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_fences("```\n[1]\n```  "), "[1]");
        assert_eq!(strip_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }
}
