//! Provider router: selects the chat provider based on config.

use std::collections::HashMap;
use std::sync::Arc;

use cutify_core::provider::{ImageProvider, Provider};

use crate::gemini_image::{GEMINI_API_BASE, GeminiImageProvider};
use crate::openai_compat::OpenAiCompatProvider;

/// Config section that can override the image endpoint.
pub const IMAGE_PROVIDER_SECTION: &str = "gemini_image";

/// Routes LLM requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    pub fn default_name(&self) -> &str {
        &self.default_provider
    }

    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Build chat providers from configuration.
///
/// Every `[providers.<name>]` section becomes an OpenAI-compatible client;
/// the default provider is always registered, configured or not.
pub fn build_from_config(config: &cutify_config::AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        if name == IMAGE_PROVIDER_SECTION {
            continue;
        }
        let api_key = config.api_key_for(name).unwrap_or_default();
        let base_url = provider_config
            .api_url
            .clone()
            .unwrap_or_else(|| default_base_url(name));

        router.register(
            name.clone(),
            Arc::new(OpenAiCompatProvider::new(name, &base_url, &api_key)),
        );
    }

    if router.get(&config.default_provider).is_none() {
        let api_key = config.api_key_for(&config.default_provider).unwrap_or_default();
        let base_url = default_base_url(&config.default_provider);
        router.register(
            config.default_provider.clone(),
            Arc::new(OpenAiCompatProvider::new(
                &config.default_provider,
                &base_url,
                &api_key,
            )),
        );
    }

    router
}

/// Build the image provider (native Gemini endpoint).
pub fn build_image_provider(config: &cutify_config::AppConfig) -> Arc<dyn ImageProvider> {
    let section = config.providers.get(IMAGE_PROVIDER_SECTION);
    let api_key = section
        .and_then(|p| p.api_key.clone())
        .or_else(|| config.api_key_for("gemini"))
        .unwrap_or_default();
    let base_url = section
        .and_then(|p| p.api_url.clone())
        .unwrap_or_else(|| GEMINI_API_BASE.to_string());

    Arc::new(GeminiImageProvider::with_base_url(base_url, api_key))
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "gemini" | "google" => "https://generativelanguage.googleapis.com/v1beta/openai".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
