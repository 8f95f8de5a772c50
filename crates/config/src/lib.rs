//! Configuration loading, validation, and management for Cutify.
//!
//! Loads `cutify.toml` (explicit path, working directory, then
//! `~/.cutify/config.toml`) with environment variable overrides, and
//! validates the result at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key shared by the chat and image providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Chat provider name ("gemini", "openai", "openrouter", "ollama", ...)
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Model behind the showrunner chat, screenwriter and scriptwriter
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used for JSON concept extraction
    #[serde(default = "default_extraction_model")]
    pub extraction_model: String,

    /// Image-capable model used for storyboards and asset portraits
    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Provider-specific overrides
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub logs: LogsConfig,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_chat_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_extraction_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_image_model() -> String {
    "gemini-3-pro-image-preview".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    8192
}

const REDACTED: &str = "[REDACTED]";

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => REDACTED,
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("chat_model", &self.chat_model)
            .field("extraction_model", &self.extraction_model)
            .field("image_model", &self.image_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("providers", &self.providers)
            .field("database", &self.database)
            .field("storage", &self.storage)
            .field("gateway", &self.gateway)
            .field("agent", &self.agent)
            .field("logs", &self.logs)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL, e.g. `sqlite://cutify.db` or `sqlite::memory:`
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_url() -> String {
    "sqlite://cutify.db".into()
}
fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

pub const STORAGE_LOCAL: &str = "local";
pub const STORAGE_SUPABASE: &str = "supabase";

/// Where generated images are written.
#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// "local" or "supabase"
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// Root directory for the local backend; also served under `/static`
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,

    /// URL prefix for files written by the local backend
    #[serde(default = "default_public_base")]
    pub public_base: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_key: Option<String>,

    #[serde(default = "default_bucket")]
    pub bucket: String,
}

fn default_storage_backend() -> String {
    STORAGE_LOCAL.into()
}
fn default_local_dir() -> PathBuf {
    PathBuf::from("static")
}
fn default_public_base() -> String {
    "/static".into()
}
fn default_bucket() -> String {
    "cutify-assets".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            local_dir: default_local_dir(),
            public_base: default_public_base(),
            supabase_url: None,
            supabase_key: None,
            bucket: default_bucket(),
        }
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend", &self.backend)
            .field("local_dir", &self.local_dir)
            .field("public_base", &self.public_base)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &redact(&self.supabase_key))
            .field("bucket", &self.bucket)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Allowed CORS origins; `["*"]` allows any
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Request body limit in bytes
    #[serde(default = "default_body_limit")]
    pub max_body_bytes: usize,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".into()]
}
fn default_body_limit() -> usize {
    2 * 1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            cors_origins: default_cors_origins(),
            max_body_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Max provider round-trips per chat turn
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// How many persisted chat turns are replayed to the model
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

fn default_max_iterations() -> usize {
    5
}
fn default_history_limit() -> u32 {
    50
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            history_limit: default_history_limit(),
        }
    }
}

/// AI call log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    /// Default page size for `GET /api/debug/ai-logs`
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u32,
}

fn default_recent_limit() -> u32 {
    100
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

impl AppConfig {
    /// Load configuration, looking in the usual places.
    ///
    /// Order: `explicit` path (must exist), `./cutify.toml`,
    /// `~/.cutify/config.toml`, then built-in defaults. Environment variables
    /// are applied last and the result is validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    reason: "file does not exist".into(),
                });
            }
            Some(path) => Self::load_from(path)?,
            None => {
                let local = PathBuf::from("cutify.toml");
                if local.exists() {
                    Self::load_from(&local)?
                } else {
                    Self::load_from(&Self::config_dir().join("config.toml"))?
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// The API key is only taken from the environment when the file did not
    /// set one; `CUTIFY_API_KEY` beats `GOOGLE_API_KEY` beats `GENAI_API_KEY`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.is_none() {
            self.api_key = lookup("CUTIFY_API_KEY")
                .or_else(|| lookup("GOOGLE_API_KEY"))
                .or_else(|| lookup("GENAI_API_KEY"));
        }
        if let Some(provider) = lookup("CUTIFY_PROVIDER") {
            self.default_provider = provider;
        }
        if let Some(model) = lookup("CUTIFY_CHAT_MODEL") {
            self.chat_model = model;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(backend) = lookup("CUTIFY_STORAGE") {
            self.storage.backend = backend;
        }
        if let Some(url) = lookup("SUPABASE_URL") {
            self.storage.supabase_url = Some(url);
        }
        if let Some(key) = lookup("SUPABASE_KEY") {
            self.storage.supabase_key = Some(key);
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs_home().join(".cutify")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be > 0".into(),
            ));
        }

        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be > 0".into(),
            ));
        }

        match self.storage.backend.as_str() {
            STORAGE_LOCAL => {}
            STORAGE_SUPABASE => {
                if self.storage.supabase_url.is_none() || self.storage.supabase_key.is_none() {
                    return Err(ConfigError::ValidationError(
                        "storage.backend = \"supabase\" requires supabase_url and supabase_key".into(),
                    ));
                }
            }
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown storage backend '{other}' (expected \"local\" or \"supabase\")"
                )));
            }
        }

        Ok(())
    }

    /// API key for `provider`: its own section first, then the shared key.
    pub fn api_key_for(&self, provider: &str) -> Option<String> {
        self.providers
            .get(provider)
            .and_then(|p| p.api_key.clone())
            .or_else(|| self.api_key.clone())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key_for(&self.default_provider).is_some()
    }

    /// The effective config as TOML with every secret replaced.
    pub fn redacted_toml(&self) -> String {
        let mut copy = self.clone();
        let hide = |s: &mut Option<String>| {
            if s.is_some() {
                *s = Some(REDACTED.into());
            }
        };
        hide(&mut copy.api_key);
        hide(&mut copy.storage.supabase_key);
        for provider in copy.providers.values_mut() {
            hide(&mut provider.api_key);
        }
        toml::to_string_pretty(&copy).unwrap_or_default()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            chat_model: default_chat_model(),
            extraction_model: default_extraction_model(),
            image_model: default_image_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            providers: HashMap::new(),
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            gateway: GatewayConfig::default(),
            agent: AgentConfig::default(),
            logs: LogsConfig::default(),
        }
    }
}

fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
