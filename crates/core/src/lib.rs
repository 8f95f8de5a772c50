//! # Cutify Core
//!
//! Domain types, traits, and error definitions for the Cutify production
//! backend. This crate has **no framework dependencies**: it defines the
//! model (projects, scenes, shots, cast) and the seams (LLM providers, image
//! providers, media storage, agent tools) that the other crates implement.
//!
//! ## Layout
//!
//! - [`model`]: persisted entities and their API views
//! - [`provider`]: chat and image generation traits
//! - [`storage`]: where generated bitmaps end up
//! - [`tool`]: functions the showrunner agent may call
//! - [`event`]: broadcast bus for pipeline events

pub mod error;
pub mod event;
pub mod message;
pub mod model;
pub mod provider;
pub mod storage;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use message::{Message, MessageToolCall, Role};
pub use model::{
    AiLog, AiLogStatus, AssetInput, Character, CharacterId, ChatRecord, ChatRole, ConceptDraft,
    Location, LocationId, NewProject, Project, ProjectDetail, ProjectId, ProjectUpdate, Scene,
    SceneBreakdown, SceneDetail, SceneId, SceneStatus, SceneUpdate, Shot,
};
pub use provider::{
    GeneratedImage, ImageProvider, ImageRequest, ImageResponse, Provider, ProviderRequest,
    ProviderResponse, ToolDefinition,
};
pub use storage::MediaStore;
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
