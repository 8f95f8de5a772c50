//! Persisted entities and the input/patch shapes used to change them.
//!
//! Row ids are SQLite `INTEGER PRIMARY KEY`s, hence `i64`. AI call logs are
//! the exception and use UUID strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ProjectId = i64;
pub type SceneId = i64;
pub type CharacterId = i64;
pub type LocationId = i64;

pub const DEFAULT_LANGUAGE: &str = "French";
pub const DEFAULT_TARGET_DURATION: &str = "60s";
pub const DEFAULT_ASPECT_RATIO: &str = "16:9";
pub const DEFAULT_PROJECT_STATUS: &str = "concept";

// --- Projects ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub genre: Option<String>,
    pub pitch: Option<String>,
    pub visual_style: Option<String>,
    pub target_audience: Option<String>,
    pub language: String,
    pub target_duration: String,
    pub aspect_ratio: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating a project. Unset fields take the
/// column defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub pitch: Option<String>,
    #[serde(default)]
    pub visual_style: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub target_duration: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
}

/// Partial update: only `Some` fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub pitch: Option<String>,
    #[serde(default)]
    pub visual_style: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub target_duration: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.genre.is_none()
            && self.pitch.is_none()
            && self.visual_style.is_none()
            && self.target_audience.is_none()
            && self.language.is_none()
            && self.target_duration.is_none()
            && self.aspect_ratio.is_none()
            && self.status.is_none()
    }
}

/// A project with everything hanging off it, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub scenes: Vec<Scene>,
    pub characters: Vec<Character>,
    pub locations: Vec<Location>,
}

// --- Scenes ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SceneStatus {
    #[default]
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
}

impl SceneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for SceneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SceneStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown scene status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub project_id: ProjectId,
    pub sequence_order: i64,
    pub title: String,
    pub summary: String,
    pub estimated_duration: Option<String>,
    pub script: Option<String>,
    pub status: SceneStatus,
    pub storyboard_url: Option<String>,
    pub location_id: Option<LocationId>,
    pub created_at: DateTime<Utc>,
}

/// Partial scene update. `location_id: Some(None)` detaches the location.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub status: Option<SceneStatus>,
    #[serde(default)]
    pub estimated_duration: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub location_id: Option<Option<LocationId>>,
    /// Replaces the scene's cast when present.
    #[serde(default)]
    pub character_ids: Option<Vec<CharacterId>>,
}

impl SceneUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.summary.is_none()
            && self.script.is_none()
            && self.status.is_none()
            && self.estimated_duration.is_none()
            && self.location_id.is_none()
    }
}

/// A scene with its shots and cast, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct SceneDetail {
    #[serde(flatten)]
    pub scene: Scene,
    pub shots: Vec<Shot>,
    pub character_ids: Vec<CharacterId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub id: i64,
    pub scene_id: SceneId,
    pub shot_number: i64,
    pub image_url: String,
    pub label: String,
    pub status: String,
}

// --- Cast ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub project_id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub traits: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub project_id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub ambiance: Option<String>,
    pub image_url: Option<String>,
}

/// Create/update payload shared by characters and locations.
///
/// `detail` is `traits` for a character and `ambiance` for a location; the
/// API accepts either name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "traits", alias = "ambiance")]
    pub detail: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

// --- Chat ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Agent,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
        }
    }
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "agent" | "assistant" | "model" => Ok(Self::Agent),
            other => Err(format!("unknown chat role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: i64,
    pub project_id: ProjectId,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// --- AI call logs ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiLogStatus {
    Pending,
    Success,
    Error,
}

impl AiLogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl FromStr for AiLogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log status '{other}'")),
        }
    }
}

/// One recorded call to a generative model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiLog {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub service: String,
    pub prompt: String,
    pub response: Option<String>,
    /// URLs of images sent with the prompt
    pub images: Vec<String>,
    /// URLs of images the model produced
    pub response_images: Vec<String>,
    pub error: Option<String>,
    pub status: AiLogStatus,
}

// --- Generation outputs ---

fn tbd() -> String {
    "TBD".to_string()
}

/// Structured concept pulled out of a concept-phase chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptDraft {
    #[serde(default = "tbd", deserialize_with = "text_or_tbd")]
    pub title: String,
    #[serde(default = "tbd", deserialize_with = "text_or_tbd")]
    pub genre: String,
    #[serde(default = "tbd", deserialize_with = "text_or_tbd")]
    pub pitch: String,
    #[serde(default = "tbd", deserialize_with = "text_or_tbd")]
    pub visual_style: String,
    #[serde(default = "tbd", deserialize_with = "text_or_tbd")]
    pub target_audience: String,
}

impl Default for ConceptDraft {
    fn default() -> Self {
        Self {
            title: tbd(),
            genre: tbd(),
            pitch: tbd(),
            visual_style: tbd(),
            target_audience: tbd(),
        }
    }
}

impl From<ConceptDraft> for NewProject {
    fn from(c: ConceptDraft) -> Self {
        Self {
            title: c.title,
            genre: Some(c.genre),
            pitch: Some(c.pitch),
            visual_style: Some(c.visual_style),
            target_audience: Some(c.target_audience),
            ..Default::default()
        }
    }
}

/// A scene as proposed by the screenwriter, before it has an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneStub {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub estimated_duration: Option<String>,
    /// Character names appearing in the scene
    #[serde(default)]
    pub characters: Vec<String>,
    /// Location name
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterStub {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub traits: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationStub {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ambiance: Option<String>,
}

/// The screenwriter's full answer: ordered scenes plus an optional cast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneBreakdown {
    pub scenes: Vec<SceneStub>,
    #[serde(default)]
    pub characters: Vec<CharacterStub>,
    #[serde(default)]
    pub locations: Vec<LocationStub>,
}

// --- serde helpers ---

fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Models sometimes answer `null` or `""` for a field they could not fill.
fn text_or_tbd<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(de)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => tbd(),
    })
}

/// Accepts strings, numbers and string lists ("90" / 90 / ["brave", "loyal"]).
fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(de)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Array(items)) => {
            let parts: Vec<String> = items
                .into_iter()
                .filter_map(|v| match v {
                    serde_json::Value::String(s) => Some(s),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    })
}
