//! SQLite connection, schema bootstrap and row mapping.
//!
//! One database file holds every table:
//! - `projects`, `scenes`, `shots`: the production hierarchy
//! - `characters`, `locations`, `scene_characters`: the cast
//! - `chat_messages`: per-project showrunner conversation
//! - `ai_logs`: every generative model call
//!
//! Foreign keys are enforced, so deleting a project cascades to its rows.

use chrono::{DateTime, Utc};
use cutify_core::error::StoreError;
use cutify_core::model::*;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// SQLite-backed persistence for every Cutify entity.
#[derive(Clone)]
pub struct SqliteStore {
    pub(crate) pool: SqlitePool,
}

const SCHEMA: &[(&str, &str)] = &[
    (
        "projects table",
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            title           TEXT NOT NULL,
            genre           TEXT,
            pitch           TEXT,
            visual_style    TEXT,
            target_audience TEXT,
            language        TEXT NOT NULL DEFAULT 'French',
            target_duration TEXT NOT NULL DEFAULT '60s',
            aspect_ratio    TEXT NOT NULL DEFAULT '16:9',
            status          TEXT NOT NULL DEFAULT 'concept',
            created_at      TEXT NOT NULL
        )
        "#,
    ),
    (
        "locations table",
        r#"
        CREATE TABLE IF NOT EXISTS locations (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id  INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            name        TEXT NOT NULL,
            description TEXT,
            ambiance    TEXT,
            image_url   TEXT
        )
        "#,
    ),
    (
        "characters table",
        r#"
        CREATE TABLE IF NOT EXISTS characters (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id  INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            name        TEXT NOT NULL,
            description TEXT,
            traits      TEXT,
            image_url   TEXT
        )
        "#,
    ),
    (
        "scenes table",
        r#"
        CREATE TABLE IF NOT EXISTS scenes (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id         INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            sequence_order     INTEGER NOT NULL,
            title              TEXT NOT NULL,
            summary            TEXT NOT NULL DEFAULT '',
            estimated_duration TEXT,
            script             TEXT,
            status             TEXT NOT NULL DEFAULT 'pending',
            storyboard_url     TEXT,
            location_id        INTEGER REFERENCES locations(id) ON DELETE SET NULL,
            created_at         TEXT NOT NULL
        )
        "#,
    ),
    (
        "shots table",
        r#"
        CREATE TABLE IF NOT EXISTS shots (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            scene_id    INTEGER NOT NULL REFERENCES scenes(id) ON DELETE CASCADE,
            shot_number INTEGER NOT NULL,
            image_url   TEXT NOT NULL,
            label       TEXT NOT NULL,
            status      TEXT NOT NULL DEFAULT 'done'
        )
        "#,
    ),
    (
        "scene_characters table",
        r#"
        CREATE TABLE IF NOT EXISTS scene_characters (
            scene_id     INTEGER NOT NULL REFERENCES scenes(id) ON DELETE CASCADE,
            character_id INTEGER NOT NULL REFERENCES characters(id) ON DELETE CASCADE,
            PRIMARY KEY (scene_id, character_id)
        )
        "#,
    ),
    (
        "chat_messages table",
        r#"
        CREATE TABLE IF NOT EXISTS chat_messages (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            role       TEXT NOT NULL,
            content    TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "ai_logs table",
        r#"
        CREATE TABLE IF NOT EXISTS ai_logs (
            id              TEXT PRIMARY KEY,
            created_at      TEXT NOT NULL,
            service         TEXT NOT NULL,
            prompt          TEXT NOT NULL,
            response        TEXT,
            images          TEXT NOT NULL DEFAULT '[]',
            response_images TEXT NOT NULL DEFAULT '[]',
            error           TEXT,
            status          TEXT NOT NULL DEFAULT 'pending'
        )
        "#,
    ),
    (
        "scenes order index",
        "CREATE INDEX IF NOT EXISTS idx_scenes_project_order ON scenes(project_id, sequence_order)",
    ),
    (
        "shots index",
        "CREATE INDEX IF NOT EXISTS idx_shots_scene ON shots(scene_id, shot_number)",
    ),
    (
        "chat index",
        "CREATE INDEX IF NOT EXISTS idx_chat_project ON chat_messages(project_id, id)",
    ),
    (
        "ai_logs index",
        "CREATE INDEX IF NOT EXISTS idx_ai_logs_created_at ON ai_logs(created_at DESC)",
    ),
];

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and bootstrap the schema.
    ///
    /// `sqlite::memory:` gives a private in-process database; it is pinned to
    /// a single long-lived connection so every query sees the same data.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let in_memory = url.contains(":memory:");

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Database(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new();
        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!(url, "SQLite store initialized");
        Ok(store)
    }

    /// Ephemeral database, mostly for tests.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:", 1).await
    }

    /// Wrap an existing pool and bootstrap the schema.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create every table and index that does not exist yet.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        for (what, sql) in SCHEMA {
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::MigrationFailed(format!("{what}: {e}")))?;
        }
        debug!("SQLite schema ready");
        Ok(())
    }

    /// Round-trip a trivial query.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("health check: {e}")))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// --- error & row helpers ---

pub(crate) fn query_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| StoreError::QueryFailed(format!("{context}: {e}"))
}

pub(crate) fn now_string() -> String {
    Utc::now().to_rfc3339()
}

fn col<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| StoreError::QueryFailed(format!("{name} column: {e}")))
}

fn time_col(row: &SqliteRow, name: &str) -> Result<DateTime<Utc>, StoreError> {
    let raw: String = col(row, name)?;
    Ok(DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now()))
}

fn parsed_col<T: FromStr<Err = String>>(row: &SqliteRow, name: &str) -> Result<T, StoreError> {
    let raw: String = col(row, name)?;
    raw.parse()
        .map_err(|e: String| StoreError::QueryFailed(format!("{name} column: {e}")))
}

fn json_list_col(row: &SqliteRow, name: &str) -> Result<Vec<String>, StoreError> {
    let raw: String = col(row, name)?;
    Ok(serde_json::from_str(&raw).unwrap_or_default())
}

pub(crate) fn project_from_row(row: &SqliteRow) -> Result<Project, StoreError> {
    Ok(Project {
        id: col(row, "id")?,
        title: col(row, "title")?,
        genre: col(row, "genre")?,
        pitch: col(row, "pitch")?,
        visual_style: col(row, "visual_style")?,
        target_audience: col(row, "target_audience")?,
        language: col(row, "language")?,
        target_duration: col(row, "target_duration")?,
        aspect_ratio: col(row, "aspect_ratio")?,
        status: col(row, "status")?,
        created_at: time_col(row, "created_at")?,
    })
}

pub(crate) fn scene_from_row(row: &SqliteRow) -> Result<Scene, StoreError> {
    Ok(Scene {
        id: col(row, "id")?,
        project_id: col(row, "project_id")?,
        sequence_order: col(row, "sequence_order")?,
        title: col(row, "title")?,
        summary: col(row, "summary")?,
        estimated_duration: col(row, "estimated_duration")?,
        script: col(row, "script")?,
        status: parsed_col(row, "status")?,
        storyboard_url: col(row, "storyboard_url")?,
        location_id: col(row, "location_id")?,
        created_at: time_col(row, "created_at")?,
    })
}

pub(crate) fn shot_from_row(row: &SqliteRow) -> Result<Shot, StoreError> {
    Ok(Shot {
        id: col(row, "id")?,
        scene_id: col(row, "scene_id")?,
        shot_number: col(row, "shot_number")?,
        image_url: col(row, "image_url")?,
        label: col(row, "label")?,
        status: col(row, "status")?,
    })
}

pub(crate) fn character_from_row(row: &SqliteRow) -> Result<Character, StoreError> {
    Ok(Character {
        id: col(row, "id")?,
        project_id: col(row, "project_id")?,
        name: col(row, "name")?,
        description: col(row, "description")?,
        traits: col(row, "traits")?,
        image_url: col(row, "image_url")?,
    })
}

pub(crate) fn location_from_row(row: &SqliteRow) -> Result<Location, StoreError> {
    Ok(Location {
        id: col(row, "id")?,
        project_id: col(row, "project_id")?,
        name: col(row, "name")?,
        description: col(row, "description")?,
        ambiance: col(row, "ambiance")?,
        image_url: col(row, "image_url")?,
    })
}

pub(crate) fn chat_from_row(row: &SqliteRow) -> Result<ChatRecord, StoreError> {
    Ok(ChatRecord {
        id: col(row, "id")?,
        project_id: col(row, "project_id")?,
        role: parsed_col(row, "role")?,
        content: col(row, "content")?,
        created_at: time_col(row, "created_at")?,
    })
}

pub(crate) fn ai_log_from_row(row: &SqliteRow) -> Result<AiLog, StoreError> {
    Ok(AiLog {
        id: col(row, "id")?,
        created_at: time_col(row, "created_at")?,
        service: col(row, "service")?,
        prompt: col(row, "prompt")?,
        response: col(row, "response")?,
        images: json_list_col(row, "images")?,
        response_images: json_list_col(row, "response_images")?,
        error: col(row, "error")?,
        status: parsed_col(row, "status")?,
    })
}
