//! SQLite persistence for Cutify.
//!
//! [`SqliteStore`] owns the connection pool; its operations are split by
//! entity across the modules below.

mod ai_log;
mod cast;
mod chat;
mod projects;
pub mod resolver;
mod scenes;
pub mod sqlite;

pub use resolver::SceneQuery;
pub use sqlite::SqliteStore;
