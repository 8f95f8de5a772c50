//! Persisted record of every generative model call.

use cutify_core::model::*;
use cutify_core::{Error, Result};

use crate::sqlite::{SqliteStore, ai_log_from_row, query_err};

impl SqliteStore {
    pub async fn insert_ai_log(&self, log: &AiLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ai_logs
                (id, created_at, service, prompt, response, images, response_images, error, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&log.id)
        .bind(log.created_at.to_rfc3339())
        .bind(&log.service)
        .bind(&log.prompt)
        .bind(&log.response)
        .bind(serde_json::to_string(&log.images)?)
        .bind(serde_json::to_string(&log.response_images)?)
        .bind(&log.error)
        .bind(log.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(query_err("insert ai log"))?;
        Ok(())
    }

    /// Close a pending log: `success` unless an error is given.
    pub async fn finish_ai_log(
        &self,
        id: &str,
        response: Option<&str>,
        response_images: &[String],
        error: Option<&str>,
    ) -> Result<()> {
        let status = if error.is_some() {
            AiLogStatus::Error
        } else {
            AiLogStatus::Success
        };

        let result = sqlx::query(
            "UPDATE ai_logs SET response = ?2, response_images = ?3, error = ?4, status = ?5 \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(response)
        .bind(serde_json::to_string(response_images)?)
        .bind(error)
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(query_err("finish ai log"))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("ai log", id));
        }
        Ok(())
    }

    /// Most recent logs first.
    pub async fn recent_ai_logs(&self, limit: u32) -> Result<Vec<AiLog>> {
        let rows =
            sqlx::query("SELECT * FROM ai_logs ORDER BY created_at DESC, rowid DESC LIMIT ?1")
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await
                .map_err(query_err("recent ai logs"))?;
        rows.iter()
            .map(|row| ai_log_from_row(row).map_err(Error::from))
            .collect()
    }

    /// Remove every log; returns how many were deleted.
    pub async fn clear_ai_logs(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM ai_logs")
            .execute(&self.pool)
            .await
            .map_err(query_err("clear ai logs"))?;
        Ok(result.rows_affected())
    }
}
