use cutify_core::model::*;
use cutify_core::{Error, Result};
use tracing::debug;

use crate::sqlite::{SqliteStore, now_string, project_from_row, query_err};

impl SqliteStore {
    pub async fn create_project(&self, input: &NewProject) -> Result<Project> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidInput("project title must not be empty".into()));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO projects
                (title, genre, pitch, visual_style, target_audience,
                 language, target_duration, aspect_ratio, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(title)
        .bind(&input.genre)
        .bind(&input.pitch)
        .bind(&input.visual_style)
        .bind(&input.target_audience)
        .bind(input.language.as_deref().unwrap_or(DEFAULT_LANGUAGE))
        .bind(input.target_duration.as_deref().unwrap_or(DEFAULT_TARGET_DURATION))
        .bind(input.aspect_ratio.as_deref().unwrap_or(DEFAULT_ASPECT_RATIO))
        .bind(DEFAULT_PROJECT_STATUS)
        .bind(now_string())
        .execute(&self.pool)
        .await
        .map_err(query_err("insert project"))?;

        let id = result.last_insert_rowid();
        debug!(project_id = id, "Created project");
        self.get_project(id).await
    }

    pub async fn get_project(&self, id: ProjectId) -> Result<Project> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err("select project"))?
            .ok_or_else(|| Error::not_found("project", id))?;
        Ok(project_from_row(&row)?)
    }

    /// All projects, newest first.
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query("SELECT * FROM projects ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(query_err("list projects"))?;
        rows.iter()
            .map(|row| project_from_row(row).map_err(Error::from))
            .collect()
    }

    /// Write every `Some` field of `update`; the rest stay as they are.
    pub async fn update_project(&self, id: ProjectId, update: &ProjectUpdate) -> Result<Project> {
        let result = sqlx::query(
            r#"
            UPDATE projects SET
                title           = COALESCE(?2, title),
                genre           = COALESCE(?3, genre),
                pitch           = COALESCE(?4, pitch),
                visual_style    = COALESCE(?5, visual_style),
                target_audience = COALESCE(?6, target_audience),
                language        = COALESCE(?7, language),
                target_duration = COALESCE(?8, target_duration),
                aspect_ratio    = COALESCE(?9, aspect_ratio),
                status          = COALESCE(?10, status)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.genre)
        .bind(&update.pitch)
        .bind(&update.visual_style)
        .bind(&update.target_audience)
        .bind(&update.language)
        .bind(&update.target_duration)
        .bind(&update.aspect_ratio)
        .bind(&update.status)
        .execute(&self.pool)
        .await
        .map_err(query_err("update project"))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("project", id));
        }
        self.get_project(id).await
    }

    /// Delete a project and, through cascades, everything under it.
    pub async fn delete_project(&self, id: ProjectId) -> Result<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_err("delete project"))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("project", id));
        }
        debug!(project_id = id, "Deleted project");
        Ok(())
    }

    pub async fn project_detail(&self, id: ProjectId) -> Result<ProjectDetail> {
        let project = self.get_project(id).await?;
        Ok(ProjectDetail {
            scenes: self.list_scenes(id).await?,
            characters: self.list_characters(id).await?,
            locations: self.list_locations(id).await?,
            project,
        })
    }
}
