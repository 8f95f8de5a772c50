//! Characters, locations and the scene ↔ character join table.

use cutify_core::model::*;
use cutify_core::{Error, Result};

use crate::sqlite::{SqliteStore, character_from_row, location_from_row, query_err};

fn required_name(input: &AssetInput) -> Result<&str> {
    input
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::InvalidInput("name is required".into()))
}

impl SqliteStore {
    // --- characters ---

    pub async fn create_character(
        &self,
        project_id: ProjectId,
        input: &AssetInput,
    ) -> Result<Character> {
        let name = required_name(input)?;
        self.get_project(project_id).await?;

        let id = sqlx::query(
            "INSERT INTO characters (project_id, name, description, traits, image_url) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(project_id)
        .bind(name)
        .bind(&input.description)
        .bind(&input.detail)
        .bind(&input.image_url)
        .execute(&self.pool)
        .await
        .map_err(query_err("insert character"))?
        .last_insert_rowid();

        self.get_character(id).await
    }

    pub async fn list_characters(&self, project_id: ProjectId) -> Result<Vec<Character>> {
        let rows = sqlx::query("SELECT * FROM characters WHERE project_id = ?1 ORDER BY id")
            .bind(project_id)
            .fetch_all(&self.pool)
            .await
            .map_err(query_err("list characters"))?;
        rows.iter()
            .map(|row| character_from_row(row).map_err(Error::from))
            .collect()
    }

    pub async fn get_character(&self, id: CharacterId) -> Result<Character> {
        let row = sqlx::query("SELECT * FROM characters WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err("select character"))?
            .ok_or_else(|| Error::not_found("character", id))?;
        Ok(character_from_row(&row)?)
    }

    pub async fn update_character(&self, id: CharacterId, input: &AssetInput) -> Result<Character> {
        let name = input.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let result = sqlx::query(
            r#"
            UPDATE characters SET
                name        = COALESCE(?2, name),
                description = COALESCE(?3, description),
                traits      = COALESCE(?4, traits),
                image_url   = COALESCE(?5, image_url)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(&input.description)
        .bind(&input.detail)
        .bind(&input.image_url)
        .execute(&self.pool)
        .await
        .map_err(query_err("update character"))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("character", id));
        }
        self.get_character(id).await
    }

    pub async fn delete_character(&self, id: CharacterId) -> Result<()> {
        let result = sqlx::query("DELETE FROM characters WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_err("delete character"))?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("character", id));
        }
        Ok(())
    }

    // --- locations ---

    pub async fn create_location(
        &self,
        project_id: ProjectId,
        input: &AssetInput,
    ) -> Result<Location> {
        let name = required_name(input)?;
        self.get_project(project_id).await?;

        let id = sqlx::query(
            "INSERT INTO locations (project_id, name, description, ambiance, image_url) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(project_id)
        .bind(name)
        .bind(&input.description)
        .bind(&input.detail)
        .bind(&input.image_url)
        .execute(&self.pool)
        .await
        .map_err(query_err("insert location"))?
        .last_insert_rowid();

        self.get_location(id).await
    }

    pub async fn list_locations(&self, project_id: ProjectId) -> Result<Vec<Location>> {
        let rows = sqlx::query("SELECT * FROM locations WHERE project_id = ?1 ORDER BY id")
            .bind(project_id)
            .fetch_all(&self.pool)
            .await
            .map_err(query_err("list locations"))?;
        rows.iter()
            .map(|row| location_from_row(row).map_err(Error::from))
            .collect()
    }

    pub async fn get_location(&self, id: LocationId) -> Result<Location> {
        let row = sqlx::query("SELECT * FROM locations WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err("select location"))?
            .ok_or_else(|| Error::not_found("location", id))?;
        Ok(location_from_row(&row)?)
    }

    pub async fn update_location(&self, id: LocationId, input: &AssetInput) -> Result<Location> {
        let name = input.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let result = sqlx::query(
            r#"
            UPDATE locations SET
                name        = COALESCE(?2, name),
                description = COALESCE(?3, description),
                ambiance    = COALESCE(?4, ambiance),
                image_url   = COALESCE(?5, image_url)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(&input.description)
        .bind(&input.detail)
        .bind(&input.image_url)
        .execute(&self.pool)
        .await
        .map_err(query_err("update location"))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("location", id));
        }
        self.get_location(id).await
    }

    /// Delete a location; scenes set there lose their `location_id`.
    pub async fn delete_location(&self, id: LocationId) -> Result<()> {
        let result = sqlx::query("DELETE FROM locations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_err("delete location"))?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("location", id));
        }
        Ok(())
    }

    // --- scene cast ---

    /// Replace the cast of a scene. Ids from other projects are ignored.
    pub async fn set_scene_characters(
        &self,
        scene_id: SceneId,
        character_ids: &[CharacterId],
    ) -> Result<()> {
        let scene = self.get_scene(scene_id).await?;

        let mut tx = self.pool.begin().await.map_err(query_err("begin"))?;
        sqlx::query("DELETE FROM scene_characters WHERE scene_id = ?1")
            .bind(scene_id)
            .execute(&mut *tx)
            .await
            .map_err(query_err("clear scene characters"))?;

        for character_id in character_ids {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO scene_characters (scene_id, character_id)
                SELECT ?1, id FROM characters WHERE id = ?2 AND project_id = ?3
                "#,
            )
            .bind(scene_id)
            .bind(character_id)
            .bind(scene.project_id)
            .execute(&mut *tx)
            .await
            .map_err(query_err("link scene character"))?;
        }

        tx.commit().await.map_err(query_err("commit"))?;
        Ok(())
    }

    pub async fn scene_character_ids(&self, scene_id: SceneId) -> Result<Vec<CharacterId>> {
        let ids = sqlx::query_scalar(
            "SELECT character_id FROM scene_characters WHERE scene_id = ?1 ORDER BY character_id",
        )
        .bind(scene_id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_err("scene characters"))?;
        Ok(ids)
    }

    /// Full character rows for a scene's cast.
    pub async fn scene_cast(&self, scene_id: SceneId) -> Result<Vec<Character>> {
        let rows = sqlx::query(
            r#"
            SELECT c.* FROM characters c
            JOIN scene_characters sc ON sc.character_id = c.id
            WHERE sc.scene_id = ?1
            ORDER BY c.id
            "#,
        )
        .bind(scene_id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_err("scene cast"))?;
        rows.iter()
            .map(|row| character_from_row(row).map_err(Error::from))
            .collect()
    }
}
