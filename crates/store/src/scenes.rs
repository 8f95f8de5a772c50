//! Scenes, their ordering, and the shots hanging off them.
//!
//! `sequence_order` is kept dense (1..=n) within a project: every operation
//! that removes or moves a scene renumbers the rest in the same transaction.

use std::collections::HashMap;

use cutify_core::model::*;
use cutify_core::{Error, Result};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, info};

use crate::resolver::SceneQuery;
use crate::sqlite::{SqliteStore, now_string, query_err, scene_from_row, shot_from_row};

impl SqliteStore {
    /// Scenes of a project in sequence order.
    pub async fn list_scenes(&self, project_id: ProjectId) -> Result<Vec<Scene>> {
        let rows = sqlx::query(
            "SELECT * FROM scenes WHERE project_id = ?1 ORDER BY sequence_order, id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_err("list scenes"))?;
        rows.iter()
            .map(|row| scene_from_row(row).map_err(Error::from))
            .collect()
    }

    pub async fn get_scene(&self, id: SceneId) -> Result<Scene> {
        let row = sqlx::query("SELECT * FROM scenes WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err("select scene"))?
            .ok_or_else(|| Error::not_found("scene", id))?;
        Ok(scene_from_row(&row)?)
    }

    pub async fn scene_detail(&self, id: SceneId) -> Result<SceneDetail> {
        let scene = self.get_scene(id).await?;
        Ok(SceneDetail {
            shots: self.list_shots(id).await?,
            character_ids: self.scene_character_ids(id).await?,
            scene,
        })
    }

    /// Append a pending scene after the last one.
    pub async fn append_scene(
        &self,
        project_id: ProjectId,
        title: &str,
        summary: &str,
    ) -> Result<Scene> {
        let mut tx = self.pool.begin().await.map_err(query_err("begin"))?;
        ensure_project(&mut tx, project_id).await?;

        let next: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(sequence_order), 0) + 1 FROM scenes WHERE project_id = ?1",
        )
        .bind(project_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(query_err("next sequence order"))?;

        let id = sqlx::query(
            r#"
            INSERT INTO scenes (project_id, sequence_order, title, summary, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(project_id)
        .bind(next)
        .bind(title)
        .bind(summary)
        .bind(SceneStatus::Pending.as_str())
        .bind(now_string())
        .execute(&mut *tx)
        .await
        .map_err(query_err("insert scene"))?
        .last_insert_rowid();

        tx.commit().await.map_err(query_err("commit"))?;
        debug!(project_id, scene_id = id, order = next, "Appended scene");
        self.get_scene(id).await
    }

    /// Partial update. A `character_ids` list replaces the scene's cast.
    pub async fn update_scene(&self, id: SceneId, update: &SceneUpdate) -> Result<Scene> {
        let scene = self.get_scene(id).await?;

        if let Some(Some(location_id)) = update.location_id {
            let location = self.get_location(location_id).await?;
            if location.project_id != scene.project_id {
                return Err(Error::InvalidInput(format!(
                    "location {location_id} belongs to another project"
                )));
            }
        }

        if !update.is_empty() {
            sqlx::query(
                r#"
                UPDATE scenes SET
                    title              = COALESCE(?2, title),
                    summary            = COALESCE(?3, summary),
                    script             = COALESCE(?4, script),
                    status             = COALESCE(?5, status),
                    estimated_duration = COALESCE(?6, estimated_duration),
                    location_id        = CASE WHEN ?7 THEN ?8 ELSE location_id END
                WHERE id = ?1
                "#,
            )
            .bind(id)
            .bind(&update.title)
            .bind(&update.summary)
            .bind(&update.script)
            .bind(update.status.map(|s| s.as_str()))
            .bind(&update.estimated_duration)
            .bind(update.location_id.is_some())
            .bind(update.location_id.flatten())
            .execute(&self.pool)
            .await
            .map_err(query_err("update scene"))?;
        }

        if let Some(ids) = &update.character_ids {
            self.set_scene_characters(id, ids).await?;
        }

        self.get_scene(id).await
    }

    /// Store a freshly written script; the scene moves to `in-progress`.
    pub async fn set_scene_script(&self, id: SceneId, script: &str) -> Result<Scene> {
        let update = SceneUpdate {
            script: Some(script.to_string()),
            status: Some(SceneStatus::InProgress),
            ..Default::default()
        };
        self.update_scene(id, &update).await
    }

    /// Delete a scene and close the gap in the ordering.
    pub async fn delete_scene(&self, id: SceneId) -> Result<Scene> {
        let scene = self.get_scene(id).await?;

        let mut tx = self.pool.begin().await.map_err(query_err("begin"))?;
        sqlx::query("DELETE FROM scenes WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(query_err("delete scene"))?;
        resequence(&mut tx, scene.project_id).await?;
        tx.commit().await.map_err(query_err("commit"))?;

        debug!(project_id = scene.project_id, scene_id = id, "Deleted scene");
        Ok(scene)
    }

    /// Move a scene to a 1-based position, clamped to `[1, n]`.
    /// Returns the position it ended up at.
    pub async fn move_scene(
        &self,
        project_id: ProjectId,
        scene_id: SceneId,
        target_position: i64,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await.map_err(query_err("begin"))?;

        let mut ids: Vec<SceneId> = sqlx::query_scalar(
            "SELECT id FROM scenes WHERE project_id = ?1 ORDER BY sequence_order, id",
        )
        .bind(project_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(query_err("scene order"))?;

        let current = ids
            .iter()
            .position(|&s| s == scene_id)
            .ok_or_else(|| Error::not_found("scene", scene_id))?;
        ids.remove(current);

        let position = target_position.clamp(1, ids.len() as i64 + 1);
        ids.insert((position - 1) as usize, scene_id);

        write_order(&mut tx, &ids).await?;
        tx.commit().await.map_err(query_err("commit"))?;

        debug!(project_id, scene_id, position, "Moved scene");
        Ok(position)
    }

    /// Resolve a loose reference ("2", "scene 2", "rooftop") to a scene.
    pub async fn find_scene(&self, project_id: ProjectId, query: &str) -> Result<Option<Scene>> {
        let scenes = self.list_scenes(project_id).await?;
        Ok(SceneQuery::parse(query).pick(&scenes).cloned())
    }

    /// Replace every scene of a project with a screenwriter breakdown.
    ///
    /// One transaction: old scenes go, new ones are numbered 1..n, cast
    /// members are matched by case-insensitive name (created when missing)
    /// and linked to the scenes that mention them.
    pub async fn replace_scene_breakdown(
        &self,
        project_id: ProjectId,
        breakdown: &SceneBreakdown,
    ) -> Result<Vec<Scene>> {
        let mut tx = self.pool.begin().await.map_err(query_err("begin"))?;
        ensure_project(&mut tx, project_id).await?;

        sqlx::query("DELETE FROM scenes WHERE project_id = ?1")
            .bind(project_id)
            .execute(&mut *tx)
            .await
            .map_err(query_err("clear scenes"))?;

        let mut characters: HashMap<String, CharacterId> = HashMap::new();
        for stub in &breakdown.characters {
            let id = upsert_character(
                &mut tx,
                project_id,
                &stub.name,
                stub.description.as_deref(),
                stub.traits.as_deref(),
            )
            .await?;
            characters.insert(stub.name.trim().to_lowercase(), id);
        }

        let mut locations: HashMap<String, LocationId> = HashMap::new();
        for stub in &breakdown.locations {
            let id = upsert_location(
                &mut tx,
                project_id,
                &stub.name,
                stub.description.as_deref(),
                stub.ambiance.as_deref(),
            )
            .await?;
            locations.insert(stub.name.trim().to_lowercase(), id);
        }

        let created_at = now_string();
        for (index, stub) in breakdown.scenes.iter().enumerate() {
            let location = stub.location.as_deref().map(str::trim).filter(|n| !n.is_empty());
            let location_id = match location {
                Some(name) => {
                    let key = name.to_lowercase();
                    match locations.get(&key) {
                        Some(id) => Some(*id),
                        None => {
                            let id = upsert_location(&mut tx, project_id, name, None, None).await?;
                            locations.insert(key, id);
                            Some(id)
                        }
                    }
                }
                None => None,
            };

            let scene_id = sqlx::query(
                r#"
                INSERT INTO scenes
                    (project_id, sequence_order, title, summary, estimated_duration, status,
                     location_id, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(project_id)
            .bind(index as i64 + 1)
            .bind(&stub.title)
            .bind(&stub.summary)
            .bind(&stub.estimated_duration)
            .bind(SceneStatus::Pending.as_str())
            .bind(location_id)
            .bind(&created_at)
            .execute(&mut *tx)
            .await
            .map_err(query_err("insert scene"))?
            .last_insert_rowid();

            for name in stub.characters.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
                let key = name.to_lowercase();
                let character_id = match characters.get(&key) {
                    Some(id) => *id,
                    None => {
                        let id = upsert_character(&mut tx, project_id, name, None, None).await?;
                        characters.insert(key, id);
                        id
                    }
                };
                sqlx::query(
                    "INSERT OR IGNORE INTO scene_characters (scene_id, character_id) \
                     VALUES (?1, ?2)",
                )
                .bind(scene_id)
                .bind(character_id)
                .execute(&mut *tx)
                .await
                .map_err(query_err("link scene character"))?;
            }
        }

        tx.commit().await.map_err(query_err("commit"))?;
        info!(
            project_id,
            scenes = breakdown.scenes.len(),
            characters = characters.len(),
            locations = locations.len(),
            "Replaced scene breakdown"
        );
        self.list_scenes(project_id).await
    }

    // --- shots ---

    pub async fn list_shots(&self, scene_id: SceneId) -> Result<Vec<Shot>> {
        let rows = sqlx::query("SELECT * FROM shots WHERE scene_id = ?1 ORDER BY shot_number")
            .bind(scene_id)
            .fetch_all(&self.pool)
            .await
            .map_err(query_err("list shots"))?;
        rows.iter()
            .map(|row| shot_from_row(row).map_err(Error::from))
            .collect()
    }

    /// Swap in a new storyboard: shots numbered from 1 and labelled "Plan N",
    /// the master grid URL on the scene, scene status `done`.
    pub async fn replace_shots(
        &self,
        scene_id: SceneId,
        storyboard_url: &str,
        shot_urls: &[String],
    ) -> Result<Vec<Shot>> {
        let mut tx = self.pool.begin().await.map_err(query_err("begin"))?;

        let updated =
            sqlx::query("UPDATE scenes SET storyboard_url = ?2, status = ?3 WHERE id = ?1")
                .bind(scene_id)
                .bind(storyboard_url)
                .bind(SceneStatus::Done.as_str())
                .execute(&mut *tx)
                .await
                .map_err(query_err("update storyboard"))?;
        if updated.rows_affected() == 0 {
            return Err(Error::not_found("scene", scene_id));
        }

        sqlx::query("DELETE FROM shots WHERE scene_id = ?1")
            .bind(scene_id)
            .execute(&mut *tx)
            .await
            .map_err(query_err("clear shots"))?;

        for (index, url) in shot_urls.iter().enumerate() {
            let number = index as i64 + 1;
            sqlx::query(
                "INSERT INTO shots (scene_id, shot_number, image_url, label, status) \
                 VALUES (?1, ?2, ?3, ?4, 'done')",
            )
            .bind(scene_id)
            .bind(number)
            .bind(url)
            .bind(format!("Plan {number}"))
            .execute(&mut *tx)
            .await
            .map_err(query_err("insert shot"))?;
        }

        tx.commit().await.map_err(query_err("commit"))?;
        debug!(scene_id, shots = shot_urls.len(), "Replaced shots");
        self.list_shots(scene_id).await
    }
}

// --- transaction helpers ---

async fn ensure_project(tx: &mut Transaction<'_, Sqlite>, project_id: ProjectId) -> Result<()> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM projects WHERE id = ?1")
        .bind(project_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(query_err("project lookup"))?;
    exists
        .map(|_| ())
        .ok_or_else(|| Error::not_found("project", project_id))
}

async fn write_order(tx: &mut Transaction<'_, Sqlite>, ids: &[SceneId]) -> Result<()> {
    for (index, id) in ids.iter().enumerate() {
        sqlx::query("UPDATE scenes SET sequence_order = ?2 WHERE id = ?1")
            .bind(id)
            .bind(index as i64 + 1)
            .execute(&mut **tx)
            .await
            .map_err(query_err("write order"))?;
    }
    Ok(())
}

async fn resequence(tx: &mut Transaction<'_, Sqlite>, project_id: ProjectId) -> Result<()> {
    let ids: Vec<SceneId> = sqlx::query_scalar(
        "SELECT id FROM scenes WHERE project_id = ?1 ORDER BY sequence_order, id",
    )
    .bind(project_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(query_err("scene order"))?;
    write_order(tx, &ids).await
}

async fn upsert_character(
    tx: &mut Transaction<'_, Sqlite>,
    project_id: ProjectId,
    name: &str,
    description: Option<&str>,
    traits: Option<&str>,
) -> Result<CharacterId> {
    let name = name.trim();
    let existing: Option<CharacterId> = sqlx::query_scalar(
        "SELECT id FROM characters WHERE project_id = ?1 AND lower(name) = lower(?2) \
         ORDER BY id LIMIT 1",
    )
    .bind(project_id)
    .bind(name)
    .fetch_optional(&mut **tx)
    .await
    .map_err(query_err("character lookup"))?;

    if let Some(id) = existing {
        sqlx::query(
            "UPDATE characters SET description = COALESCE(?2, description), \
             traits = COALESCE(?3, traits) WHERE id = ?1",
        )
        .bind(id)
        .bind(description)
        .bind(traits)
        .execute(&mut **tx)
        .await
        .map_err(query_err("update character"))?;
        return Ok(id);
    }

    let id = sqlx::query(
        "INSERT INTO characters (project_id, name, description, traits) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(project_id)
    .bind(name)
    .bind(description)
    .bind(traits)
    .execute(&mut **tx)
    .await
    .map_err(query_err("insert character"))?
    .last_insert_rowid();
    Ok(id)
}

async fn upsert_location(
    tx: &mut Transaction<'_, Sqlite>,
    project_id: ProjectId,
    name: &str,
    description: Option<&str>,
    ambiance: Option<&str>,
) -> Result<LocationId> {
    let name = name.trim();
    let existing: Option<LocationId> = sqlx::query_scalar(
        "SELECT id FROM locations WHERE project_id = ?1 AND lower(name) = lower(?2) \
         ORDER BY id LIMIT 1",
    )
    .bind(project_id)
    .bind(name)
    .fetch_optional(&mut **tx)
    .await
    .map_err(query_err("location lookup"))?;

    if let Some(id) = existing {
        sqlx::query(
            "UPDATE locations SET description = COALESCE(?2, description), \
             ambiance = COALESCE(?3, ambiance) WHERE id = ?1",
        )
        .bind(id)
        .bind(description)
        .bind(ambiance)
        .execute(&mut **tx)
        .await
        .map_err(query_err("update location"))?;
        return Ok(id);
    }

    let id = sqlx::query(
        "INSERT INTO locations (project_id, name, description, ambiance) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(project_id)
    .bind(name)
    .bind(description)
    .bind(ambiance)
    .execute(&mut **tx)
    .await
    .map_err(query_err("insert location"))?
    .last_insert_rowid();
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_project() -> (SqliteStore, ProjectId) {
        let store = SqliteStore::in_memory().await.unwrap();
        let project = store
            .create_project(&NewProject {
                title: "Test Film".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        (store, project.id)
    }

    async fn titles(store: &SqliteStore, project_id: ProjectId) -> Vec<(i64, String)> {
        store
            .list_scenes(project_id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| (s.sequence_order, s.title))
            .collect()
    }

    fn stub(title: &str, characters: &[&str], location: Option<&str>) -> SceneStub {
        SceneStub {
            title: title.into(),
            summary: format!("{title} summary"),
            estimated_duration: Some("10s".into()),
            characters: characters.iter().map(|c| c.to_string()).collect(),
            location: location.map(String::from),
        }
    }

    #[tokio::test]
    async fn append_numbers_from_one() {
        let (store, pid) = store_with_project().await;
        let a = store.append_scene(pid, "A", "").await.unwrap();
        let b = store.append_scene(pid, "B", "second").await.unwrap();
        assert_eq!(a.sequence_order, 1);
        assert_eq!(b.sequence_order, 2);
        assert_eq!(b.status, SceneStatus::Pending);
        assert_eq!(b.summary, "second");
    }

    #[tokio::test]
    async fn append_to_missing_project_is_not_found() {
        let store = SqliteStore::in_memory().await.unwrap();
        let err = store.append_scene(77, "A", "").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "project", .. }));
    }

    #[tokio::test]
    async fn delete_resequences() {
        let (store, pid) = store_with_project().await;
        store.append_scene(pid, "A", "").await.unwrap();
        let b = store.append_scene(pid, "B", "").await.unwrap();
        store.append_scene(pid, "C", "").await.unwrap();

        let deleted = store.delete_scene(b.id).await.unwrap();
        assert_eq!(deleted.title, "B");
        assert_eq!(titles(&store, pid).await, vec![(1, "A".into()), (2, "C".into())]);
    }

    #[tokio::test]
    async fn move_scene_and_clamp() {
        let (store, pid) = store_with_project().await;
        let a = store.append_scene(pid, "A", "").await.unwrap();
        store.append_scene(pid, "B", "").await.unwrap();
        let c = store.append_scene(pid, "C", "").await.unwrap();

        assert_eq!(store.move_scene(pid, c.id, 1).await.unwrap(), 1);
        assert_eq!(
            titles(&store, pid).await,
            vec![(1, "C".into()), (2, "A".into()), (3, "B".into())]
        );

        assert_eq!(store.move_scene(pid, a.id, 99).await.unwrap(), 3);
        assert_eq!(
            titles(&store, pid).await,
            vec![(1, "C".into()), (2, "B".into()), (3, "A".into())]
        );

        assert_eq!(store.move_scene(pid, a.id, -4).await.unwrap(), 1);
        assert_eq!(titles(&store, pid).await[0].1, "A");
    }

    #[tokio::test]
    async fn move_unknown_scene_is_not_found() {
        let (store, pid) = store_with_project().await;
        store.append_scene(pid, "A", "").await.unwrap();
        assert!(matches!(store.move_scene(pid, 999, 1).await, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn find_scene_by_order_id_and_title() {
        let (store, pid) = store_with_project().await;
        store.append_scene(pid, "Opening", "").await.unwrap();
        let chase = store.append_scene(pid, "Rooftop Chase", "").await.unwrap();

        assert_eq!(store.find_scene(pid, "Scene 2").await.unwrap().unwrap().id, chase.id);
        assert_eq!(store.find_scene(pid, "rooftop").await.unwrap().unwrap().id, chase.id);
        assert!(store.find_scene(pid, "desert").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_scene_is_project_scoped() {
        let (store, pid) = store_with_project().await;
        let other = store
            .create_project(&NewProject {
                title: "Other".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let foreign = store.append_scene(other.id, "Foreign", "").await.unwrap();
        assert!(store.find_scene(pid, &foreign.id.to_string()).await.unwrap().is_none());
        assert!(store.find_scene(pid, "Foreign").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_scene_partial_and_location() {
        let (store, pid) = store_with_project().await;
        let scene = store.append_scene(pid, "A", "old").await.unwrap();
        let location = store
            .create_location(
                pid,
                &AssetInput {
                    name: Some("Docks".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = store
            .update_scene(
                scene.id,
                &SceneUpdate {
                    summary: Some("new".into()),
                    location_id: Some(Some(location.id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "A");
        assert_eq!(updated.summary, "new");
        assert_eq!(updated.location_id, Some(location.id));

        let detached = store
            .update_scene(
                scene.id,
                &SceneUpdate {
                    location_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(detached.location_id, None);
    }

    #[tokio::test]
    async fn script_moves_scene_in_progress() {
        let (store, pid) = store_with_project().await;
        let scene = store.append_scene(pid, "A", "").await.unwrap();
        let scene = store.set_scene_script(scene.id, "INT. DOCKS - NIGHT").await.unwrap();
        assert_eq!(scene.status, SceneStatus::InProgress);
        assert_eq!(scene.script.as_deref(), Some("INT. DOCKS - NIGHT"));
    }

    #[tokio::test]
    async fn deleting_location_detaches_scene() {
        let (store, pid) = store_with_project().await;
        let breakdown = SceneBreakdown {
            scenes: vec![stub("A", &[], Some("Docks"))],
            ..Default::default()
        };
        let scenes = store.replace_scene_breakdown(pid, &breakdown).await.unwrap();
        let location_id = scenes[0].location_id.unwrap();

        store.delete_location(location_id).await.unwrap();
        assert_eq!(store.get_scene(scenes[0].id).await.unwrap().location_id, None);
    }

    #[tokio::test]
    async fn breakdown_replaces_scenes_and_links_cast() {
        let (store, pid) = store_with_project().await;
        store.append_scene(pid, "Old", "").await.unwrap();
        store
            .create_character(
                pid,
                &AssetInput {
                    name: Some("Mara".into()),
                    detail: Some("red coat".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let breakdown = SceneBreakdown {
            scenes: vec![
                stub("Arrival", &["MARA", "Jun"], Some("The Docks")),
                stub("Showdown", &["mara"], Some("the docks")),
            ],
            characters: vec![CharacterStub {
                name: "mara".into(),
                description: Some("A smuggler".into()),
                traits: None,
            }],
            locations: vec![LocationStub {
                name: "The Docks".into(),
                description: None,
                ambiance: Some("fog, sodium lights".into()),
            }],
        };

        let scenes = store.replace_scene_breakdown(pid, &breakdown).await.unwrap();
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].title, "Arrival");
        assert_eq!(scenes[0].sequence_order, 1);
        assert_eq!(scenes[1].sequence_order, 2);
        assert_eq!(scenes[0].location_id, scenes[1].location_id);

        let characters = store.list_characters(pid).await.unwrap();
        assert_eq!(characters.len(), 2);
        let mara = characters.iter().find(|c| c.name == "Mara").unwrap();
        assert_eq!(mara.description.as_deref(), Some("A smuggler"));
        assert_eq!(mara.traits.as_deref(), Some("red coat"));

        let locations = store.list_locations(pid).await.unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].ambiance.as_deref(), Some("fog, sodium lights"));

        assert_eq!(store.scene_character_ids(scenes[0].id).await.unwrap().len(), 2);
        assert_eq!(store.scene_character_ids(scenes[1].id).await.unwrap(), vec![mara.id]);
    }

    #[tokio::test]
    async fn breakdown_for_missing_project_changes_nothing() {
        let store = SqliteStore::in_memory().await.unwrap();
        let breakdown = SceneBreakdown {
            scenes: vec![stub("A", &[], None)],
            ..Default::default()
        };
        assert!(store.replace_scene_breakdown(5, &breakdown).await.is_err());
    }

    #[tokio::test]
    async fn replace_shots_numbers_and_marks_done() {
        let (store, pid) = store_with_project().await;
        let scene = store.append_scene(pid, "A", "").await.unwrap();
        let urls: Vec<String> = (1..=9).map(|n| format!("/static/shot_{n}.png")).collect();

        store.replace_shots(scene.id, "/static/master.png", &urls).await.unwrap();
        let shots = store
            .replace_shots(scene.id, "/static/master2.png", &urls)
            .await
            .unwrap();

        assert_eq!(shots.len(), 9);
        assert_eq!(shots[0].shot_number, 1);
        assert_eq!(shots[0].label, "Plan 1");
        assert_eq!(shots[8].label, "Plan 9");
        assert_eq!(shots[4].image_url, "/static/shot_5.png");

        let detail = store.scene_detail(scene.id).await.unwrap();
        assert_eq!(detail.scene.status, SceneStatus::Done);
        assert_eq!(detail.scene.storyboard_url.as_deref(), Some("/static/master2.png"));
        assert_eq!(detail.shots.len(), 9);
    }

    #[tokio::test]
    async fn replace_shots_unknown_scene() {
        let store = SqliteStore::in_memory().await.unwrap();
        let err = store.replace_shots(3, "/m.png", &[]).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "scene", .. }));
    }
}
