use cutify_core::model::*;
use cutify_core::{Error, Result};

use crate::sqlite::{SqliteStore, chat_from_row, now_string, query_err};

impl SqliteStore {
    pub async fn append_chat(
        &self,
        project_id: ProjectId,
        role: ChatRole,
        content: &str,
    ) -> Result<ChatRecord> {
        let id = sqlx::query(
            "INSERT INTO chat_messages (project_id, role, content, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(project_id)
        .bind(role.as_str())
        .bind(content)
        .bind(now_string())
        .execute(&self.pool)
        .await
        .map_err(query_err("insert chat message"))?
        .last_insert_rowid();

        let row = sqlx::query("SELECT * FROM chat_messages WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(query_err("select chat message"))?;
        Ok(chat_from_row(&row)?)
    }

    /// The last `limit` turns of a project, oldest first.
    pub async fn chat_history(&self, project_id: ProjectId, limit: u32) -> Result<Vec<ChatRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM (
                SELECT * FROM chat_messages WHERE project_id = ?1 ORDER BY id DESC LIMIT ?2
            ) ORDER BY id ASC
            "#,
        )
        .bind(project_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(query_err("chat history"))?;
        rows.iter()
            .map(|row| chat_from_row(row).map_err(Error::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn project(store: &SqliteStore, title: &str) -> ProjectId {
        store
            .create_project(&NewProject {
                title: title.into(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn history_is_chronological_and_limited() {
        let store = SqliteStore::in_memory().await.unwrap();
        let pid = project(&store, "Chatty").await;
        for i in 0..5 {
            let role = if i % 2 == 0 { ChatRole::User } else { ChatRole::Agent };
            store.append_chat(pid, role, &format!("turn {i}")).await.unwrap();
        }

        let history = store.chat_history(pid, 3).await.unwrap();
        let contents: Vec<&str> = history.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["turn 2", "turn 3", "turn 4"]);
        assert_eq!(history[1].role, ChatRole::Agent);
    }

    #[tokio::test]
    async fn histories_are_isolated_per_project() {
        let store = SqliteStore::in_memory().await.unwrap();
        let a = project(&store, "A").await;
        let b = project(&store, "B").await;
        store.append_chat(a, ChatRole::User, "only in A").await.unwrap();

        assert_eq!(store.chat_history(a, 50).await.unwrap().len(), 1);
        assert!(store.chat_history(b, 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn chat_for_missing_project_fails() {
        let store = SqliteStore::in_memory().await.unwrap();
        assert!(store.append_chat(404, ChatRole::User, "hi").await.is_err());
    }
}
