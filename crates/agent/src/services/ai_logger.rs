//! Persists one [`AiLog`] per model call.
//!
//! Logging never fails the call being logged; store errors are only warned
//! about.

use chrono::Utc;
use cutify_core::model::{AiLog, AiLogStatus};
use cutify_store::SqliteStore;
use tracing::warn;
use uuid::Uuid;

#[derive(Clone)]
pub struct AiLogger {
    store: SqliteStore,
}

impl AiLogger {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Record a pending call and return its log id.
    pub async fn start(&self, service: &str, prompt: &str, images: &[String]) -> String {
        let log = AiLog {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            service: service.to_string(),
            prompt: prompt.to_string(),
            response: None,
            images: images.to_vec(),
            response_images: Vec::new(),
            error: None,
            status: AiLogStatus::Pending,
        };
        if let Err(e) = self.store.insert_ai_log(&log).await {
            warn!(service, error = %e, "Could not record AI call");
        }
        log.id
    }

    pub async fn success(&self, id: &str, response: Option<&str>, response_images: &[String]) {
        if let Err(e) = self.store.finish_ai_log(id, response, response_images, None).await {
            warn!(log_id = id, error = %e, "Could not close AI call log");
        }
    }

    pub async fn failure(&self, id: &str, error: &str) {
        if let Err(e) = self.store.finish_ai_log(id, None, &[], Some(error)).await {
            warn!(log_id = id, error = %e, "Could not close AI call log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_lifecycle() {
        let store = SqliteStore::in_memory().await.unwrap();
        let logger = AiLogger::new(store.clone());

        let ok = logger.start("Scriptwriter", "write", &[]).await;
        logger.success(&ok, Some("INT. ROOM"), &[]).await;
        let bad = logger.start("Director", "draw", &["/static/ref.png".into()]).await;
        logger.failure(&bad, "quota").await;

        let logs = store.recent_ai_logs(10).await.unwrap();
        let ok_log = logs.iter().find(|l| l.id == ok).unwrap();
        assert_eq!(ok_log.status, AiLogStatus::Success);
        assert_eq!(ok_log.response.as_deref(), Some("INT. ROOM"));
        let bad_log = logs.iter().find(|l| l.id == bad).unwrap();
        assert_eq!(bad_log.status, AiLogStatus::Error);
        assert_eq!(bad_log.images, vec!["/static/ref.png"]);
    }

    #[tokio::test]
    async fn unknown_id_does_not_panic() {
        let logger = AiLogger::new(SqliteStore::in_memory().await.unwrap());
        logger.success("missing", None, &[]).await;
    }
}
