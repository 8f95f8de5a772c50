use cutify_core::model::ConceptDraft;
use cutify_core::provider::{Provider, ProviderRequest};
use cutify_core::{Error, Result};
use std::sync::Arc;
use tracing::info;

use super::{AiLogger, ModelSettings, strip_fences};
use crate::prompts;

const SERVICE: &str = "ConceptExtractor";

/// Turns a concept-phase chat into a [`ConceptDraft`].
pub struct ConceptExtractor {
    provider: Arc<dyn Provider>,
    settings: ModelSettings,
    logger: AiLogger,
}

impl ConceptExtractor {
    pub fn new(provider: Arc<dyn Provider>, settings: ModelSettings, logger: AiLogger) -> Self {
        Self {
            provider,
            settings,
            logger,
        }
    }

    /// `transcript` is a `ROLE: text` rendering of the chat.
    pub async fn extract(&self, transcript: &str) -> Result<ConceptDraft> {
        if transcript.trim().is_empty() {
            return Err(Error::InvalidInput("cannot extract a concept from an empty chat".into()));
        }

        let prompt = prompts::concept_extraction(transcript);
        let log_id = self.logger.start(SERVICE, &prompt, &[]).await;

        let mut request =
            ProviderRequest::prompt(&self.settings.extraction_model, &prompt).with_json_mode();
        request.temperature = self.settings.temperature;
        request.max_tokens = Some(self.settings.max_tokens);

        let response = match self.provider.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                self.logger.failure(&log_id, &e.to_string()).await;
                return Err(e.into());
            }
        };
        let text = response.message.content;

        match parse_concept(&text) {
            Ok(draft) => {
                self.logger.success(&log_id, Some(&text), &[]).await;
                info!(title = %draft.title, "Extracted concept");
                Ok(draft)
            }
            Err(e) => {
                self.logger.failure(&log_id, &e.to_string()).await;
                Err(e)
            }
        }
    }
}

/// Parse the model's JSON. Missing or blank fields become `"TBD"`.
pub fn parse_concept(text: &str) -> Result<ConceptDraft> {
    serde_json::from_str(strip_fences(text)).map_err(|e| Error::InvalidModelOutput {
        service: SERVICE.into(),
        reason: format!("concept is not a JSON object: {e}"),
    })
}
