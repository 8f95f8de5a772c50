//! The chat front of the pipeline.
//!
//! Project chat replays the stored history, lets the model edit the project
//! through the project tools and persists both turns. Headless chat is the
//! stateless concept phase: no tools, nothing stored.

use chrono::{DateTime, Utc};
use cutify_config::AgentConfig;
use cutify_core::event::{DomainEvent, EventBus};
use cutify_core::message::Message;
use cutify_core::model::{ChatRecord, ChatRole, ProjectId};
use cutify_core::provider::Provider;
use cutify_core::tool::ToolRegistry;
use cutify_core::{Error, Result};
use cutify_store::SqliteStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::loop_runner::{AgentLoop, AgentOutcome};
use crate::prompts;
use crate::services::ModelSettings;

/// The agent's answer to one chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub id: String,
    pub role: &'static str,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub action_taken: bool,
}

impl ChatReply {
    fn agent(id: String, content: String, timestamp: DateTime<Utc>, action_taken: bool) -> Self {
        Self {
            id,
            role: ChatRole::Agent.as_str(),
            content,
            timestamp,
            action_taken,
        }
    }
}

/// What the user sees when the model cannot be reached.
pub fn apology(error: &Error) -> String {
    format!("I'm having trouble connecting to my creative brain right now. Error details: {error}")
}

pub struct Showrunner {
    store: SqliteStore,
    provider: Arc<dyn Provider>,
    settings: ModelSettings,
    agent: AgentConfig,
    events: Arc<EventBus>,
}

impl Showrunner {
    pub fn new(
        store: SqliteStore,
        provider: Arc<dyn Provider>,
        settings: ModelSettings,
        agent: AgentConfig,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            store,
            provider,
            settings,
            agent,
            events,
        }
    }

    fn agent_loop(&self, tools: ToolRegistry, system_prompt: String) -> AgentLoop {
        let max_iterations = u32::try_from(self.agent.max_iterations).unwrap_or(u32::MAX);
        AgentLoop::new(
            self.provider.clone(),
            &self.settings.chat_model,
            self.settings.temperature,
            Arc::new(tools),
            system_prompt,
            self.events.clone(),
        )
        .with_max_iterations(max_iterations)
        .with_max_tokens(self.settings.max_tokens)
    }

    /// Run the loop; a provider failure becomes an apologetic reply.
    async fn converse(
        &self,
        agent: &AgentLoop,
        messages: &mut Vec<Message>,
        context: &str,
    ) -> AgentOutcome {
        match agent.process(messages).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(context, error = %e, "Showrunner could not answer");
                self.events.publish(DomainEvent::ErrorOccurred {
                    context: context.to_string(),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                AgentOutcome {
                    content: apology(&e),
                    action_taken: false,
                }
            }
        }
    }

    /// One turn of a project conversation.
    pub async fn project_chat(&self, project_id: ProjectId, content: &str) -> Result<ChatReply> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::InvalidInput("message content is empty".into()));
        }

        let project = self.store.get_project(project_id).await?;
        let scenes = self.store.list_scenes(project_id).await?;
        let history = self.store.chat_history(project_id, self.agent.history_limit).await?;

        self.store.append_chat(project_id, ChatRole::User, content).await?;

        let mut messages: Vec<Message> = history.iter().map(to_message).collect();
        messages.push(Message::user(content));

        let tools = cutify_tools::project_registry(self.store.clone(), project_id);
        let agent = self
            .agent_loop(tools, prompts::project_showrunner(&project, &scenes))
            .for_project(project_id);
        let outcome = self
            .converse(&agent, &mut messages, &format!("chat for project {project_id}"))
            .await;

        let record = self
            .store
            .append_chat(project_id, ChatRole::Agent, &outcome.content)
            .await?;

        info!(
            project_id,
            history = history.len(),
            action_taken = outcome.action_taken,
            "Project chat turn complete"
        );
        Ok(ChatReply::agent(
            record.id.to_string(),
            record.content,
            record.created_at,
            outcome.action_taken,
        ))
    }

    /// Concept-phase chat: `history` comes from the client, nothing is stored.
    pub async fn headless_chat(
        &self,
        history: Vec<Message>,
        new_message: &str,
    ) -> Result<ChatReply> {
        let new_message = new_message.trim();
        if new_message.is_empty() {
            return Err(Error::InvalidInput("newMessage is empty".into()));
        }

        let mut messages = history;
        messages.push(Message::user(new_message));

        let agent = self.agent_loop(ToolRegistry::new(), prompts::SHOWRUNNER_PERSONA.to_string());
        let outcome = self.converse(&agent, &mut messages, "headless chat").await;

        Ok(ChatReply::agent(
            Uuid::new_v4().to_string(),
            outcome.content,
            Utc::now(),
            false,
        ))
    }
}

fn to_message(record: &ChatRecord) -> Message {
    let mut message = match record.role {
        ChatRole::User => Message::user(&record.content),
        ChatRole::Agent => Message::assistant(&record.content),
    };
    message.timestamp = record.created_at;
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use cutify_core::message::{MessageToolCall, Role};
    use cutify_core::model::NewProject;

    async fn setup(provider: Arc<ScriptedProvider>) -> (SqliteStore, Showrunner, ProjectId) {
        let store = SqliteStore::in_memory().await.unwrap();
        let project = store
            .create_project(&NewProject {
                title: "Chat Project".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let showrunner = Showrunner::new(
            store.clone(),
            provider,
            ModelSettings::default(),
            AgentConfig::default(),
            Arc::new(EventBus::default()),
        );
        (store, showrunner, project.id)
    }

    #[tokio::test]
    async fn project_chat_persists_both_turns() {
        let provider = Arc::new(ScriptedProvider::text(&["Great idea!", "Sure."]));
        let (store, showrunner, pid) = setup(provider.clone()).await;

        let reply = showrunner.project_chat(pid, "Let's make a noir short").await.unwrap();
        assert_eq!(reply.role, "agent");
        assert_eq!(reply.content, "Great idea!");
        assert!(!reply.action_taken);

        showrunner.project_chat(pid, "Go on").await.unwrap();

        let history = store.chat_history(pid, 50).await.unwrap();
        let turns: Vec<(ChatRole, &str)> = history
            .iter()
            .map(|r| (r.role, r.content.as_str()))
            .collect();
        assert_eq!(
            turns,
            vec![
                (ChatRole::User, "Let's make a noir short"),
                (ChatRole::Agent, "Great idea!"),
                (ChatRole::User, "Go on"),
                (ChatRole::Agent, "Sure."),
            ]
        );

        // The second call replays the first exchange after the persona.
        let second = &provider.requests()[1];
        let roles: Vec<&Role> = second.messages.iter().map(|m| &m.role).collect();
        assert_eq!(roles, vec![&Role::System, &Role::User, &Role::Assistant, &Role::User]);
        assert!(second.messages[0].content.contains("Chat Project"));
        assert_eq!(second.tools.len(), 4);
    }

    #[tokio::test]
    async fn tool_use_sets_action_taken() {
        let mut call = Message::assistant("");
        call.tool_calls.push(MessageToolCall {
            id: "c1".into(),
            name: "update_project_details".into(),
            arguments: r#"{"genre": "Noir"}"#.into(),
        });
        let provider = Arc::new(ScriptedProvider::new(vec![
            call,
            Message::assistant("Genre set to Noir."),
        ]));
        let (store, showrunner, pid) = setup(provider).await;

        let reply = showrunner.project_chat(pid, "Make it noir").await.unwrap();
        assert!(reply.action_taken);
        assert_eq!(store.get_project(pid).await.unwrap().genre.as_deref(), Some("Noir"));
    }

    #[tokio::test]
    async fn provider_failure_becomes_apology() {
        let (store, showrunner, pid) = setup(Arc::new(ScriptedProvider::failing())).await;

        let reply = showrunner.project_chat(pid, "Hello?").await.unwrap();
        assert!(reply.content.starts_with("I'm having trouble connecting"));
        assert_eq!(store.chat_history(pid, 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn histories_are_isolated() {
        let provider = Arc::new(ScriptedProvider::text(&["A reply", "B reply"]));
        let (store, showrunner, a) = setup(provider.clone()).await;
        let b = store
            .create_project(&NewProject {
                title: "Other".into(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id;

        showrunner.project_chat(a, "secret plan for A").await.unwrap();
        showrunner.project_chat(b, "hello B").await.unwrap();

        let second = &provider.requests()[1];
        assert!(second.messages.iter().all(|m| !m.content.contains("secret plan")));
    }

    #[tokio::test]
    async fn unknown_project_and_empty_message() {
        let (_store, showrunner, pid) = setup(Arc::new(ScriptedProvider::text(&[]))).await;
        assert!(matches!(showrunner.project_chat(999, "hi").await, Err(Error::NotFound { .. })));
        assert!(matches!(showrunner.project_chat(pid, "   ").await, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn headless_chat_is_stateless_and_toolless() {
        let provider = Arc::new(ScriptedProvider::text(&["What genre?"]));
        let (store, showrunner, pid) = setup(provider.clone()).await;

        let history = vec![Message::user("I want a video"), Message::assistant("About what?")];
        let reply = showrunner.headless_chat(history, "Cats in space").await.unwrap();

        assert_eq!(reply.content, "What genre?");
        assert!(!reply.action_taken);
        let request = &provider.requests()[0];
        assert!(request.tools.is_empty());
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].content, prompts::SHOWRUNNER_PERSONA);
        assert!(store.chat_history(pid, 10).await.unwrap().is_empty());
    }
}
