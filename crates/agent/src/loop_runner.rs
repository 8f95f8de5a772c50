//! The showrunner reasoning loop.

use chrono::Utc;
use cutify_core::event::{DomainEvent, EventBus};
use cutify_core::message::{Message, Role};
use cutify_core::model::ProjectId;
use cutify_core::provider::{Provider, ProviderRequest};
use cutify_core::tool::{ToolCall, ToolRegistry};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Returned when the model keeps calling tools past the iteration limit.
pub const MAX_ITERATIONS_REPLY: &str =
    "I've made several changes but need a moment to catch up. Could you tell me what you'd like next?";

/// What one turn of the loop produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutcome {
    pub content: String,
    /// Whether at least one tool ran during the turn
    pub action_taken: bool,
}

/// Orchestrates LLM calls and tool execution for one chat turn.
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Default max tokens per response
    max_tokens: Option<u32>,

    /// Tools the model may call; empty for concept-phase chat
    tools: Arc<ToolRegistry>,

    /// Persona sent as the first message
    system_prompt: String,

    /// Maximum tool call iterations per turn
    max_iterations: u32,

    /// Event bus for domain events
    event_bus: Arc<EventBus>,

    /// Project the conversation belongs to, for events
    project_id: Option<ProjectId>,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        system_prompt: impl Into<String>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            system_prompt: system_prompt.into(),
            max_iterations: 5,
            event_bus,
            project_id: None,
        }
    }

    /// Set the maximum number of tool call iterations.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the default max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn for_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Run one turn over `messages` (history followed by the new user turn).
    ///
    /// The persona is inserted or refreshed as the first message. Assistant
    /// and tool messages produced along the way are appended to `messages`.
    pub async fn process(&self, messages: &mut Vec<Message>) -> cutify_core::Result<AgentOutcome> {
        info!(
            project_id = ?self.project_id,
            messages = messages.len(),
            tools = self.tools.names().len(),
            "Processing chat turn"
        );

        let system = Message::system(&self.system_prompt);
        if messages.first().is_some_and(|m| m.role == Role::System) {
            messages[0] = system;
        } else {
            messages.insert(0, system);
        }

        let tool_definitions = self.tools.definitions();
        let mut action_taken = false;
        let mut iteration = 0;

        loop {
            iteration += 1;

            if iteration > self.max_iterations {
                warn!(
                    project_id = ?self.project_id,
                    iterations = iteration - 1,
                    "Max tool iterations reached"
                );
                break;
            }

            debug!(iteration, "Agent loop iteration");

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
                json_mode: false,
            };

            let response = self.provider.complete(request).await?;

            if let Some(usage) = &response.usage {
                self.event_bus.publish(DomainEvent::ResponseGenerated {
                    project_id: self.project_id,
                    model: response.model.clone(),
                    tokens_used: usage.total_tokens,
                    timestamp: Utc::now(),
                });
            }

            if response.message.tool_calls.is_empty() {
                let content = response.message.content.clone();
                messages.push(response.message);
                return Ok(AgentOutcome {
                    content,
                    action_taken,
                });
            }

            debug!(
                tool_count = response.message.tool_calls.len(),
                "Executing tool calls"
            );

            let tool_calls = response.message.tool_calls.clone();
            messages.push(response.message);

            for tc in &tool_calls {
                let arguments = match serde_json::from_str(&tc.arguments) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(tool = %tc.name, error = %e, "Tool arguments are not valid JSON");
                        serde_json::Value::Object(Default::default())
                    }
                };
                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments,
                };

                let start = std::time::Instant::now();
                let result = self.tools.execute(&call).await;
                let duration_ms = start.elapsed().as_millis() as u64;
                action_taken = true;

                let (success, output) = match result {
                    Ok(tool_result) => (tool_result.success, tool_result.output),
                    Err(e) => {
                        warn!(tool = %tc.name, error = %e, "Tool execution failed");
                        (false, format!("Error: {e}"))
                    }
                };

                info!(tool = %tc.name, success, duration_ms, "Tool executed");
                self.event_bus.publish(DomainEvent::ToolExecuted {
                    tool_name: tc.name.clone(),
                    success,
                    duration_ms,
                    timestamp: Utc::now(),
                });

                messages.push(Message::tool_result(&tc.id, output));
            }
        }

        Ok(AgentOutcome {
            content: MAX_ITERATIONS_REPLY.into(),
            action_taken,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use cutify_core::message::MessageToolCall;
    use cutify_core::model::NewProject;
    use cutify_store::SqliteStore;

    fn tool_call_message(name: &str, arguments: &str) -> Message {
        let mut msg = Message::assistant("");
        msg.tool_calls.push(MessageToolCall {
            id: format!("call_{name}"),
            name: name.into(),
            arguments: arguments.into(),
        });
        msg
    }

    fn agent(
        provider: Arc<ScriptedProvider>,
        tools: ToolRegistry,
        bus: Arc<EventBus>,
    ) -> AgentLoop {
        AgentLoop::new(
            provider,
            "mock-model",
            0.7,
            Arc::new(tools),
            "You are a showrunner.",
            bus,
        )
    }

    #[tokio::test]
    async fn simple_text_response() {
        let provider = Arc::new(ScriptedProvider::text(&["Hello! What are we making?"]));
        let agent = agent(provider.clone(), ToolRegistry::new(), Arc::new(EventBus::default()));

        let mut messages = vec![Message::user("Hello!")];
        let outcome = agent.process(&mut messages).await.unwrap();

        assert_eq!(outcome.content, "Hello! What are we making?");
        assert!(!outcome.action_taken);
        // System + User + Assistant
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::System);

        let request = &provider.requests()[0];
        assert!(request.tools.is_empty());
        assert_eq!(request.messages[0].content, "You are a showrunner.");
    }

    #[tokio::test]
    async fn executes_tools_then_answers() {
        let store = SqliteStore::in_memory().await.unwrap();
        let project = store
            .create_project(&NewProject {
                title: "Loop".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_message("add_scene", r#"{"title": "Cold Open"}"#),
            Message::assistant("Added the cold open."),
        ]));
        let bus = Arc::new(EventBus::default());
        let mut events = bus.subscribe();
        let tools = cutify_tools::project_registry(store.clone(), project.id);
        let agent = agent(provider.clone(), tools, bus).for_project(project.id);

        let mut messages = vec![Message::user("Add a cold open")];
        let outcome = agent.process(&mut messages).await.unwrap();

        assert_eq!(outcome.content, "Added the cold open.");
        assert!(outcome.action_taken);
        assert_eq!(store.list_scenes(project.id).await.unwrap().len(), 1);

        // The second request carries the tool result back to the model.
        let second = &provider.requests()[1];
        let tool_msg = second.messages.iter().find(|m| m.role == Role::Tool).unwrap();
        assert_eq!(tool_msg.content, "Successfully added scene: Cold Open (Order: 1)");
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_add_scene"));
        assert_eq!(second.tools.len(), 4);

        let mut saw_tool_event = false;
        while let Ok(event) = events.try_recv() {
            if let DomainEvent::ToolExecuted { tool_name, success, .. } = event.as_ref() {
                assert_eq!(tool_name, "add_scene");
                assert!(success);
                saw_tool_event = true;
            }
        }
        assert!(saw_tool_event);
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_to_model() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_message("launch_rocket", "{}"),
            Message::assistant("I can't do that."),
        ]));
        let agent = agent(provider.clone(), ToolRegistry::new(), Arc::new(EventBus::default()));

        let mut messages = vec![Message::user("Launch")];
        let outcome = agent.process(&mut messages).await.unwrap();
        assert_eq!(outcome.content, "I can't do that.");

        let tool_msg = messages.iter().find(|m| m.role == Role::Tool).unwrap();
        assert!(tool_msg.content.starts_with("Error:"));
    }

    #[tokio::test]
    async fn stops_after_max_iterations() {
        let calls = (0..10).map(|_| tool_call_message("noop", "{}")).collect();
        let provider = Arc::new(ScriptedProvider::new(calls));
        let agent = agent(provider.clone(), ToolRegistry::new(), Arc::new(EventBus::default()))
            .with_max_iterations(2);

        let mut messages = vec![Message::user("Loop forever")];
        let outcome = agent.process(&mut messages).await.unwrap();

        assert_eq!(outcome.content, MAX_ITERATIONS_REPLY);
        assert!(outcome.action_taken);
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let provider = Arc::new(ScriptedProvider::failing());
        let agent = agent(provider, ToolRegistry::new(), Arc::new(EventBus::default()));
        let mut messages = vec![Message::user("Hi")];
        let err = agent.process(&mut messages).await.unwrap_err();
        assert!(matches!(err, cutify_core::Error::Provider(_)));
    }
}
