//! Agent runner with tool calling loop.

use super::{AgentDescriptor, Invoke, RunOutput};
use crate::conversation::Role;
use crate::error::{AgentDeckError, Result};
use crate::openai::classify_error;
use crate::storage::{HistoryStore, StoredMessage};
use crate::tools::{is_allowed, parse_tool_call, tool_definitions, ToolBox};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// An agent bound to the model runtime, its tools and its history table.
pub struct Agent {
    descriptor: AgentDescriptor,
    client: Client<OpenAIConfig>,
    tools: Arc<ToolBox>,
    history: Option<Arc<dyn HistoryStore>>,
    max_iterations: usize,
}

impl Agent {
    pub fn new(
        descriptor: AgentDescriptor,
        client: Client<OpenAIConfig>,
        tools: Arc<ToolBox>,
        history: Option<Arc<dyn HistoryStore>>,
    ) -> Self {
        Self {
            descriptor,
            client,
            tools,
            history,
            max_iterations: 10,
        }
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    async fn load_history(&self, session_id: &str) -> Vec<StoredMessage> {
        let (Some(store), Some(table)) = (&self.history, &self.descriptor.storage_table) else {
            return Vec::new();
        };
        if self.descriptor.history_depth == 0 {
            return Vec::new();
        }

        match store.recent(table, session_id, self.descriptor.history_depth).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!("Failed to load history for {}: {}", self.descriptor.name, e);
                Vec::new()
            }
        }
    }

    async fn save_exchange(&self, session_id: &str, prompt: &str, reply: &str) {
        let (Some(store), Some(table)) = (&self.history, &self.descriptor.storage_table) else {
            return;
        };

        for message in [
            StoredMessage::new(session_id, Role::User, prompt),
            StoredMessage::new(session_id, Role::Assistant, reply),
        ] {
            if let Err(e) = store.append(table, &message).await {
                warn!("Failed to store history for {}: {}", self.descriptor.name, e);
                return;
            }
        }
    }

    /// Run the tool-calling loop for one prompt.
    #[instrument(skip(self, prompt), fields(agent = %self.descriptor.name))]
    pub async fn run(&self, session_id: &str, prompt: &str) -> Result<AgentResponse> {
        let history = self.load_history(session_id).await;
        let system_prompt = self.descriptor.system_prompt(Local::now());
        let mut messages = build_messages(&system_prompt, &history, prompt)?;
        let tools = tool_definitions(&self.descriptor.tools);

        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(AgentDeckError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}, {} messages", iterations, messages.len());

            let mut args = CreateChatCompletionRequestArgs::default();
            args.model(&self.descriptor.model).messages(messages.clone());
            if !tools.is_empty() {
                args.tools(tools.clone());
            }
            let request = args.build().map_err(|e| AgentDeckError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(classify_error)?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| AgentDeckError::Agent("No response from model".to_string()))?;

            match &choice.message.tool_calls {
                Some(tool_calls) if !tool_calls.is_empty() => {
                    let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                        .tool_calls(tool_calls.clone())
                        .build()
                        .map_err(|e| AgentDeckError::Agent(e.to_string()))?;
                    messages.push(assistant_msg.into());

                    for tool_call in tool_calls {
                        let record = self.execute_tool_call(tool_call).await;

                        let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                            .tool_call_id(&tool_call.id)
                            .content(record.result.clone())
                            .build()
                            .map_err(|e| AgentDeckError::Agent(e.to_string()))?;
                        messages.push(tool_msg.into());

                        tool_calls_made.push(record);
                    }
                }
                _ => {
                    let content = choice.message.content.clone().unwrap_or_default();
                    self.save_exchange(session_id, prompt, &content).await;

                    return Ok(AgentResponse {
                        content,
                        tool_calls: tool_calls_made,
                        iterations,
                        show_tool_calls: self.descriptor.show_tool_calls,
                    });
                }
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("{} calling tool: {} with args: {}", self.descriptor.name, name, arguments);

        let result = match parse_tool_call(name, arguments, self.tools.default_max_results()) {
            Ok(call) if !is_allowed(&self.descriptor.tools, &call) => {
                warn!("{} requested disallowed tool {}", self.descriptor.name, name);
                format!("Tool {} is not available to this agent", name)
            }
            Ok(call) => match self.tools.execute(&call).await {
                Ok(output) => output,
                Err(e) => format!("Tool error: {}", e),
            },
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }
}

#[async_trait]
impl Invoke for Agent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, session_id: &str, prompt: &str) -> Result<RunOutput> {
        self.run(session_id, prompt).await.map(RunOutput::Response)
    }

    async fn forget(&self, session_id: &str) -> Result<usize> {
        match (&self.history, &self.descriptor.storage_table) {
            (Some(store), Some(table)) => store.clear(table, session_id).await,
            _ => Ok(0),
        }
    }
}

/// Assemble the request messages: system prompt, replayed history, then the prompt.
fn build_messages(
    system_prompt: &str,
    history: &[StoredMessage],
    prompt: &str,
) -> Result<Vec<ChatCompletionRequestMessage>> {
    let mut messages: Vec<ChatCompletionRequestMessage> = vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(|e| AgentDeckError::Agent(e.to_string()))?
            .into(),
    ];

    for stored in history {
        let message: ChatCompletionRequestMessage = match stored.role {
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(stored.content.as_str())
                .build()
                .map_err(|e| AgentDeckError::Agent(e.to_string()))?
                .into(),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(stored.content.as_str())
                .build()
                .map_err(|e| AgentDeckError::Agent(e.to_string()))?
                .into(),
        };
        messages.push(message);
    }

    messages.push(
        ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| AgentDeckError::Agent(e.to_string()))?
            .into(),
    );

    Ok(messages)
}

/// Response from an agent run.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
    pub show_tool_calls: bool,
}

impl AgentResponse {
    /// The content, prefixed with the tool calls when the agent shows them.
    pub fn display_text(self) -> String {
        if !self.show_tool_calls || self.tool_calls.is_empty() {
            return self.content;
        }

        let calls = self
            .tool_calls
            .iter()
            .map(|call| format!(" - {}", call))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Running:\n{}\n\n{}", calls, self.content)
    }
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ToolCallRecord {
        ToolCallRecord {
            name: "web_search".to_string(),
            arguments: r#"{"query": "test"}"#.to_string(),
            result: "Found results".to_string(),
        }
    }

    #[test]
    fn test_tool_call_record_display() {
        assert_eq!(format!("{}", record()), r#"web_search({"query": "test"})"#);
    }

    #[test]
    fn test_display_text_shows_tool_calls_when_enabled() {
        let response = AgentResponse {
            content: "NVDA is up.".to_string(),
            tool_calls: vec![record()],
            iterations: 2,
            show_tool_calls: true,
        };
        assert_eq!(
            response.display_text(),
            "Running:\n - web_search({\"query\": \"test\"})\n\nNVDA is up."
        );
    }

    #[test]
    fn test_display_text_plain_when_disabled() {
        let response = AgentResponse {
            content: "Hello".to_string(),
            tool_calls: vec![record()],
            iterations: 2,
            show_tool_calls: false,
        };
        assert_eq!(response.display_text(), "Hello");
    }

    #[test]
    fn test_build_messages_order() {
        let history = vec![
            StoredMessage::new("s", Role::User, "earlier question"),
            StoredMessage::new("s", Role::Assistant, "earlier answer"),
        ];
        let messages = build_messages("system", &history, "now").unwrap();

        assert_eq!(messages.len(), 4);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(messages[2], ChatCompletionRequestMessage::Assistant(_)));
        assert!(matches!(messages[3], ChatCompletionRequestMessage::User(_)));
    }

    #[tokio::test]
    async fn test_forget_clears_stored_session() {
        use crate::config::{ModelSettings, ToolSettings};
        use crate::openai::create_client;
        use crate::storage::MemoryHistoryStore;

        let store = Arc::new(MemoryHistoryStore::new());
        for session in ["s1", "s1", "s2"] {
            store
                .append("web_agent", &StoredMessage::new(session, Role::User, "hi"))
                .await
                .unwrap();
        }

        let agent = Agent::new(
            AgentDescriptor::new("Web Agent", "Search", "llama3.2").with_history("web_agent", 2),
            create_client(&ModelSettings::default()).unwrap(),
            Arc::new(ToolBox::new(&ToolSettings::default()).unwrap()),
            Some(store.clone() as Arc<dyn HistoryStore>),
        );

        assert_eq!(agent.forget("s1").await.unwrap(), 2);
        assert_eq!(store.count("web_agent", "s1").await.unwrap(), 0);
        assert_eq!(store.count("web_agent", "s2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_runtime_is_model_unavailable() {
        use crate::config::{ModelSettings, ToolSettings};
        use crate::openai::create_client;

        let settings = ModelSettings {
            base_url: "http://127.0.0.1:9/v1".to_string(),
            timeout_secs: 2,
            ..ModelSettings::default()
        };
        let agent = Agent::new(
            AgentDescriptor::new("Test Agent", "Answer", "llama3.2"),
            create_client(&settings).unwrap(),
            Arc::new(ToolBox::new(&ToolSettings::default()).unwrap()),
            None,
        );

        let err = agent.invoke("s", "hello").await.unwrap_err();
        assert!(err.is_model_unavailable());
    }
}
