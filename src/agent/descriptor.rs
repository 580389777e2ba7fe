//! Declarative agent configuration.

use crate::tools::ToolKind;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Everything needed to run one named agent.
///
/// Descriptors are built once when a registry is assembled and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Display name, unique within a registry.
    pub name: String,
    /// Stable slug, e.g. `web-agent`.
    pub id: String,
    pub role: String,
    /// Model identifier understood by the runtime.
    pub model: String,
    /// Optional persona sentence placed at the top of the system prompt.
    pub description: Option<String>,
    pub instructions: Vec<String>,
    pub tools: Vec<ToolKind>,
    /// Number of previous exchanges replayed to the model. 0 disables history.
    pub history_depth: usize,
    /// History table name; `None` keeps no persistent history.
    pub storage_table: Option<String>,
    pub add_name_to_instructions: bool,
    pub add_datetime_to_instructions: bool,
    pub markdown: bool,
    /// Prefix replies with the tool calls that produced them.
    pub show_tool_calls: bool,
}

impl AgentDescriptor {
    pub fn new(name: &str, role: &str, model: &str) -> Self {
        Self {
            name: name.to_string(),
            id: slugify(name),
            role: role.to_string(),
            model: model.to_string(),
            description: None,
            instructions: Vec::new(),
            tools: Vec::new(),
            history_depth: 0,
            storage_table: None,
            add_name_to_instructions: false,
            add_datetime_to_instructions: false,
            markdown: true,
            show_tool_calls: false,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions.extend(instructions.into_iter().map(Into::into));
        self
    }

    pub fn with_tool(mut self, tool: ToolKind) -> Self {
        self.tools.push(tool);
        self
    }

    /// Keep `depth` exchanges of history in `table`.
    pub fn with_history(mut self, table: &str, depth: usize) -> Self {
        self.storage_table = Some(table.to_string());
        self.history_depth = depth;
        self
    }

    pub fn with_name_and_datetime(mut self) -> Self {
        self.add_name_to_instructions = true;
        self.add_datetime_to_instructions = true;
        self
    }

    pub fn with_tool_calls_shown(mut self) -> Self {
        self.show_tool_calls = true;
        self
    }

    /// Whether the agent both stores and replays history.
    pub fn keeps_history(&self) -> bool {
        self.storage_table.is_some() && self.history_depth > 0
    }

    /// Build the system prompt for a run starting at `now`.
    pub fn system_prompt(&self, now: DateTime<Local>) -> String {
        let mut prompt = String::new();

        if let Some(description) = &self.description {
            prompt.push_str(description);
            prompt.push_str("\n\n");
        }

        if self.add_name_to_instructions {
            prompt.push_str(&format!("Your name is: {}.\n", self.name));
        }
        prompt.push_str(&format!("Your role is: {}\n", self.role));

        let mut instructions = self.instructions.clone();
        if self.markdown {
            instructions.push("Use markdown to format your answers.".to_string());
        }
        if !instructions.is_empty() {
            prompt.push_str("\n<instructions>\n");
            for instruction in &instructions {
                prompt.push_str(&format!("- {}\n", instruction));
            }
            prompt.push_str("</instructions>\n");
        }

        if self.add_datetime_to_instructions {
            prompt.push_str(&format!(
                "\nThe current time is {}\n",
                now.format("%Y-%m-%d %H:%M:%S")
            ));
        }

        prompt
    }
}

fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}
