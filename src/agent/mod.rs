//! Named LLM agents with tool calling and persistent history.
//!
//! An [`AgentDescriptor`] declares what an agent is; an [`Agent`] runs it
//! against the model runtime; an [`AgentRegistry`] owns the agents a front-end
//! can talk to. Everything above this module sees agents only through the
//! [`Invoke`] trait.

mod descriptor;
mod registry;
mod runner;
#[cfg(test)]
pub(crate) mod testing;

pub use descriptor::AgentDescriptor;
pub use registry::{
    fitness_descriptors, model_is_listed, multi_agent_descriptors, AgentRegistry, COMMON_INSTRUCTION,
};
pub use runner::{Agent, AgentResponse, ToolCallRecord};

use crate::error::Result;
use async_trait::async_trait;

/// The result of one agent invocation.
#[derive(Debug, Clone)]
pub enum RunOutput {
    /// A full run record from the tool-calling runner.
    Response(AgentResponse),
    /// Plain text.
    Text(String),
}

impl RunOutput {
    /// The text to show the user.
    pub fn into_text(self) -> String {
        match self {
            RunOutput::Response(response) => response.display_text(),
            RunOutput::Text(text) => text,
        }
    }
}

/// Something that answers a prompt.
#[async_trait]
pub trait Invoke: Send + Sync {
    fn descriptor(&self) -> &AgentDescriptor;

    /// Answer `prompt` within the history of `session_id`.
    async fn invoke(&self, session_id: &str, prompt: &str) -> Result<RunOutput>;

    fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// Drop the stored history of `session_id`, returning how many messages went.
    async fn forget(&self, _session_id: &str) -> Result<usize> {
        Ok(0)
    }
}
