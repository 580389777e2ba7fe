//! Scripted agents for tests.

use super::{AgentDescriptor, Invoke, RunOutput};
use crate::error::{AgentDeckError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replies from a fixed script and records every prompt it receives.
///
/// An `Err` entry fails that call with `ModelUnavailable`. When the script
/// runs out, the agent echoes the prompt.
pub struct ScriptedAgent {
    descriptor: AgentDescriptor,
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedAgent {
    pub fn new(name: &str) -> Self {
        Self {
            descriptor: AgentDescriptor::new(name, "Scripted", "test-model"),
            script: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, text: &str) -> Self {
        self.script.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.script.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Invoke for ScriptedAgent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, _session_id: &str, prompt: &str) -> Result<RunOutput> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(RunOutput::Text(text)),
            Some(Err(message)) => Err(AgentDeckError::ModelUnavailable(message)),
            None => Ok(RunOutput::Text(prompt.to_string())),
        }
    }
}
