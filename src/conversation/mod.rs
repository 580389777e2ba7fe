//! Conversation state for chat surfaces.
//!
//! Each surface (the multi-agent chat, or one of the fitness tabs) has its
//! own bound agent and its own transcript. The [`ConversationController`]
//! routes user text to the bound agent and keeps the transcripts.

mod message;

pub use message::{Message, Role};

use crate::agent::AgentRegistry;
use crate::error::{AgentDeckError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// An independent conversational context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceId {
    /// The multi-agent chat.
    Chat,
    PlanGenerator,
    ExpertChat,
    Research,
    VideoResources,
    VideoAnalysis,
}

impl SurfaceId {
    pub fn label(&self) -> &'static str {
        match self {
            SurfaceId::Chat => "Chat",
            SurfaceId::PlanGenerator => "Plan Generator",
            SurfaceId::ExpertChat => "Expert Chat",
            SurfaceId::Research => "Fitness Research",
            SurfaceId::VideoResources => "Video Resources",
            SurfaceId::VideoAnalysis => "Video Analysis",
        }
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One surface's bound agent and transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surface {
    pub agent: String,
    pub messages: Vec<Message>,
}

/// Routes user input to agents and keeps per-surface transcripts.
pub struct ConversationController {
    registry: Arc<AgentRegistry>,
    session_id: String,
    surfaces: BTreeMap<SurfaceId, Surface>,
}

impl ConversationController {
    pub fn new(registry: Arc<AgentRegistry>, session_id: &str) -> Self {
        Self {
            registry,
            session_id: session_id.to_string(),
            surfaces: BTreeMap::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Create `surface` bound to `agent`. An existing surface is left as is.
    pub fn open(&mut self, surface: SurfaceId, agent: &str) -> Result<()> {
        if !self.registry.contains(agent) {
            return Err(AgentDeckError::UnknownAgent(agent.to_string()));
        }
        self.surfaces.entry(surface).or_insert_with(|| Surface {
            agent: agent.to_string(),
            messages: Vec::new(),
        });
        Ok(())
    }

    /// The agent bound to `surface`.
    pub fn active_agent(&self, surface: SurfaceId) -> Option<&str> {
        self.surfaces.get(&surface).map(|s| s.agent.as_str())
    }

    /// Messages of `surface` in insertion order.
    pub fn history(&self, surface: SurfaceId) -> &[Message] {
        self.surfaces
            .get(&surface)
            .map(|s| s.messages.as_slice())
            .unwrap_or(&[])
    }

    /// Drop the transcript of `surface`, keeping its agent.
    pub fn clear(&mut self, surface: SurfaceId) {
        if let Some(state) = self.surfaces.get_mut(&surface) {
            state.messages.clear();
        }
    }

    /// Clear `surface` and the bound agent's stored history for this session.
    pub async fn forget(&mut self, surface: SurfaceId) -> Result<usize> {
        let Some(name) = self.active_agent(surface) else {
            return Ok(0);
        };
        let agent = self.registry.get(name)?;
        self.clear(surface);
        agent.forget(&self.session_id).await
    }

    /// Bind `surface` to another agent.
    ///
    /// Clears the transcript when the agent actually changes and returns
    /// whether it did. Unknown names leave everything untouched.
    pub fn switch_agent(&mut self, surface: SurfaceId, agent: &str) -> Result<bool> {
        if !self.registry.contains(agent) {
            return Err(AgentDeckError::UnknownAgent(agent.to_string()));
        }

        match self.surfaces.get_mut(&surface) {
            Some(state) if state.agent == agent => Ok(false),
            Some(state) => {
                info!("{}: switching agent {} -> {}", surface, state.agent, agent);
                state.agent = agent.to_string();
                state.messages.clear();
                Ok(true)
            }
            None => {
                self.open(surface, agent)?;
                Ok(true)
            }
        }
    }

    /// One-shot run of the agent bound to `surface`; the transcript is not touched.
    pub async fn ask(&self, surface: SurfaceId, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(AgentDeckError::EmptyInput(format!("{} prompt", surface)));
        }
        let name = self.active_agent(surface).ok_or_else(|| {
            AgentDeckError::InvalidInput(format!("{} has no agent selected", surface))
        })?;
        let agent = self.registry.get(name)?;

        debug!("{}: one-shot run of {}", surface, agent.name());
        let output = agent.invoke(&self.session_id, prompt).await?;
        Ok(output.into_text())
    }

    /// Send `text` to the agent bound to `surface`.
    pub async fn submit(&mut self, surface: SurfaceId, text: &str) -> Result<Message> {
        self.submit_with_prompt(surface, text, text).await
    }

    /// Record `shown` as the user's message but send `prompt` to the agent.
    ///
    /// On failure the user message stays without a reply.
    #[instrument(skip(self, shown, prompt), fields(session = %self.session_id))]
    pub async fn submit_with_prompt(
        &mut self,
        surface: SurfaceId,
        shown: &str,
        prompt: &str,
    ) -> Result<Message> {
        let shown = shown.trim();
        if shown.is_empty() || prompt.trim().is_empty() {
            return Err(AgentDeckError::EmptyInput(format!("{} message", surface)));
        }

        let state = self.surfaces.get_mut(&surface).ok_or_else(|| {
            AgentDeckError::InvalidInput(format!("{} has no agent selected", surface))
        })?;
        let agent = self.registry.get(&state.agent)?;

        state.messages.push(Message::user(shown));
        debug!("{}: invoking {}", surface, agent.name());

        match agent.invoke(&self.session_id, prompt).await {
            Ok(output) => {
                let reply = Message::assistant(output.into_text());
                state.messages.push(reply.clone());
                Ok(reply)
            }
            Err(e) => {
                warn!("{}: {} failed: {}", surface, agent.name(), e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::ScriptedAgent;
    use crate::agent::Invoke;

    fn controller(agents: &[Arc<ScriptedAgent>]) -> ConversationController {
        let agents = agents
            .iter()
            .map(|a| a.clone() as Arc<dyn Invoke>)
            .collect();
        let registry = AgentRegistry::from_agents("test", agents).unwrap();
        let mut controller = ConversationController::new(Arc::new(registry), "session-1");
        controller.open(SurfaceId::Chat, "Web Agent").unwrap();
        controller
    }

    #[tokio::test]
    async fn test_submit_appends_exchange() {
        let web = ScriptedAgent::new("Web Agent").reply("Paris.").into_arc();
        let mut controller = controller(&[web.clone()]);

        let reply = controller
            .submit(SurfaceId::Chat, "Capital of France?")
            .await
            .unwrap();

        assert_eq!(reply, Message::assistant("Paris."));
        assert_eq!(
            controller.history(SurfaceId::Chat),
            &[Message::user("Capital of France?"), Message::assistant("Paris.")]
        );
        assert_eq!(web.prompts(), vec!["Capital of France?"]);
    }

    #[tokio::test]
    async fn test_empty_input_appends_nothing() {
        let web = ScriptedAgent::new("Web Agent").into_arc();
        let mut controller = controller(&[web.clone()]);

        let err = controller.submit(SurfaceId::Chat, "   \n").await.unwrap_err();
        assert!(matches!(err, AgentDeckError::EmptyInput(_)));
        assert!(controller.history(SurfaceId::Chat).is_empty());
        assert!(web.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_user_message_only() {
        let web = ScriptedAgent::new("Web Agent").fail("connection refused").into_arc();
        let mut controller = controller(&[web]);

        let err = controller.submit(SurfaceId::Chat, "hello").await.unwrap_err();
        assert!(err.is_model_unavailable());
        assert_eq!(controller.history(SurfaceId::Chat), &[Message::user("hello")]);
    }

    #[tokio::test]
    async fn test_switching_agent_clears_history() {
        let web = ScriptedAgent::new("Web Agent").reply("one").into_arc();
        let finance = ScriptedAgent::new("Finance Agent").into_arc();
        let mut controller = controller(&[web, finance]);

        controller.submit(SurfaceId::Chat, "hi").await.unwrap();
        assert_eq!(controller.history(SurfaceId::Chat).len(), 2);

        assert!(!controller.switch_agent(SurfaceId::Chat, "Web Agent").unwrap());
        assert_eq!(controller.history(SurfaceId::Chat).len(), 2);

        assert!(controller.switch_agent(SurfaceId::Chat, "Finance Agent").unwrap());
        assert!(controller.history(SurfaceId::Chat).is_empty());
        assert_eq!(controller.active_agent(SurfaceId::Chat), Some("Finance Agent"));
    }

    #[tokio::test]
    async fn test_unknown_agent_leaves_state_untouched() {
        let web = ScriptedAgent::new("Web Agent").reply("one").into_arc();
        let mut controller = controller(&[web]);
        controller.submit(SurfaceId::Chat, "hi").await.unwrap();

        let err = controller.switch_agent(SurfaceId::Chat, "Nope").unwrap_err();
        assert!(matches!(err, AgentDeckError::UnknownAgent(_)));
        assert_eq!(controller.active_agent(SurfaceId::Chat), Some("Web Agent"));
        assert_eq!(controller.history(SurfaceId::Chat).len(), 2);
    }

    #[tokio::test]
    async fn test_surfaces_are_independent() {
        let web = ScriptedAgent::new("Web Agent").reply("a").reply("b").into_arc();
        let mut controller = controller(&[web]);
        controller.open(SurfaceId::Research, "Web Agent").unwrap();

        controller.submit(SurfaceId::Chat, "first").await.unwrap();
        controller
            .submit_with_prompt(SurfaceId::Research, "creatine", "Research creatine in depth")
            .await
            .unwrap();

        assert_eq!(controller.history(SurfaceId::Chat).len(), 2);
        assert_eq!(
            controller.history(SurfaceId::Research)[0],
            Message::user("creatine")
        );

        controller.clear(SurfaceId::Chat);
        assert!(controller.history(SurfaceId::Chat).is_empty());
        assert_eq!(controller.history(SurfaceId::Research).len(), 2);
    }

    #[tokio::test]
    async fn test_ask_leaves_transcript_alone() {
        let web = ScriptedAgent::new("Web Agent").reply("plan text").into_arc();
        let controller = controller(&[web.clone()]);

        let text = controller.ask(SurfaceId::Chat, "make a plan").await.unwrap();
        assert_eq!(text, "plan text");
        assert!(controller.history(SurfaceId::Chat).is_empty());
        assert_eq!(web.prompts(), vec!["make a plan"]);
    }

    #[tokio::test]
    async fn test_forget_clears_transcript() {
        let web = ScriptedAgent::new("Web Agent").reply("one").into_arc();
        let mut controller = controller(&[web]);
        controller.submit(SurfaceId::Chat, "hi").await.unwrap();

        assert_eq!(controller.forget(SurfaceId::Chat).await.unwrap(), 0);
        assert!(controller.history(SurfaceId::Chat).is_empty());
        assert_eq!(controller.forget(SurfaceId::Research).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unopened_surface_rejected() {
        let web = ScriptedAgent::new("Web Agent").into_arc();
        let mut controller = controller(&[web]);
        let err = controller
            .submit(SurfaceId::VideoAnalysis, "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentDeckError::InvalidInput(_)));
    }
}
