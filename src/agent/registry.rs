//! Agent registry: the set of agents a front-end can talk to.

use super::{Agent, AgentDescriptor, Invoke};
use crate::config::Settings;
use crate::error::{AgentDeckError, Result};
use crate::openai::{create_client, list_models};
use crate::storage::{HistoryStore, MemoryHistoryStore, SqliteHistoryStore};
use crate::tools::{FinanceFeatures, ToolBox, ToolKind};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Instruction appended to every agent of the multi-agent registry.
pub const COMMON_INSTRUCTION: &str =
    "If the user asks about you or your skills, tell them your name and role.";

/// Key of the multi-agent registry.
const MULTI_AGENT_KEY: &str = "multi-agent";

/// Descriptors for the Web, Finance and YouTube agents.
pub fn multi_agent_descriptors() -> Vec<AgentDescriptor> {
    vec![
        AgentDescriptor::new("Web Agent", "Search the web for information", "llama3.2")
            .with_tool(ToolKind::WebSearch { news: true })
            .with_instructions(["Always include sources.", COMMON_INSTRUCTION])
            .with_history("web_agent", 2)
            .with_name_and_datetime()
            .with_tool_calls_shown(),
        AgentDescriptor::new("Finance Agent", "Get financial data", "llama3.2:3b")
            .with_tool(ToolKind::Finance(FinanceFeatures::all()))
            .with_description(
                "You are an investment analyst that researches stocks and helps users make informed decisions.",
            )
            .with_instructions(["Always use tables to display data", COMMON_INSTRUCTION])
            .with_history("finance_agent", 5)
            .with_name_and_datetime(),
        AgentDescriptor::new(
            "YouTube Agent",
            "Understand YouTube videos and answer questions",
            "llama3.2:latest",
        )
        .with_tool(ToolKind::YouTube)
        .with_description(
            "You are a YouTube agent that has the special skill of understanding YouTube videos and answering questions about them.",
        )
        .with_instructions([
            "Using a video URL, get the video data using the `get_youtube_video_data` tool and captions using the `get_youtube_video_captions` tool.",
            "Using the data and captions, answer the user's question in an engaging and thoughtful manner. Focus on the most important details.",
            "If you cannot find the answer in the video, say so and ask the user to provide more details.",
            "Keep your answers concise and engaging.",
            COMMON_INSTRUCTION,
        ])
        .with_history("youtube_agent", 5)
        .with_name_and_datetime()
        .with_tool_calls_shown(),
    ]
}

/// Descriptors for the fitness assistant and the video analyst.
///
/// The analyst runs `model` only when it is a llama or qwen model, otherwise
/// `fallback_video_model`.
pub fn fitness_descriptors(model: &str, fallback_video_model: &str) -> Vec<AgentDescriptor> {
    let video_model = if model.contains("llama") || model.contains("qwen") {
        model
    } else {
        fallback_video_model
    };

    vec![
        AgentDescriptor::new(
            "Smart Fitness Assistant",
            "Comprehensive health and fitness expert",
            model,
        )
        .with_tool(ToolKind::WebSearch { news: true })
        .with_tool(ToolKind::YouTube)
        .with_instructions([
            "You are a comprehensive health and fitness expert specializing in nutrition, exercise, and wellness optimization.",
            "Always provide evidence-based recommendations and include sources when possible.",
            "Intermittent fasting (12-16 hours) should be incorporated into dietary recommendations when appropriate.",
            "Use the web search tool for any fitness or nutrition information you need to verify.",
            "Use the YouTube tool to find and recommend relevant fitness videos when appropriate.",
            "Present information in a clear, structured format with tables when helpful.",
            "Only respond to questions related to fitness, nutrition, and health. Politely decline other topics.",
            "Always consider the user's specific profile and goals in your recommendations.",
        ])
        .with_tool_calls_shown(),
        AgentDescriptor::new(
            "YouTube Fitness Analyst",
            "Analyze YouTube videos and answer questions about them",
            video_model,
        )
        .with_tool(ToolKind::YouTube)
        .with_instructions([
            "You are specialized in analyzing fitness and workout YouTube videos.",
            "Using a video URL, get the video data and captions using the YouTube tools.",
            "Extract key information such as workout techniques, nutritional advice, and training tips.",
            "Provide timestamp references when discussing specific parts of videos.",
            "Focus on practical, actionable takeaways from fitness videos.",
            "If you cannot find the answer in the video, say so clearly.",
            "Keep your answers concise, informative, and engaging.",
        ])
        .with_tool_calls_shown(),
    ]
}

/// Agents available to one front-end, in display order.
///
/// Built once at startup and passed by reference. Names are unique.
pub struct AgentRegistry {
    key: String,
    agents: Vec<Arc<dyn Invoke>>,
}

impl AgentRegistry {
    /// Wrap already-constructed agents.
    pub fn from_agents(key: &str, agents: Vec<Arc<dyn Invoke>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.name().to_string()) {
                return Err(AgentDeckError::Config(format!(
                    "Duplicate agent name: {}",
                    agent.name()
                )));
            }
        }

        Ok(Self {
            key: key.to_string(),
            agents,
        })
    }

    /// Build agents for `descriptors` against the configured runtime.
    ///
    /// Probes the runtime first; an unreachable runtime is `ModelUnavailable`.
    pub async fn build(
        settings: &Settings,
        key: &str,
        descriptors: Vec<AgentDescriptor>,
    ) -> Result<Self> {
        let client = create_client(&settings.model)?;

        let available = list_models(&client).await?;
        for descriptor in &descriptors {
            if !model_is_listed(&available, &descriptor.model) {
                warn!(
                    "Model {} for {} is not pulled; run 'ollama pull {}'",
                    descriptor.model, descriptor.name, descriptor.model
                );
            }
        }

        let history = open_history_store(settings, &descriptors)?;
        let tools = Arc::new(ToolBox::new(&settings.tools)?);

        let agents = descriptors
            .into_iter()
            .map(|descriptor| {
                let agent = Agent::new(descriptor, client.clone(), tools.clone(), history.clone())
                    .with_max_iterations(settings.model.max_tool_iterations);
                Arc::new(agent) as Arc<dyn Invoke>
            })
            .collect();

        let registry = Self::from_agents(key, agents)?;
        info!("Built registry {} with agents: {}", key, registry.names().join(", "));
        Ok(registry)
    }

    /// The Web, Finance and YouTube agents.
    pub async fn multi_agent(settings: &Settings) -> Result<Self> {
        Self::build(settings, MULTI_AGENT_KEY, multi_agent_descriptors()).await
    }

    /// The fitness assistant and video analyst for `model`.
    pub async fn fitness(settings: &Settings, model: &str) -> Result<Self> {
        let descriptors = fitness_descriptors(model, &settings.fitness.fallback_video_model);
        Self::build(settings, model, descriptors).await
    }

    /// The parameters this registry was built for.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Invoke>> {
        self.agents
            .iter()
            .find(|a| a.name() == name)
            .cloned()
            .ok_or_else(|| AgentDeckError::UnknownAgent(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.iter().any(|a| a.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name()).collect()
    }

    pub fn descriptors(&self) -> Vec<&AgentDescriptor> {
        self.agents.iter().map(|a| a.descriptor()).collect()
    }

    /// The first agent, used as the default selection.
    pub fn default_agent(&self) -> Option<&str> {
        self.agents.first().map(|a| a.name())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// `llama3.2` matches a listed `llama3.2:latest`.
pub fn model_is_listed(available: &[String], model: &str) -> bool {
    available
        .iter()
        .any(|m| m == model || (!model.contains(':') && *m == format!("{}:latest", model)))
}

fn open_history_store(
    settings: &Settings,
    descriptors: &[AgentDescriptor],
) -> Result<Option<Arc<dyn HistoryStore>>> {
    if !descriptors.iter().any(|d| d.storage_table.is_some()) {
        return Ok(None);
    }
    if !settings.storage.enabled {
        return Ok(Some(Arc::new(MemoryHistoryStore::new())));
    }

    let path = settings.sqlite_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = SqliteHistoryStore::new(&path)?;
    Ok(Some(Arc::new(store)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::RunOutput;
    use async_trait::async_trait;

    struct Echo(AgentDescriptor);

    #[async_trait]
    impl Invoke for Echo {
        fn descriptor(&self) -> &AgentDescriptor {
            &self.0
        }

        async fn invoke(&self, _session_id: &str, prompt: &str) -> Result<RunOutput> {
            Ok(RunOutput::Text(prompt.to_string()))
        }
    }

    fn echo(name: &str) -> Arc<dyn Invoke> {
        Arc::new(Echo(AgentDescriptor::new(name, "r", "m")))
    }

    #[test]
    fn test_multi_agent_descriptors() {
        let descriptors = multi_agent_descriptors();
        let names: Vec<_> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Web Agent", "Finance Agent", "YouTube Agent"]);

        let web = &descriptors[0];
        assert_eq!(web.id, "web-agent");
        assert_eq!(web.model, "llama3.2");
        assert_eq!(web.history_depth, 2);
        assert_eq!(web.storage_table.as_deref(), Some("web_agent"));

        let finance = &descriptors[1];
        assert_eq!(finance.model, "llama3.2:3b");
        assert_eq!(finance.history_depth, 5);
        assert!(finance.instructions.contains(&"Always use tables to display data".to_string()));

        assert_eq!(descriptors[2].model, "llama3.2:latest");
        assert!(descriptors
            .iter()
            .all(|d| d.instructions.last().map(String::as_str) == Some(COMMON_INSTRUCTION)));
    }

    #[test]
    fn test_fitness_video_model_selection() {
        let llama = fitness_descriptors("llama3.1:8b", "llama3.2:3b");
        assert_eq!(llama[1].model, "llama3.1:8b");

        let qwen = fitness_descriptors("qwen2.5:7b", "llama3.2:3b");
        assert_eq!(qwen[1].model, "qwen2.5:7b");

        let mistral = fitness_descriptors("mistral:7b", "llama3.2:3b");
        assert_eq!(mistral[0].model, "mistral:7b");
        assert_eq!(mistral[1].model, "llama3.2:3b");
    }

    #[test]
    fn test_descriptors_are_deterministic() {
        assert_eq!(multi_agent_descriptors(), multi_agent_descriptors());
        assert_eq!(
            fitness_descriptors("llama3.2:3b", "llama3.2:3b"),
            fitness_descriptors("llama3.2:3b", "llama3.2:3b")
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = AgentRegistry::from_agents("k", vec![echo("A"), echo("A")]);
        assert!(matches!(result, Err(AgentDeckError::Config(_))));
    }

    #[test]
    fn test_lookup() {
        let registry = AgentRegistry::from_agents("k", vec![echo("A"), echo("B")]).unwrap();
        assert_eq!(registry.names(), vec!["A", "B"]);
        assert_eq!(registry.default_agent(), Some("A"));
        assert!(registry.get("B").is_ok());
        assert!(matches!(
            registry.get("C"),
            Err(AgentDeckError::UnknownAgent(_))
        ));
    }

    #[test]
    fn test_model_is_listed() {
        let available = vec!["llama3.2:latest".to_string(), "llama3.2:3b".to_string()];
        assert!(model_is_listed(&available, "llama3.2"));
        assert!(model_is_listed(&available, "llama3.2:3b"));
        assert!(!model_is_listed(&available, "qwen2.5:7b"));
    }

    #[tokio::test]
    async fn test_build_fails_when_runtime_unreachable() {
        let mut settings = Settings::default();
        settings.model.base_url = "http://127.0.0.1:9/v1".to_string();
        settings.model.timeout_secs = 2;
        settings.storage.enabled = false;

        let result = AgentRegistry::multi_agent(&settings).await;
        assert!(matches!(result, Err(e) if e.is_model_unavailable()));
    }
}
