//! Configuration settings for agentdeck.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub storage: StorageSettings,
    pub tools: ToolSettings,
    pub fitness: FitnessSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.agentdeck".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Model runtime settings.
///
/// Any OpenAI-compatible chat completions server works; the defaults point
/// at a local Ollama instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// API key sent to the runtime. Ollama ignores it.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Model used by the fitness planner when none is given.
    pub default_model: String,
    /// Models suggested by `agentdeck doctor` and the fitness `/model` command.
    pub recommended_models: Vec<String>,
    /// Maximum tool-calling round trips per agent run.
    pub max_tool_iterations: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: None,
            timeout_secs: 300,
            default_model: "llama3.2:3b".to_string(),
            recommended_models: vec![
                "llama3.2:3b".to_string(),
                "qwen2.5:7b".to_string(),
                "deepseek-r1:7b".to_string(),
                "phi4:latest".to_string(),
                "gemma3:12b".to_string(),
            ],
            max_tool_iterations: 10,
        }
    }
}

/// Conversation history storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Persist agent conversation history to SQLite. When disabled, history
    /// lives in memory for the lifetime of the process.
    pub enabled: bool,
    /// Path to the SQLite database.
    pub sqlite_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sqlite_path: "~/.agentdeck/agents.db".to_string(),
        }
    }
}

/// Settings for the tools agents can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Default number of web search results returned to the model.
    pub search_max_results: usize,
    /// HTTP timeout for tool requests, in seconds.
    pub http_timeout_secs: u64,
    /// yt-dlp executable used for YouTube data and captions.
    pub ytdlp_path: String,
    /// Preferred caption language.
    pub caption_language: String,
    /// Maximum caption characters handed back to the model.
    pub max_caption_chars: usize,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            search_max_results: 5,
            http_timeout_secs: 30,
            ytdlp_path: "yt-dlp".to_string(),
            caption_language: "en".to_string(),
            max_caption_chars: 20_000,
        }
    }
}

/// Fitness planner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessSettings {
    /// Model for the video analyst when the chosen model lacks YouTube tool support.
    pub fallback_video_model: String,
    /// Minimum recommended videos attached to a fitness plan.
    pub plan_min_videos: usize,
    /// Maximum recommended videos attached to a fitness plan.
    pub plan_max_videos: usize,
    /// Maximum videos shown by a video search.
    pub search_max_videos: usize,
}

impl Default for FitnessSettings {
    fn default() -> Self {
        Self {
            fallback_video_model: "llama3.2:3b".to_string(),
            plan_min_videos: 2,
            plan_max_videos: 3,
            search_max_videos: 5,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::AgentDeckError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agentdeck")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.storage.sqlite_path)
    }
}
