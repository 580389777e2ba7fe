//! Error types for agentdeck.

use thiserror::Error;

/// Library-level error type for agentdeck operations.
#[derive(Error, Debug)]
pub enum AgentDeckError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model runtime unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Input is empty: {0}")]
    EmptyInput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No plans generated yet. Generate a plan first.")]
    PlansNotGenerated,

    #[error("History store error: {0}")]
    History(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AgentDeckError {
    /// Whether this error means the model runtime could not be reached.
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, AgentDeckError::ModelUnavailable(_))
    }
}

/// Result type alias for agentdeck operations.
pub type Result<T> = std::result::Result<T, AgentDeckError>;
