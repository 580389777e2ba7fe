//! Client for the OpenAI-compatible model runtime.

use crate::config::ModelSettings;
use crate::error::{AgentDeckError, Result};
use async_openai::error::OpenAIError;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// API key sent when none is configured. Ollama accepts any value.
const PLACEHOLDER_API_KEY: &str = "ollama";

/// Create a client for the configured model runtime.
pub fn create_client(settings: &ModelSettings) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()?;

    let config = OpenAIConfig::new()
        .with_api_base(settings.base_url.trim_end_matches('/'))
        .with_api_key(
            settings
                .api_key
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_API_KEY.to_string()),
        );

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// List the models the runtime can serve.
///
/// Used as a reachability probe before agents are built.
pub async fn list_models(client: &Client<OpenAIConfig>) -> Result<Vec<String>> {
    let response = client.models().list().await.map_err(classify_error)?;
    Ok(response.data.into_iter().map(|m| m.id).collect())
}

/// Map a runtime error onto the library error, separating "could not reach
/// the runtime" from everything else.
pub fn classify_error(err: OpenAIError) -> AgentDeckError {
    match err {
        OpenAIError::Reqwest(e) if e.is_connect() || e.is_timeout() => {
            AgentDeckError::ModelUnavailable(format!(
                "{}. Make sure Ollama is running ('ollama serve') and the model is pulled.",
                e
            ))
        }
        OpenAIError::ApiError(api) if api.message.contains("not found") => {
            AgentDeckError::ModelUnavailable(format!(
                "{}. Pull it with 'ollama pull <model>'.",
                api.message
            ))
        }
        other => AgentDeckError::Agent(format!("Model runtime error: {}", other)),
    }
}
