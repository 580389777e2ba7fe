//! Pre-flight checks before expensive operations.
//!
//! Validates that the model runtime and required tools are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{AgentDeckError, Result};
use crate::openai::{create_client, list_models};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Chat needs a reachable model runtime.
    Chat,
    /// The fitness planner also needs yt-dlp for the video analyst.
    Fitness,
}

/// Run pre-flight checks for the given operation.
///
/// Returns the models the runtime reports, or an error describing what's missing.
pub async fn check(operation: Operation, settings: &Settings) -> Result<Vec<String>> {
    match operation {
        Operation::Chat => check_runtime(settings).await,
        Operation::Fitness => {
            let models = check_runtime(settings).await?;
            check_tool(&settings.tools.ytdlp_path)?;
            Ok(models)
        }
    }
}

/// Check that the model runtime answers and report its models.
pub async fn check_runtime(settings: &Settings) -> Result<Vec<String>> {
    let client = create_client(&settings.model)?;
    list_models(&client).await
}

/// Check if an external tool is available, returning its version line.
pub fn check_tool(name: &str) -> Result<String> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("installed")
            .trim()
            .to_string()),
        Ok(_) => Err(AgentDeckError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AgentDeckError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(AgentDeckError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
