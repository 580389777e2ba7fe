//! Configuration module for agentdeck.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{FitnessPrompts, Prompts};
pub use settings::{
    FitnessSettings, GeneralSettings, ModelSettings, PromptSettings, Settings, StorageSettings,
    ToolSettings,
};
