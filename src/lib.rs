//! agentdeck - chat with local LLM agents
//!
//! A local-first CLI for talking to tool-using agents served by Ollama, plus
//! a health and fitness planner built on the same agents.
//!
//! # Overview
//!
//! agentdeck lets you:
//! - Chat with a Web, Finance or YouTube agent, each with its own tools and history
//! - Generate personalized dietary and fitness plans, ask questions about them
//! - Find and analyse instructional fitness videos
//! - Serve the multi-agent chat over HTTP
//!
//! # Architecture
//!
//! - `config` - Configuration and prompt templates
//! - `openai` - Client for the OpenAI-compatible model runtime
//! - `agent` - Agent descriptors, the tool-calling runner and the registry
//! - `tools` - Web search, financial data and YouTube tools
//! - `storage` - Per-agent conversation history
//! - `conversation` - Surfaces and the conversation controller
//! - `extract` - Video link extraction from agent replies
//! - `fitness` - Profile, plans and the fitness session
//! - `present` - Markdown rendering
//!
//! # Example
//!
//! ```rust,no_run
//! use agentdeck::agent::AgentRegistry;
//! use agentdeck::config::Settings;
//! use agentdeck::conversation::{ConversationController, SurfaceId};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let registry = Arc::new(AgentRegistry::multi_agent(&settings).await?);
//!
//!     let mut chat = ConversationController::new(registry, "example");
//!     chat.open(SurfaceId::Chat, "Finance Agent")?;
//!     let reply = chat.submit(SurfaceId::Chat, "What is NVDA trading at?").await?;
//!     println!("{}", reply.content);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod extract;
pub mod fitness;
pub mod openai;
pub mod present;
pub mod storage;
pub mod tools;

pub use error::{AgentDeckError, Result};
