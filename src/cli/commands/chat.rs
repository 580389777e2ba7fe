//! Interactive multi-agent chat command.

use crate::agent::AgentRegistry;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::conversation::{ConversationController, SurfaceId};
use crate::error::AgentDeckError;
use crate::present::render_transcript;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// A line typed at the chat prompt.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Quit,
    Clear,
    History,
    ListAgents,
    Switch(&'a str),
    Help,
    Unknown(&'a str),
    Message(&'a str),
}

fn parse_input(line: &str) -> Option<ChatInput<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return Some(ChatInput::Quit);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Some(ChatInput::Message(line));
    };

    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
    let rest = rest.trim();
    Some(match name.to_ascii_lowercase().as_str() {
        "quit" | "exit" => ChatInput::Quit,
        "clear" => ChatInput::Clear,
        "history" => ChatInput::History,
        "agents" => ChatInput::ListAgents,
        "agent" if !rest.is_empty() => ChatInput::Switch(rest),
        "agent" => ChatInput::ListAgents,
        "help" => ChatInput::Help,
        _ => ChatInput::Unknown(name),
    })
}

/// Resolve a user-typed agent name: exact, then case-insensitive, then by
/// the first word ("finance" selects "Finance Agent").
fn resolve_agent<'r>(registry: &'r AgentRegistry, wanted: &str) -> Option<&'r str> {
    let names = registry.names();
    names
        .iter()
        .find(|n| **n == wanted)
        .or_else(|| names.iter().find(|n| n.eq_ignore_ascii_case(wanted)))
        .or_else(|| {
            names.iter().find(|n| {
                n.split_whitespace()
                    .next()
                    .is_some_and(|first| first.eq_ignore_ascii_case(wanted))
            })
        })
        .copied()
}

fn print_help() {
    Output::kv("/agents", "list agents");
    Output::kv("/agent NAME", "switch agent (clears the conversation)");
    Output::kv("/history", "show the conversation so far");
    Output::kv("/clear", "start over (also forgets the agent's stored history)");
    Output::kv("exit", "quit");
}

/// Run the interactive chat command.
pub async fn run_chat(agent: Option<String>, session: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings).await {
        Output::error(&format!("{}", e));
        Output::info("Run 'agentdeck doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let registry = Arc::new(AgentRegistry::multi_agent(&settings).await?);
    let start = match agent.as_deref() {
        Some(wanted) => resolve_agent(&registry, wanted)
            .ok_or_else(|| AgentDeckError::UnknownAgent(wanted.to_string()))?
            .to_string(),
        None => registry
            .default_agent()
            .ok_or_else(|| AgentDeckError::Config("No agents configured".to_string()))?
            .to_string(),
    };

    let session_id = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    info!("Chat session {}", session_id);

    let mut controller = ConversationController::new(registry.clone(), &session_id);
    controller.open(SurfaceId::Chat, &start)?;

    println!("\n{}", style("Multi-Agent Chat").bold().cyan());
    println!(
        "{}\n",
        style(format!(
            "Agents: {}. Type /help for commands, or 'exit' to quit.",
            registry.names().join(", ")
        ))
        .dim()
    );

    let stdin = io::stdin();
    loop {
        let current = controller
            .active_agent(SurfaceId::Chat)
            .unwrap_or_default()
            .to_string();
        Output::prompt(&current);

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let Some(input) = parse_input(&line) else {
            continue;
        };

        match input {
            ChatInput::Quit => {
                Output::info("Goodbye!");
                break;
            }
            ChatInput::Clear => match controller.forget(SurfaceId::Chat).await {
                Ok(removed) => Output::info(&format!(
                    "Conversation history cleared ({} stored messages removed).",
                    removed
                )),
                Err(e) => Output::error(&format!("Failed to clear history: {}", e)),
            },
            ChatInput::History => {
                let messages = controller.history(SurfaceId::Chat);
                if messages.is_empty() {
                    Output::info("No messages yet.");
                } else {
                    Output::markdown(&render_transcript(messages, &current));
                }
            }
            ChatInput::ListAgents => {
                for name in registry.names() {
                    if name == current {
                        Output::list_item(&format!("{} {}", name, style("(active)").dim()));
                    } else {
                        Output::list_item(name);
                    }
                }
            }
            ChatInput::Switch(wanted) => match resolve_agent(&registry, wanted) {
                Some(name) => {
                    if controller.switch_agent(SurfaceId::Chat, name)? {
                        Output::success(&format!("Now chatting with {}", name));
                    } else {
                        Output::info(&format!("Already chatting with {}", name));
                    }
                }
                None => Output::error(&format!("Unknown agent: {}", wanted)),
            },
            ChatInput::Help => print_help(),
            ChatInput::Unknown(name) => {
                Output::warning(&format!("Unknown command /{}. Type /help.", name));
            }
            ChatInput::Message(text) => {
                let spinner = Output::spinner(&format!("{} is thinking...", current));
                let started = Instant::now();
                let result = controller.submit(SurfaceId::Chat, text).await;
                spinner.finish_and_clear();

                match result {
                    Ok(reply) => Output::reply(&current, &reply.content, started.elapsed()),
                    Err(e) if e.is_model_unavailable() => {
                        Output::error(&format!("{}", e));
                        Output::info("Check that Ollama is running and the model is pulled.");
                    }
                    Err(e) => Output::error(&format!("Error: {}", e)),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::ScriptedAgent;
    use crate::agent::Invoke;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("   "), None);
        assert_eq!(parse_input("QUIT"), Some(ChatInput::Quit));
        assert_eq!(parse_input("/clear"), Some(ChatInput::Clear));
        assert_eq!(parse_input("/History"), Some(ChatInput::History));
        assert_eq!(
            parse_input("/agent Finance Agent"),
            Some(ChatInput::Switch("Finance Agent"))
        );
        assert_eq!(parse_input("/agent"), Some(ChatInput::ListAgents));
        assert_eq!(parse_input("/bogus x"), Some(ChatInput::Unknown("bogus")));
        assert_eq!(
            parse_input(" price of NVDA? "),
            Some(ChatInput::Message("price of NVDA?"))
        );
    }

    #[test]
    fn test_resolve_agent() {
        let agents: Vec<Arc<dyn Invoke>> = vec![
            ScriptedAgent::new("Web Agent").into_arc(),
            ScriptedAgent::new("Finance Agent").into_arc(),
        ];
        let registry = AgentRegistry::from_agents("test", agents).unwrap();

        assert_eq!(resolve_agent(&registry, "Web Agent"), Some("Web Agent"));
        assert_eq!(resolve_agent(&registry, "finance agent"), Some("Finance Agent"));
        assert_eq!(resolve_agent(&registry, "finance"), Some("Finance Agent"));
        assert_eq!(resolve_agent(&registry, "YouTube"), None);
    }
}
