//! Agents command implementation.

use crate::agent::{fitness_descriptors, multi_agent_descriptors, AgentDescriptor};
use crate::cli::Output;
use crate::config::Settings;

/// List the agents of both front-ends.
pub fn run_agents(settings: &Settings) {
    Output::header("Chat agents");
    println!();
    for descriptor in multi_agent_descriptors() {
        print_descriptor(&descriptor);
    }

    Output::header(&format!("Fitness agents ({})", settings.model.default_model));
    println!();
    for descriptor in fitness_descriptors(
        &settings.model.default_model,
        &settings.fitness.fallback_video_model,
    ) {
        print_descriptor(&descriptor);
    }
    println!();
}

fn print_descriptor(descriptor: &AgentDescriptor) {
    Output::agent_info(
        &descriptor.name,
        &descriptor.model,
        &tools_text(descriptor),
        descriptor.description.as_deref().unwrap_or(&descriptor.role),
    );
}

fn tools_text(descriptor: &AgentDescriptor) -> String {
    if descriptor.tools.is_empty() {
        return "none".to_string();
    }
    descriptor
        .tools
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tools_text() {
        let descriptors = multi_agent_descriptors();
        assert_eq!(tools_text(&descriptors[0]), "web search");
        assert_eq!(tools_text(&descriptors[1]), "financial data");

        let bare = AgentDescriptor::new("Plain", "Talks", "llama3.2");
        assert_eq!(tools_text(&bare), "none");
    }
}
