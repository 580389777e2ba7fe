//! Prompt templates for agentdeck.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub fitness: FitnessPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts used by the fitness planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessPrompts {
    pub profile: String,
    pub dietary_plan: String,
    pub fitness_plan: String,
    pub plan_videos: String,
    pub plan_videos_backup: String,
    pub plan_question: String,
    pub research: String,
    pub video_search: String,
    pub video_search_retry: String,
    pub video_analysis: String,
}

impl Default for FitnessPrompts {
    fn default() -> Self {
        Self {
            profile: r#"Age: {{age}}
Weight: {{weight}}kg
Height: {{height}}cm
Sex: {{sex}}
Activity Level: {{activity_level}}
Dietary Preferences: {{dietary_preferences}}
Fitness Goals: {{fitness_goals}}
Health Considerations: {{health_conditions}}
Intermittent Fasting: {{fasting_enabled}}
Fasting Hours: {{fasting_hours}}
Fasting Start: {{fasting_start}}"#
                .to_string(),

            dietary_plan: r#"Create a comprehensive personalized dietary plan based on this user profile:

{{profile}}

Return a detailed meal plan that includes specific foods, portions, and timing.
Include breakfast, lunch, dinner, and snacks.
{{fasting_instruction}}
Explain why this plan works well for the user's specific goals and profile."#
                .to_string(),

            fitness_plan: r#"Create a comprehensive personalized fitness plan based on this user profile:

{{profile}}

Include:
1. A weekly exercise schedule with specific workouts
2. Detailed descriptions of key exercises
3. Progression plan for 4-8 weeks
4. Rest and recovery recommendations

Suggest YouTube videos that would be helpful for demonstrating proper form or specific routines.
Use the YouTube tool to find 2-3 relevant videos related to the user's specific fitness goals."#
                .to_string(),

            plan_videos: "Use the YouTube tool to find 3 high-quality instructional videos about: {{search_term}}. Return just the video data in a clear format with titles, URLs and brief descriptions."
                .to_string(),

            plan_videos_backup: "Use the YouTube tool to search for '{{search_term}}' and return 3 video recommendations with their URLs and descriptions."
                .to_string(),

            plan_question: r#"Dietary Plan: {{meal_plan}}

Fitness Plan: {{routine}}
User Question: {{question}}"#
                .to_string(),

            research: "Research the following fitness or nutrition topic and provide a detailed, evidence-based response with citations: {{topic}}"
                .to_string(),

            video_search: r#"Use the YouTube tool to search for videos about {{topic}} fitness that are:
- Difficulty: {{difficulty}}
- Duration: {{duration}}
- Equipment required: {{equipment}}

Please find and list 3-5 specific videos with the following information:
1. Exact video title with YouTube URL
2. Brief description of content (1-2 sentences)
3. Why this video is beneficial for the user

Ensure you include the full YouTube URL for each video (format: https://www.youtube.com/watch?v=xyz).
Use the YouTube tools to get accurate video information."#
                .to_string(),

            video_search_retry: "Use the YouTube tool to search for '{{topic}} {{difficulty}} fitness' and return 3 specific videos with their exact YouTube URLs and brief descriptions."
                .to_string(),

            video_analysis: r#"Analyze this YouTube video: {{url}}

Focus on these aspects:
{{options}}

{{question_instruction}}

First, get the video data and captions using the YouTube tools.
Then provide a structured analysis with timestamps when possible.
Include practical takeaways that someone could apply to their own fitness routine."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let fitness_path = custom_path.join("fitness.toml");
            if fitness_path.exists() {
                let content = std::fs::read_to_string(&fitness_path)?;
                prompts.fitness = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.fitness.dietary_plan.contains("{{profile}}"));
        assert!(prompts.fitness.video_search.contains("watch?v=xyz"));
        assert!(prompts.fitness.video_analysis.contains("{{url}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut custom = HashMap::new();
        custom.insert("coach".to_string(), "Sam".to_string());
        custom.insert("topic".to_string(), "rowing".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), "squats".to_string());
        let rendered = prompts.render_with_custom("{{coach}} explains {{topic}}", &vars);
        assert_eq!(rendered, "Sam explains squats");
    }

    #[test]
    fn test_custom_dir_overrides_fitness_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("fitness.toml"),
            "research = \"Look into {{topic}} briefly.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.fitness.research, "Look into {{topic}} briefly.");
        // Unspecified fields keep their defaults.
        assert!(prompts.fitness.dietary_plan.contains("dietary plan"));
    }
}
