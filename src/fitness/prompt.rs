//! Prompt construction for the fitness surfaces.

use super::options::{AnalysisRequest, VideoSearchRequest};
use super::plan::{DietaryPlan, FitnessPlan};
use super::profile::{FastingPreferences, UserProfile};
use crate::config::Prompts;
use std::collections::HashMap;

/// Renders the fitness prompt templates.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    prompts: Prompts,
}

fn vars<const N: usize>(pairs: [(&str, String); N]) -> HashMap<String, String> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

impl PromptBuilder {
    pub fn new(prompts: Prompts) -> Self {
        Self { prompts }
    }

    /// The profile block embedded in the plan prompts.
    pub fn profile(&self, profile: &UserProfile, fasting: &FastingPreferences) -> String {
        let (enabled, hours, start) = if fasting.enabled {
            ("Yes".to_string(), fasting.hours.to_string(), fasting.start.to_string())
        } else {
            ("No".to_string(), "N/A".to_string(), "N/A".to_string())
        };

        self.prompts.render_with_custom(
            &self.prompts.fitness.profile,
            &vars([
                ("age", profile.age.to_string()),
                ("weight", format!("{:.1}", profile.weight_kg)),
                ("height", format!("{:.1}", profile.height_cm)),
                ("sex", profile.sex.to_string()),
                ("activity_level", profile.activity_level.to_string()),
                ("dietary_preferences", profile.dietary_preference.to_string()),
                ("fitness_goals", profile.fitness_goal.to_string()),
                ("health_conditions", profile.health_conditions_text()),
                ("fasting_enabled", enabled),
                ("fasting_hours", hours),
                ("fasting_start", start),
            ]),
        )
    }

    pub fn dietary_plan(&self, profile: &UserProfile, fasting: &FastingPreferences) -> String {
        self.prompts.render_with_custom(
            &self.prompts.fitness.dietary_plan,
            &vars([
                ("profile", self.profile(profile, fasting)),
                ("fasting_instruction", fasting.instruction()),
            ]),
        )
    }

    pub fn fitness_plan(&self, profile: &UserProfile, fasting: &FastingPreferences) -> String {
        self.prompts.render_with_custom(
            &self.prompts.fitness.fitness_plan,
            &vars([("profile", self.profile(profile, fasting))]),
        )
    }

    /// First video query for the plan: goal, age and sex.
    pub fn plan_videos(&self, profile: &UserProfile) -> String {
        let search_term = format!(
            "best {} workout for {} year old {}",
            profile.fitness_goal.label().to_lowercase(),
            profile.age,
            profile.sex.label().to_lowercase()
        );
        self.prompts.render_with_custom(
            &self.prompts.fitness.plan_videos,
            &vars([("search_term", search_term)]),
        )
    }

    /// Broader query used when the first one returned no YouTube links.
    pub fn plan_videos_backup(&self, profile: &UserProfile) -> String {
        let search_term = format!(
            "fitness training {} tutorial",
            profile.fitness_goal.label().to_lowercase()
        );
        self.prompts.render_with_custom(
            &self.prompts.fitness.plan_videos_backup,
            &vars([("search_term", search_term)]),
        )
    }

    pub fn plan_question(&self, dietary: &DietaryPlan, fitness: &FitnessPlan, question: &str) -> String {
        self.prompts.render_with_custom(
            &self.prompts.fitness.plan_question,
            &vars([
                ("meal_plan", dietary.meal_plan.clone()),
                ("routine", fitness.routine.clone()),
                ("question", question.to_string()),
            ]),
        )
    }

    pub fn research(&self, topic: &str) -> String {
        self.prompts.render_with_custom(
            &self.prompts.fitness.research,
            &vars([("topic", topic.to_string())]),
        )
    }

    pub fn video_search(&self, request: &VideoSearchRequest) -> String {
        self.prompts.render_with_custom(
            &self.prompts.fitness.video_search,
            &vars([
                ("topic", request.topic.clone()),
                ("difficulty", request.difficulty.to_string()),
                ("duration", request.duration.to_string()),
                ("equipment", request.equipment_text()),
            ]),
        )
    }

    pub fn video_search_retry(&self, request: &VideoSearchRequest) -> String {
        self.prompts.render_with_custom(
            &self.prompts.fitness.video_search_retry,
            &vars([
                ("topic", request.topic.clone()),
                ("difficulty", request.difficulty.to_string()),
            ]),
        )
    }

    pub fn video_analysis(&self, request: &AnalysisRequest) -> String {
        let question_instruction = request
            .question
            .as_ref()
            .map(|q| format!("Also answer this specific question: {}", q))
            .unwrap_or_default();

        self.prompts.render_with_custom(
            &self.prompts.fitness.video_analysis,
            &vars([
                ("url", request.url.clone()),
                ("options", request.options_text()),
                ("question_instruction", question_instruction),
            ]),
        )
    }
}
