//! Generated plans and session records.

use super::options::AnalysisOption;
use super::profile::{ActivityLevel, FastingPreferences, FitnessGoal};
use crate::extract::VideoResource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const WHY_THIS_PLAN_WORKS: &str =
    "Personalized nutrition tailored to your goals, preferences, and lifestyle";

pub const NUTRITION_CONSIDERATIONS: &[&str] = &[
    "Hydration: Drink plenty of water throughout the day, especially during fasting periods",
    "Electrolytes: Monitor sodium, potassium, and magnesium levels",
    "Fiber: Ensure adequate intake through vegetables and fruits",
    "Listen to your body: Adjust portion sizes and fasting schedule as needed",
    "Consistency: Follow the plan regularly to see results",
];

pub const FITNESS_TIPS: &[&str] = &[
    "Track your progress regularly with measurements and photos",
    "Allow proper rest between workouts to optimize recovery",
    "Focus on proper form rather than lifting heavier weights",
    "Stay consistent with your routine - consistency beats perfection",
    "Adapt your workout intensity based on how you feel",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietaryPlan {
    pub why_this_plan_works: String,
    pub meal_plan: String,
    pub fasting_schedule: String,
    pub important_considerations: Vec<String>,
}

impl DietaryPlan {
    pub fn new(meal_plan: String, fasting: &FastingPreferences) -> Self {
        Self {
            why_this_plan_works: WHY_THIS_PLAN_WORKS.to_string(),
            meal_plan,
            fasting_schedule: fasting.schedule_text(),
            important_considerations: NUTRITION_CONSIDERATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessPlan {
    pub goals: String,
    pub routine: String,
    pub video_resources: Vec<VideoResource>,
    pub tips: Vec<String>,
}

impl FitnessPlan {
    pub fn new(
        goal: FitnessGoal,
        activity: ActivityLevel,
        routine: String,
        video_resources: Vec<VideoResource>,
    ) -> Self {
        Self {
            goals: format!("Achieve {} while considering your {} lifestyle", goal, activity),
            routine,
            video_resources,
            tips: FITNESS_TIPS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A question about the current plans and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// A completed video analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub url: String,
    pub video_id: Option<String>,
    pub options: Vec<AnalysisOption>,
    pub question: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl VideoAnalysis {
    pub fn options_text(&self) -> String {
        self.options
            .iter()
            .map(|o| o.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::FastingStart;

    #[test]
    fn test_dietary_plan_fixed_sections() {
        let fasting = FastingPreferences {
            enabled: true,
            hours: 16,
            start: FastingStart::Evening,
        };
        let plan = DietaryPlan::new("Oats for breakfast".to_string(), &fasting);
        assert_eq!(plan.why_this_plan_works, WHY_THIS_PLAN_WORKS);
        assert_eq!(
            plan.fasting_schedule,
            "16-hour fasting window starting After dinner (evening)"
        );
        assert_eq!(plan.important_considerations.len(), 5);
        assert!(plan.important_considerations[0].starts_with("Hydration"));
    }

    #[test]
    fn test_fitness_plan_goal_line() {
        let plan = FitnessPlan::new(
            FitnessGoal::GainMuscle,
            ActivityLevel::ModeratelyActive,
            "Push/pull/legs".to_string(),
            Vec::new(),
        );
        assert_eq!(
            plan.goals,
            "Achieve Gain Muscle while considering your Moderately Active lifestyle"
        );
        assert_eq!(plan.tips.len(), 5);
    }
}
