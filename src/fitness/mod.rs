//! Health and fitness planner built on the agent layer.
//!
//! A [`FitnessSession`] drives five independent surfaces (plan generator,
//! expert chat, research, video resources, video analysis) against the
//! Smart Fitness Assistant and the YouTube Fitness Analyst.

/// Enum with a display label, optional short aliases and a case-insensitive
/// `FromStr` accepting either.
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $label:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let wanted = s.trim();
                $(
                    if wanted.eq_ignore_ascii_case($label) $(|| wanted.eq_ignore_ascii_case($alias))* {
                        return Ok($name::$variant);
                    }
                )+
                Err(format!(
                    "Unknown {} '{}'. Expected one of: {}",
                    stringify!($name),
                    s,
                    $name::ALL.iter().map(|v| v.label()).collect::<Vec<_>>().join(", ")
                ))
            }
        }
    };
}

mod options;
mod plan;
mod profile;
mod prompt;
mod session;

pub use options::{AnalysisOption, AnalysisRequest, Difficulty, Equipment, VideoDuration, VideoSearchRequest};
pub use plan::{
    DietaryPlan, FitnessPlan, QaPair, VideoAnalysis, FITNESS_TIPS, NUTRITION_CONSIDERATIONS,
    WHY_THIS_PLAN_WORKS,
};
pub use profile::{
    ActivityLevel, DietaryPreference, FastingPreferences, FastingStart, FitnessGoal,
    HealthCondition, Sex, UserProfile,
};
pub use prompt::PromptBuilder;
pub use session::{
    FitnessSession, PlanReport, VideoSearchOutcome, SMART_AGENT, VIDEO_AGENT,
};
