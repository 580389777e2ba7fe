//! CLI module for agentdeck.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::fitness::{
    ActivityLevel, DietaryPreference, FastingPreferences, FastingStart, FitnessGoal,
    HealthCondition, Sex, UserProfile,
};
use clap::{Args, Parser, Subcommand};

/// agentdeck - chat with local LLM agents
///
/// Talk to tool-using agents (web search, finance, YouTube) served by a local
/// Ollama runtime, or plan your training and nutrition with the fitness planner.
#[derive(Parser, Debug)]
#[command(name = "agentdeck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat with the Web, Finance or YouTube agent
    Chat {
        /// Agent to start with (e.g. "Finance Agent")
        #[arg(short, long)]
        agent: Option<String>,

        /// Session id for stored history (a new one is generated if omitted)
        #[arg(short, long)]
        session: Option<String>,
    },

    /// List the available agents
    Agents,

    /// Start the interactive health and fitness planner
    Fitness {
        /// Ollama model to use (defaults to model.default_model)
        #[arg(short, long)]
        model: Option<String>,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Extract YouTube video links from text (a file, or stdin)
    Extract {
        /// Input file; reads stdin when omitted
        file: Option<String>,

        /// Fitness goal used for placeholders and fallback links
        #[arg(short, long, default_value = "Fitness")]
        goal: String,

        /// Pad with search links up to this many entries
        #[arg(long, default_value = "2")]
        min: usize,

        /// Keep at most this many entries
        #[arg(long, default_value = "3")]
        max: usize,
    },

    /// Start HTTP API server for the multi-agent chat
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Check the model runtime, models and external tools
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Profile and fasting preferences for the fitness planner.
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Age in years (10-100)
    #[arg(long, default_value = "30")]
    pub age: u32,

    /// Weight in kg (20-300)
    #[arg(long, default_value = "70")]
    pub weight: f64,

    /// Height in cm (100-250)
    #[arg(long, default_value = "170")]
    pub height: f64,

    /// Male, Female or Other
    #[arg(long, default_value = "Male")]
    pub sex: Sex,

    /// Sedentary, "Lightly Active", "Moderately Active", "Very Active", "Extremely Active"
    #[arg(long, default_value = "Sedentary")]
    pub activity: ActivityLevel,

    /// "No Restrictions", Vegetarian, Vegan, Keto, "Gluten Free", "Low Carb", "Dairy Free"
    #[arg(long, default_value = "No Restrictions")]
    pub diet: DietaryPreference,

    /// "Lose Weight", "Gain Muscle", Endurance, "Stay Fit", "Strength Training", ...
    #[arg(long, default_value = "Lose Weight")]
    pub goal: FitnessGoal,

    /// Health considerations, comma separated (e.g. "Joint Pain,Diabetes")
    #[arg(long, value_delimiter = ',', default_value = "None")]
    pub health: Vec<HealthCondition>,

    /// Leave intermittent fasting out of the dietary plan
    #[arg(long)]
    pub no_fasting: bool,

    /// Fasting window in hours (12-20)
    #[arg(long, default_value = "16")]
    pub fasting_hours: u32,

    /// evening, afternoon or morning
    #[arg(long, default_value = "evening")]
    pub fasting_start: FastingStart,
}

impl ProfileArgs {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            age: self.age,
            weight_kg: self.weight,
            height_cm: self.height,
            sex: self.sex,
            activity_level: self.activity,
            dietary_preference: self.diet,
            fitness_goal: self.goal,
            health_conditions: self.health.clone(),
        }
    }

    pub fn fasting(&self) -> FastingPreferences {
        FastingPreferences {
            enabled: !self.no_fasting,
            hours: self.fasting_hours,
            start: self.fasting_start,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fitness_flags_parse() {
        let cli = Cli::try_parse_from([
            "agentdeck",
            "fitness",
            "--model",
            "qwen2.5:7b",
            "--age",
            "41",
            "--goal",
            "gain-muscle",
            "--health",
            "Joint Pain,diabetes",
            "--fasting-start",
            "morning",
        ])
        .unwrap();

        let Commands::Fitness { model, profile } = cli.command else {
            panic!("expected fitness command");
        };
        assert_eq!(model.as_deref(), Some("qwen2.5:7b"));

        let user = profile.profile();
        assert_eq!(user.age, 41);
        assert_eq!(user.fitness_goal, FitnessGoal::GainMuscle);
        assert_eq!(
            user.health_conditions,
            vec![HealthCondition::JointPain, HealthCondition::Diabetes]
        );
        assert!(user.validate().is_ok());

        let fasting = profile.fasting();
        assert!(fasting.enabled);
        assert_eq!(fasting.start, FastingStart::Morning);
    }

    #[test]
    fn test_unknown_goal_rejected() {
        let result = Cli::try_parse_from(["agentdeck", "fitness", "--goal", "fly"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_chat_flags() {
        let cli = Cli::try_parse_from(["agentdeck", "-vv", "chat", "--agent", "Web Agent"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Chat { agent: Some(ref a), session: None } if a == "Web Agent"
        ));
    }
}
