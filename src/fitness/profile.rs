//! User profile and fasting preferences.

use crate::error::{AgentDeckError, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const AGE_RANGE: RangeInclusive<u32> = 10..=100;
pub const HEIGHT_RANGE_CM: RangeInclusive<f64> = 100.0..=250.0;
pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 20.0..=300.0;
pub const FASTING_HOURS_RANGE: RangeInclusive<u32> = 12..=20;

labeled_enum! {
    pub enum Sex {
        Male => "Male" | "m",
        Female => "Female" | "f",
        Other => "Other",
    }
}

labeled_enum! {
    pub enum ActivityLevel {
        Sedentary => "Sedentary",
        LightlyActive => "Lightly Active" | "lightly-active" | "light",
        ModeratelyActive => "Moderately Active" | "moderately-active" | "moderate",
        VeryActive => "Very Active" | "very-active",
        ExtremelyActive => "Extremely Active" | "extremely-active" | "extreme",
    }
}

labeled_enum! {
    pub enum DietaryPreference {
        NoRestrictions => "No Restrictions" | "none" | "no-restrictions",
        Vegetarian => "Vegetarian",
        Vegan => "Vegan",
        Keto => "Keto",
        GlutenFree => "Gluten Free" | "gluten-free",
        LowCarb => "Low Carb" | "low-carb",
        DairyFree => "Dairy Free" | "dairy-free",
    }
}

labeled_enum! {
    pub enum FitnessGoal {
        LoseWeight => "Lose Weight" | "lose-weight",
        GainMuscle => "Gain Muscle" | "gain-muscle",
        Endurance => "Endurance",
        StayFit => "Stay Fit" | "stay-fit",
        StrengthTraining => "Strength Training" | "strength-training" | "strength",
        AthleticPerformance => "Athletic Performance" | "athletic-performance",
        BodyRecomposition => "Body Recomposition" | "body-recomposition" | "recomp",
    }
}

labeled_enum! {
    pub enum HealthCondition {
        None => "None",
        Diabetes => "Diabetes",
        Hypertension => "Hypertension",
        HeartDisease => "Heart Disease" | "heart-disease",
        JointPain => "Joint Pain" | "joint-pain",
        BackPain => "Back Pain" | "back-pain",
        LimitedMobility => "Limited Mobility" | "limited-mobility",
        Other => "Other",
    }
}

labeled_enum! {
    pub enum FastingStart {
        Evening => "After dinner (evening)" | "evening",
        Afternoon => "After early dinner (afternoon)" | "afternoon",
        Morning => "After breakfast (morning)" | "morning",
    }
}

/// The person plans are generated for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub sex: Sex,
    pub activity_level: ActivityLevel,
    pub dietary_preference: DietaryPreference,
    pub fitness_goal: FitnessGoal,
    pub health_conditions: Vec<HealthCondition>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            age: 30,
            weight_kg: 70.0,
            height_cm: 170.0,
            sex: Sex::Male,
            activity_level: ActivityLevel::Sedentary,
            dietary_preference: DietaryPreference::NoRestrictions,
            fitness_goal: FitnessGoal::LoseWeight,
            health_conditions: vec![HealthCondition::None],
        }
    }
}

impl UserProfile {
    /// Check numeric fields against their allowed ranges.
    pub fn validate(&self) -> Result<()> {
        if !AGE_RANGE.contains(&self.age) {
            return Err(out_of_range("Age", self.age, &AGE_RANGE));
        }
        if !HEIGHT_RANGE_CM.contains(&self.height_cm) {
            return Err(out_of_range("Height (cm)", self.height_cm, &HEIGHT_RANGE_CM));
        }
        if !WEIGHT_RANGE_KG.contains(&self.weight_kg) {
            return Err(out_of_range("Weight (kg)", self.weight_kg, &WEIGHT_RANGE_KG));
        }
        Ok(())
    }

    /// Health conditions as a comma-separated list; `None` when empty.
    pub fn health_conditions_text(&self) -> String {
        if self.health_conditions.is_empty() {
            return HealthCondition::None.to_string();
        }
        self.health_conditions
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Intermittent fasting preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastingPreferences {
    pub enabled: bool,
    pub hours: u32,
    pub start: FastingStart,
}

impl Default for FastingPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            hours: 16,
            start: FastingStart::Evening,
        }
    }
}

impl FastingPreferences {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// The fasting window is only checked when fasting is enabled.
    pub fn validate(&self) -> Result<()> {
        if self.enabled && !FASTING_HOURS_RANGE.contains(&self.hours) {
            return Err(out_of_range("Fasting window (hours)", self.hours, &FASTING_HOURS_RANGE));
        }
        Ok(())
    }

    /// Schedule line shown with the dietary plan.
    pub fn schedule_text(&self) -> String {
        if self.enabled {
            format!("{}-hour fasting window starting {}", self.hours, self.start)
        } else {
            "No intermittent fasting included".to_string()
        }
    }

    /// Instruction given to the agent when generating the dietary plan.
    pub fn instruction(&self) -> String {
        if self.enabled {
            format!(
                "Incorporate intermittent fasting with a {}-hour fasting window starting {}.",
                self.hours, self.start
            )
        } else {
            "Do not include intermittent fasting in the plan.".to_string()
        }
    }
}

fn out_of_range<T: std::fmt::Display>(field: &str, value: T, range: &RangeInclusive<T>) -> AgentDeckError {
    AgentDeckError::InvalidInput(format!(
        "{} must be between {} and {} (got {})",
        field,
        range.start(),
        range.end(),
        value
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_valid() {
        assert!(UserProfile::default().validate().is_ok());
        assert!(FastingPreferences::default().validate().is_ok());
    }

    #[test]
    fn test_profile_range_bounds() {
        let ok = |p: UserProfile| p.validate().is_ok();
        let base = UserProfile::default;

        assert!(ok(UserProfile { age: 10, ..base() }));
        assert!(ok(UserProfile { age: 100, ..base() }));
        assert!(!ok(UserProfile { age: 9, ..base() }));
        assert!(!ok(UserProfile { age: 101, ..base() }));

        assert!(ok(UserProfile { height_cm: 250.0, ..base() }));
        assert!(!ok(UserProfile { height_cm: 99.9, ..base() }));

        assert!(ok(UserProfile { weight_kg: 20.0, ..base() }));
        assert!(!ok(UserProfile { weight_kg: 300.1, ..base() }));
    }

    #[test]
    fn test_invalid_profile_message_names_field() {
        let err = UserProfile { age: 7, ..UserProfile::default() }
            .validate()
            .unwrap_err();
        assert!(matches!(err, AgentDeckError::InvalidInput(ref m) if m.contains("Age")));
    }

    #[test]
    fn test_fasting_window_checked_only_when_enabled() {
        let too_long = FastingPreferences { hours: 24, ..FastingPreferences::default() };
        assert!(too_long.validate().is_err());

        let off = FastingPreferences { hours: 0, ..FastingPreferences::disabled() };
        assert!(off.validate().is_ok());
    }

    #[test]
    fn test_fasting_schedule_text() {
        let prefs = FastingPreferences {
            enabled: true,
            hours: 14,
            start: FastingStart::Morning,
        };
        assert_eq!(
            prefs.schedule_text(),
            "14-hour fasting window starting After breakfast (morning)"
        );
        assert_eq!(
            FastingPreferences::disabled().schedule_text(),
            "No intermittent fasting included"
        );
    }

    #[test]
    fn test_labels_parse_case_insensitively() {
        assert_eq!("lightly active".parse::<ActivityLevel>(), Ok(ActivityLevel::LightlyActive));
        assert_eq!("gain-muscle".parse::<FitnessGoal>(), Ok(FitnessGoal::GainMuscle));
        assert_eq!("EVENING".parse::<FastingStart>(), Ok(FastingStart::Evening));
        assert!("couch".parse::<ActivityLevel>().is_err());
    }

    #[test]
    fn test_health_conditions_text() {
        let profile = UserProfile {
            health_conditions: vec![HealthCondition::JointPain, HealthCondition::Diabetes],
            ..UserProfile::default()
        };
        assert_eq!(profile.health_conditions_text(), "Joint Pain, Diabetes");

        let none = UserProfile {
            health_conditions: Vec::new(),
            ..UserProfile::default()
        };
        assert_eq!(none.health_conditions_text(), "None");
    }
}
