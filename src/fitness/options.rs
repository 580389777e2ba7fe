//! Inputs of the video search and video analysis surfaces.

use serde::{Deserialize, Serialize};

labeled_enum! {
    pub enum Difficulty {
        Beginner => "Beginner",
        Intermediate => "Intermediate",
        Advanced => "Advanced",
    }
}

labeled_enum! {
    pub enum VideoDuration {
        Short => "Short (<10 min)" | "short",
        Medium => "Medium (10-30 min)" | "medium",
        Long => "Long (>30 min)" | "long",
    }
}

labeled_enum! {
    pub enum Equipment {
        Bodyweight => "None/Bodyweight" | "none" | "bodyweight",
        Dumbbells => "Dumbbells",
        ResistanceBands => "Resistance Bands" | "resistance-bands" | "bands",
        Kettlebells => "Kettlebells",
        FullGym => "Full Gym" | "full-gym" | "gym",
    }
}

labeled_enum! {
    pub enum AnalysisOption {
        Summary => "Summary of key points" | "summary",
        Technique => "Exercise technique breakdown" | "technique",
        Nutrition => "Nutritional advice" | "nutrition",
        Methodology => "Training methodology" | "methodology",
        Equipment => "Equipment requirements" | "equipment",
        Progression => "Progression suggestions" | "progression",
    }
}

/// A request for instructional videos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSearchRequest {
    pub topic: String,
    pub difficulty: Difficulty,
    pub duration: VideoDuration,
    pub equipment: Vec<Equipment>,
}

impl VideoSearchRequest {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.trim().to_string(),
            difficulty: Difficulty::Intermediate,
            duration: VideoDuration::Medium,
            equipment: vec![Equipment::Bodyweight],
        }
    }

    pub fn equipment_text(&self) -> String {
        if self.equipment.is_empty() {
            return Equipment::Bodyweight.to_string();
        }
        self.equipment
            .iter()
            .map(|e| e.label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Query used for the retry prompt and the search-results fallback.
    pub fn search_term(&self) -> String {
        format!("{} {} fitness", self.topic, self.difficulty)
    }
}

/// A request to analyse one video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub url: String,
    pub options: Vec<AnalysisOption>,
    pub question: Option<String>,
}

impl AnalysisRequest {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.trim().to_string(),
            options: vec![AnalysisOption::Summary],
            question: None,
        }
    }

    pub fn with_options(mut self, options: Vec<AnalysisOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_question(mut self, question: &str) -> Self {
        let question = question.trim();
        self.question = (!question.is_empty()).then(|| question.to_string());
        self
    }

    /// Selected options, defaulting to the summary when none were chosen.
    pub fn effective_options(&self) -> Vec<AnalysisOption> {
        if self.options.is_empty() {
            vec![AnalysisOption::Summary]
        } else {
            self.options.clone()
        }
    }

    pub fn options_text(&self) -> String {
        self.effective_options()
            .iter()
            .map(|o| o.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_search_defaults() {
        let request = VideoSearchRequest::new("  core stability ");
        assert_eq!(request.topic, "core stability");
        assert_eq!(request.equipment_text(), "None/Bodyweight");
        assert_eq!(request.search_term(), "core stability Intermediate fitness");
    }

    #[test]
    fn test_analysis_defaults_to_summary() {
        let request = AnalysisRequest::new("https://youtu.be/abc").with_options(Vec::new());
        assert_eq!(request.options_text(), "Summary of key points");
        assert_eq!(AnalysisOption::ALL.len(), 6);
    }

    #[test]
    fn test_blank_question_is_none() {
        assert_eq!(AnalysisRequest::new("u").with_question("   ").question, None);
        assert_eq!(
            AnalysisRequest::new("u").with_question(" Squat depth? ").question.as_deref(),
            Some("Squat depth?")
        );
    }

    #[test]
    fn test_option_aliases() {
        assert_eq!("technique".parse::<AnalysisOption>(), Ok(AnalysisOption::Technique));
        assert_eq!("bands".parse::<Equipment>(), Ok(Equipment::ResistanceBands));
        assert_eq!("Long (>30 min)".parse::<VideoDuration>(), Ok(VideoDuration::Long));
    }
}
