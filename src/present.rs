//! Markdown rendering of plans, videos, analyses and transcripts.
//!
//! Everything here is pure: inputs in, text out.

use crate::conversation::{Message, Role};
use crate::extract::{embed_url, VideoResource};
use crate::fitness::{DietaryPlan, FitnessPlan, QaPair, VideoAnalysis, VideoSearchOutcome};

/// Descriptions in card view are cut to this many characters.
pub const CARD_DESCRIPTION_LIMIT: usize = 150;

/// File name of the downloadable analysis summary.
pub const SUMMARY_FILE_NAME: &str = "video_analysis_summary.md";
pub const SUMMARY_MIME_TYPE: &str = "text/markdown";

/// Cut `text` to `max` characters, appending `...` when anything was removed.
pub fn truncate_description(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn render_dietary_plan(plan: &DietaryPlan) -> String {
    let mut out = String::from("## Your Personalized Dietary Plan\n\n");
    out.push_str(&format!("### Why this plan works\n\n{}\n\n", plan.why_this_plan_works));
    out.push_str(&format!("### Meal Plan\n\n{}\n\n", plan.meal_plan.trim()));
    out.push_str(&format!(
        "### Intermittent Fasting Schedule\n\n{}\n\n",
        plan.fasting_schedule
    ));
    out.push_str("### Important Considerations\n\n");
    for item in &plan.important_considerations {
        out.push_str(&format!("- {}\n", item));
    }
    out
}

pub fn render_fitness_plan(plan: &FitnessPlan) -> String {
    let mut out = String::from("## Your Personalized Fitness Plan\n\n");
    out.push_str(&format!("### Goals\n\n{}\n\n", plan.goals));
    out.push_str(&format!("### Exercise Routine\n\n{}\n\n", plan.routine.trim()));
    out.push_str("### Pro Tips\n\n");
    for tip in &plan.tips {
        out.push_str(&format!("- {}\n", tip));
    }
    if !plan.video_resources.is_empty() {
        out.push_str("\n### Recommended Videos\n\n");
        out.push_str(&render_video_cards(&plan.video_resources));
    }
    out
}

/// Numbered cards with truncated descriptions.
pub fn render_video_cards(videos: &[VideoResource]) -> String {
    videos
        .iter()
        .enumerate()
        .map(|(i, video)| {
            format!(
                "{}. **{}**\n   {}\n   {}\n",
                i + 1,
                video.title,
                video.url,
                truncate_description(&video.description, CARD_DESCRIPTION_LIMIT)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_qa_history(pairs: &[QaPair]) -> String {
    pairs
        .iter()
        .map(|pair| format!("**Q:** {}\n\n**A:** {}\n", pair.question, pair.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_search_outcome(outcome: &VideoSearchOutcome) -> String {
    match outcome {
        VideoSearchOutcome::Videos(videos) => {
            format!("### Found Videos\n\n{}", render_video_cards(videos))
        }
        VideoSearchOutcome::RawReply(text) => text.clone(),
        VideoSearchOutcome::SearchLink { link, .. } => format!(
            "### Could not retrieve specific videos\n\nPlease use this link to view search results on YouTube:\n[{}]({})\n",
            link.title, link.url
        ),
    }
}

pub fn render_analysis(analysis: &VideoAnalysis) -> String {
    let mut out = String::from("## Analysis Results\n\n");
    out.push_str(&format!("**Video:** {}\n", analysis.url));
    if let Some(id) = &analysis.video_id {
        out.push_str(&format!("**Player:** {}\n", embed_url(id)));
    }
    out.push_str(&format!("**Analysis Focus:** {}\n", analysis.options_text()));
    if let Some(question) = &analysis.question {
        out.push_str(&format!("**Question:** {}\n", question));
    }
    out.push_str(&format!("\n{}\n", analysis.content.trim()));
    out
}

/// One line per stored analysis: `Analysis N: <url>`.
pub fn render_analysis_list(analyses: &[VideoAnalysis]) -> String {
    analyses
        .iter()
        .enumerate()
        .map(|(i, a)| format!("Analysis {}: {}", i + 1, truncate_description(&a.url, 50)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Contents of the downloadable `video_analysis_summary.md`.
pub fn analysis_summary_document(analysis: &VideoAnalysis) -> String {
    format!(
        "# Video Analysis Summary\n\n**Video URL:** {}\n\n**Analysis Focus:** {}\n\n{}\n\n*Analysis generated by AI Health & Fitness Planner*\n",
        analysis.url,
        analysis.options_text(),
        analysis.content.trim()
    )
}

/// A transcript with the assistant labelled by agent name.
pub fn render_transcript(messages: &[Message], agent: &str) -> String {
    messages
        .iter()
        .map(|m| match m.role {
            Role::User => format!("**You:** {}\n", m.content),
            Role::Assistant => format!("**{}:** {}\n", agent, m.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
