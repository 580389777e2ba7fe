//! Extraction of video recommendations from free-form agent replies.
//!
//! Agents answer in prose or markdown. [`ResourceExtractor`] implementations
//! pull the video links out of that text; [`extract_videos`] enforces the
//! count bounds and substitutes search-results links when too few usable
//! links were found, so callers always get a renderable list.

mod video;

pub use video::{embed_url, has_video_links, video_id_from_url, RegexVideoExtractor};

use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A candidate instructional video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoResource {
    pub title: String,
    pub url: String,
    pub description: String,
}

impl VideoResource {
    pub fn new(title: impl Into<String>, url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: description.into(),
        }
    }

    /// Whether this entry is a search-results link rather than a specific video.
    pub fn is_search_link(&self) -> bool {
        self.url.contains("/results?search_query=")
    }
}

/// Parameters for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractRequest {
    /// The user's stated goal, used in placeholder text and fallback queries.
    pub goal: String,
    /// Pad with search links up to this many entries.
    pub min_count: usize,
    /// Keep at most this many entries.
    pub max_count: usize,
    /// Characters inspected before each link for a title or description.
    pub window_before: usize,
    /// Characters inspected after each link start.
    pub window_after: usize,
}

impl ExtractRequest {
    pub fn new(goal: &str) -> Self {
        let goal = goal.trim();
        Self {
            goal: if goal.is_empty() { "Fitness".to_string() } else { goal.to_string() },
            min_count: 2,
            max_count: 3,
            window_before: 100,
            window_after: 200,
        }
    }

    /// Set count bounds. `min_count` never exceeds `max_count`.
    pub fn with_counts(mut self, min_count: usize, max_count: usize) -> Self {
        self.max_count = max_count;
        self.min_count = min_count.min(max_count);
        self
    }

    pub fn with_window(mut self, before: usize, after: usize) -> Self {
        self.window_before = before;
        self.window_after = after;
        self
    }
}

/// Finds video resources in text.
///
/// Implementations report what they find in order of appearance; bounds and
/// padding are applied by [`extract_videos`].
pub trait ResourceExtractor: Send + Sync {
    fn extract(&self, text: &str, request: &ExtractRequest) -> Result<Vec<VideoResource>>;
}

/// Extract videos from `text`, never failing.
///
/// The result holds at most `max_count` entries and at least `min_count`;
/// missing entries are filled with search-results links. If the extractor
/// fails, a fixed list of generic search links is returned instead.
pub fn extract_videos(
    extractor: &dyn ResourceExtractor,
    text: &str,
    request: &ExtractRequest,
) -> Vec<VideoResource> {
    match extractor.extract(text, request) {
        Ok(mut videos) => {
            let found = videos.len();
            videos.truncate(request.max_count);

            let mut synthetic = 0;
            while videos.len() < request.min_count {
                videos.push(search_fallback(&request.goal, synthetic));
                synthetic += 1;
            }

            debug!(
                "Extracted {} video links, returning {} ({} synthetic)",
                found,
                videos.len(),
                synthetic
            );
            videos
        }
        Err(e) => {
            warn!("Video extraction failed, using general recommendations: {}", e);
            generic_fallback(&request.goal)
        }
    }
}

/// YouTube search-results URL for a free-text query.
pub fn search_url(query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
    format!("https://www.youtube.com/results?search_query={}", encoded)
}

/// The `index`-th padding entry for `goal`.
pub fn search_fallback(goal: &str, index: usize) -> VideoResource {
    match index % 3 {
        0 => VideoResource::new(
            format!("{} Training Guide", goal),
            search_url(&format!("{} training", goal)),
            format!("Search results for {} training programs", goal),
        ),
        1 => VideoResource::new(
            format!("{} Fundamentals", goal),
            search_url(&format!("{} workout", goal)),
            "Basic training principles and demonstrations",
        ),
        _ => VideoResource::new(
            "Form and Technique Guide",
            search_url(&format!("proper form {}", goal)),
            "Proper exercise form to prevent injury and maximize results",
        ),
    }
}

/// Fixed recommendations used when extraction itself fails.
pub fn generic_fallback(goal: &str) -> Vec<VideoResource> {
    vec![search_fallback(goal, 1), search_fallback(goal, 2)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentDeckError;

    struct FailingExtractor;

    impl ResourceExtractor for FailingExtractor {
        fn extract(&self, _text: &str, _request: &ExtractRequest) -> Result<Vec<VideoResource>> {
            Err(AgentDeckError::InvalidInput("boom".to_string()))
        }
    }

    struct FixedExtractor(usize);

    impl ResourceExtractor for FixedExtractor {
        fn extract(&self, _text: &str, _request: &ExtractRequest) -> Result<Vec<VideoResource>> {
            Ok((0..self.0)
                .map(|i| {
                    VideoResource::new(
                        format!("v{}", i),
                        format!("https://www.youtube.com/watch?v=id{:09}", i),
                        "d",
                    )
                })
                .collect())
        }
    }

    #[test]
    fn test_search_url_encodes_spaces_as_plus() {
        assert_eq!(
            search_url("Gain Muscle training"),
            "https://www.youtube.com/results?search_query=Gain+Muscle+training"
        );
        assert_eq!(
            search_url("core & abs"),
            "https://www.youtube.com/results?search_query=core+%26+abs"
        );
    }

    #[test]
    fn test_failing_extractor_yields_generic_list() {
        let request = ExtractRequest::new("Lose Weight");
        let videos = extract_videos(&FailingExtractor, "anything", &request);
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].title, "Lose Weight Fundamentals");
        assert_eq!(videos[1].title, "Form and Technique Guide");
        assert!(videos.iter().all(VideoResource::is_search_link));
    }

    #[test]
    fn test_count_bounds_hold_for_any_number_of_links() {
        let request = ExtractRequest::new("Endurance").with_counts(2, 3);
        for found in 0..8 {
            let videos = extract_videos(&FixedExtractor(found), "", &request);
            if found >= request.min_count {
                assert_eq!(videos.len(), found.min(request.max_count));
                assert!(videos.iter().all(|v| !v.is_search_link()));
            } else {
                assert_eq!(videos.len(), request.min_count);
                let synthetic = videos.iter().filter(|v| v.is_search_link()).count();
                assert_eq!(synthetic, request.min_count - found);
            }
        }
    }

    #[test]
    fn test_padding_entries_are_distinct() {
        let request = ExtractRequest::new("Stay Fit").with_counts(3, 5);
        let videos = extract_videos(&FixedExtractor(0), "", &request);
        assert_eq!(videos.len(), 3);
        assert_eq!(videos[0].title, "Stay Fit Training Guide");
        assert_eq!(videos[1].title, "Stay Fit Fundamentals");
        assert_eq!(videos[2].title, "Form and Technique Guide");
    }

    #[test]
    fn test_min_clamped_to_max() {
        let request = ExtractRequest::new("x").with_counts(4, 1);
        assert_eq!(request.min_count, 1);
        assert_eq!(extract_videos(&FixedExtractor(0), "", &request).len(), 1);
    }

    #[test]
    fn test_blank_goal_defaults() {
        assert_eq!(ExtractRequest::new("  ").goal, "Fitness");
    }
}
