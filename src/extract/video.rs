//! Regex-based video link extraction.

use super::{ExtractRequest, ResourceExtractor, VideoResource};
use crate::error::Result;
use regex::Regex;
use std::sync::LazyLock;

const LINK_PATTERN: &str = r"https?://(?:www\.)?youtube\.com/watch\?v=[A-Za-z0-9_-]+";

static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(LINK_PATTERN).expect("valid link regex"));

static VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?:
            (?:https?://)?
            (?:www\.|m\.)?
            (?:
                youtube\.com/watch\?(?:[^\s\#]*&)?v=
                | youtu\.be/
                | youtube\.com/embed/
                | youtube\.com/v/
                | youtube\.com/shorts/
            )
            ([A-Za-z0-9_-]{11})
        )
        |
        ^([A-Za-z0-9_-]{11})$
        ",
    )
    .expect("valid video id regex")
});

// A `Title:` label (optionally bold) comes first so `**Title:**` is read as a
// label, then bold text, then a markdown link label.
static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \*{0,2}(?i:title)\*{0,2}:\*{0,2}[\ \t]*([^\r\n]+?)(?:[\ \t]+https?://|[\ \t]*(?:\r|\n|$))
        | \*\*([^*\r\n]+?)\*\*
        | \[([^\]\r\n]+)\]\(
        ",
    )
    .expect("valid title regex")
});

static DESCRIPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)description:\**[ \t]*([^\r\n]+)").expect("valid description regex"));

/// Whether `text` contains at least one full `watch?v=` link.
pub fn has_video_links(text: &str) -> bool {
    LINK.is_match(text)
}

/// Extract the 11-character video id from a YouTube URL or bare id.
pub fn video_id_from_url(input: &str) -> Option<String> {
    let caps = VIDEO_ID.captures(input.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Embeddable player URL for a video id.
pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{}", video_id)
}

/// Extracts `watch?v=` links with a title and description found near each one.
///
/// Titles come from `**bold**` text, a markdown link label or a `Title:`
/// label; descriptions from a `Description:` label (any case). Repeated links
/// yield repeated entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexVideoExtractor;

impl RegexVideoExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn titles_in(segment: &str) -> Vec<String> {
    TITLE
        .captures_iter(segment)
        .filter_map(|caps| {
            // Bold field labels such as `**URL:**` are not titles.
            if caps.get(2).is_some_and(|m| m.as_str().trim_end().ends_with(':')) {
                return None;
            }
            caps.iter()
                .skip(1)
                .flatten()
                .map(|m| clean_label(m.as_str()))
                .find(|t| !t.is_empty() && !t.starts_with("http"))
        })
        .collect()
}

fn descriptions_in(segment: &str) -> Vec<String> {
    DESCRIPTION
        .captures_iter(segment)
        .map(|caps| clean_label(&caps[1]))
        .filter(|d| !d.is_empty())
        .collect()
}

impl ResourceExtractor for RegexVideoExtractor {
    fn extract(&self, text: &str, request: &ExtractRequest) -> Result<Vec<VideoResource>> {
        let links: Vec<_> = LINK.find_iter(text).collect();
        let goal = request.goal.to_lowercase();
        let mut videos = Vec::with_capacity(links.len());

        for (index, link) in links.iter().enumerate() {
            // The window never reaches into a neighbouring link.
            let floor = if index > 0 { links[index - 1].end() } else { 0 };
            let ceiling = links.get(index + 1).map(|m| m.start()).unwrap_or(text.len());

            let start = chars_back(text, link.start(), request.window_before).max(floor);
            let end = chars_forward(text, link.start(), request.window_after)
                .min(ceiling)
                .max(link.end());

            let before = &text[start..link.start()];
            let after = &text[link.end()..end];

            // Titles on the link's own line win over those on nearby lines.
            let (lines_before, line_before) = before.rsplit_once('\n').unwrap_or(("", before));
            let (line_after, lines_after) = after.split_once('\n').unwrap_or((after, ""));

            let title = titles_in(line_before)
                .pop()
                .or_else(|| titles_in(line_after).into_iter().next())
                .or_else(|| titles_in(lines_before).pop())
                .or_else(|| titles_in(lines_after).into_iter().next())
                .unwrap_or_else(|| format!("Fitness Video {}", index + 1));

            let description = descriptions_in(after)
                .into_iter()
                .next()
                .or_else(|| descriptions_in(before).pop())
                .unwrap_or_else(|| format!("Instructional video for your {} program", goal));

            videos.push(VideoResource {
                title,
                url: link.as_str().to_string(),
                description,
            });
        }

        Ok(videos)
    }
}

/// Byte offset `n` characters before `pos` (or 0).
fn chars_back(text: &str, pos: usize, n: usize) -> usize {
    if n == 0 {
        return pos;
    }
    text[..pos]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(pos)
}

/// Byte offset `n` characters after `pos` (or the end of `text`).
fn chars_forward(text: &str, pos: usize, n: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

fn clean_label(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| c == '*' || c == '_' || c == '"' || c == ':')
        .trim()
        .to_string()
}
