//! YouTube metadata and captions via yt-dlp.

use crate::error::{AgentDeckError, Result};
use crate::extract::video_id_from_url;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

static CAPTION_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid caption tag regex"));

/// YouTube tool backed by the `yt-dlp` executable.
pub struct YoutubeClient {
    ytdlp: String,
    language: String,
    max_caption_chars: usize,
}

impl YoutubeClient {
    pub fn new(ytdlp: &str, language: &str, max_caption_chars: usize) -> Self {
        Self {
            ytdlp: ytdlp.to_string(),
            language: language.to_string(),
            max_caption_chars,
        }
    }

    fn canonical_url(url: &str) -> Result<(String, String)> {
        let video_id = video_id_from_url(url).ok_or_else(|| {
            AgentDeckError::InvalidInput(format!("Not a YouTube video URL: {}", url))
        })?;
        let canonical = format!("https://www.youtube.com/watch?v={}", video_id);
        Ok((video_id, canonical))
    }

    async fn run_ytdlp(&self, args: &[&str]) -> Result<std::process::Output> {
        let output = tokio::process::Command::new(&self.ytdlp)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AgentDeckError::ToolNotFound(self.ytdlp.clone())
                } else {
                    AgentDeckError::Tool(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AgentDeckError::Tool(format!("yt-dlp failed: {}", stderr.trim())));
        }
        Ok(output)
    }

    /// Title, channel, duration, upload date and description of a video.
    pub async fn video_data(&self, url: &str) -> Result<String> {
        let (video_id, canonical) = Self::canonical_url(url)?;
        debug!("Fetching video data for {}", video_id);

        let output = self
            .run_ytdlp(&["--dump-json", "--no-download", "--no-warnings", &canonical])
            .await?;

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).map_err(|e| {
            AgentDeckError::Tool(format!("Failed to parse yt-dlp output: {}", e))
        })?;

        let title = json["title"].as_str().unwrap_or("Unknown Title");
        let channel = json["channel"]
            .as_str()
            .or_else(|| json["uploader"].as_str())
            .unwrap_or("Unknown channel");
        let duration = json["duration"]
            .as_f64()
            .map(|d| format_timestamp(d as u64))
            .unwrap_or_else(|| "unknown".to_string());
        let upload_date = json["upload_date"]
            .as_str()
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y%m%d").ok())
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let description = json["description"].as_str().unwrap_or("");

        Ok(format!(
            "Title: {}\nURL: {}\nChannel: {}\nDuration: {}\nUploaded: {}\nDescription: {}",
            title, canonical, channel, duration, upload_date, description
        ))
    }

    /// Captions flattened to `[mm:ss] text` lines.
    pub async fn captions(&self, url: &str) -> Result<String> {
        let (video_id, canonical) = Self::canonical_url(url)?;
        let dir = tempfile::tempdir()?;
        let template = dir.path().join("%(id)s.%(ext)s");
        let template = template.to_string_lossy();
        let languages = format!("{}.*,{}", self.language, self.language);

        info!("Downloading captions for {}", video_id);

        self.run_ytdlp(&[
            "--skip-download",
            "--write-subs",
            "--write-auto-subs",
            "--sub-format",
            "vtt",
            "--sub-langs",
            &languages,
            "--no-warnings",
            "-o",
            &template,
            &canonical,
        ])
        .await?;

        let vtt_path = find_vtt(dir.path())?.ok_or_else(|| {
            AgentDeckError::Tool(format!("No captions available for video {}", video_id))
        })?;

        let raw = tokio::fs::read_to_string(&vtt_path).await?;
        let mut text = flatten_vtt(&raw);

        if text.chars().count() > self.max_caption_chars {
            text = text.chars().take(self.max_caption_chars).collect();
            text.push_str("\n[captions truncated]");
        }

        Ok(text)
    }
}

fn find_vtt(dir: &Path) -> Result<Option<std::path::PathBuf>> {
    let mut found: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "vtt"))
        .collect();
    found.sort();
    Ok(found.into_iter().next())
}

fn format_timestamp(total: u64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Parse `HH:MM:SS.mmm` or `MM:SS.mmm` into whole seconds.
fn parse_cue_time(s: &str) -> Option<u64> {
    let main = s.trim().split('.').next()?;
    let parts: Vec<u64> = main
        .split(':')
        .map(|p| p.parse().ok())
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [h, m, s] => Some(h * 3600 + m * 60 + s),
        [m, s] => Some(m * 60 + s),
        _ => None,
    }
}

/// Flatten a WebVTT document to timestamped lines.
///
/// Auto-generated captions repeat each line across rolling cues, so lines
/// already emitted are skipped.
pub fn flatten_vtt(vtt: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut last_text = String::new();
    let mut cue_start: Option<u64> = None;

    for line in vtt.lines() {
        let line = line.trim();

        if let Some((start, _)) = line.split_once("-->") {
            cue_start = parse_cue_time(start);
            continue;
        }

        if line.is_empty()
            || line == "WEBVTT"
            || line.starts_with("Kind:")
            || line.starts_with("Language:")
            || line.starts_with("NOTE")
            || line.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }

        let Some(start) = cue_start else {
            continue;
        };

        let text = CAPTION_TAG.replace_all(line, "").replace("&amp;", "&");
        let text = text.trim();
        if text.is_empty() || text == last_text {
            continue;
        }

        lines.push(format!("[{}] {}", format_timestamp(start), text));
        last_text = text.to_string();
    }

    lines.join("\n")
}
