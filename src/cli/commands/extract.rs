//! Extract command - pull video links out of saved agent replies.

use crate::cli::Output;
use crate::extract::{extract_videos, ExtractRequest, RegexVideoExtractor};
use crate::present::render_video_cards;
use anyhow::{Context, Result};
use std::io::Read;

/// Run the extract command on `file`, or stdin when `None`.
pub fn run_extract(file: Option<&str>, goal: &str, min: usize, max: usize) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let extractor = RegexVideoExtractor::new();
    let request = ExtractRequest::new(goal).with_counts(min, max);
    let videos = extract_videos(&extractor, &text, &request);

    if videos.is_empty() {
        Output::info("No video links found.");
        return Ok(());
    }

    let synthetic = videos.iter().filter(|v| v.is_search_link()).count();
    Output::header(&format!("Videos ({})", videos.len()));
    println!();
    Output::markdown(&render_video_cards(&videos));
    if synthetic > 0 {
        Output::warning(&format!(
            "{} of {} entries are search links, not specific videos.",
            synthetic,
            videos.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_extract_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "1. **Squat basics**: https://www.youtube.com/watch?v=IODxDxX7oi4 great for beginners"
        )
        .unwrap();

        let path = file.path().to_string_lossy().to_string();
        assert!(run_extract(Some(&path), "Strength", 2, 3).is_ok());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = run_extract(Some("/nonexistent/agentdeck/reply.md"), "Fitness", 2, 3).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
