//! Doctor command - verify the model runtime, agent models, tools and storage.

use crate::agent::{fitness_descriptors, model_is_listed, multi_agent_descriptors};
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use console::style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Pass,
    Warn,
    Fail,
}

/// One line of the doctor report.
#[derive(Debug)]
struct Finding {
    subject: String,
    level: Level,
    detail: String,
    fix: Option<String>,
}

impl Finding {
    fn pass(subject: &str, detail: impl Into<String>) -> Self {
        Self {
            subject: subject.to_string(),
            level: Level::Pass,
            detail: detail.into(),
            fix: None,
        }
    }

    fn warn(subject: &str, detail: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            subject: subject.to_string(),
            level: Level::Warn,
            detail: detail.into(),
            fix: Some(fix.into()),
        }
    }

    fn fail(subject: &str, detail: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            fix: Some(fix.into()),
            level: Level::Fail,
            ..Self::pass(subject, detail)
        }
    }
}

/// Findings grouped under section titles, printed in order.
#[derive(Default)]
struct Report {
    sections: Vec<(&'static str, Vec<Finding>)>,
}

impl Report {
    fn section(&mut self, title: &'static str, findings: Vec<Finding>) {
        println!("{}", style(title).bold());
        for finding in &findings {
            let mark = match finding.level {
                Level::Pass => style("✓").green(),
                Level::Warn => style("!").yellow(),
                Level::Fail => style("✗").red(),
            };
            println!("  {} {} - {}", mark, style(&finding.subject).bold(), finding.detail);
            if let Some(fix) = &finding.fix {
                println!("    {} {}", style("→").dim(), style(fix).dim());
            }
        }
        println!();
        self.sections.push((title, findings));
    }

    fn count(&self, level: Level) -> usize {
        self.sections
            .iter()
            .flat_map(|(_, findings)| findings)
            .filter(|f| f.level == level)
            .count()
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("agentdeck Doctor");
    println!("\nChecking model runtime, agent models, tools and storage...\n");

    let mut report = Report::default();

    let mut runtime = Vec::new();
    match preflight::check_runtime(settings).await {
        Ok(available) => {
            runtime.push(Finding::pass(
                "Ollama",
                format!("{} ({} models)", settings.model.base_url, available.len()),
            ));
            runtime.extend(model_findings(settings, &available));
        }
        Err(e) => runtime.push(Finding::fail(
            "Ollama",
            format!("unreachable at {}", settings.model.base_url),
            e.to_string(),
        )),
    }
    report.section("Model Runtime", runtime);

    report.section("YouTube Tools", vec![ytdlp_finding(&settings.tools.ytdlp_path)]);
    report.section("Agent History", vec![history_finding(settings)]);
    report.section("Configuration", vec![config_finding(settings)]);

    let failures = report.count(Level::Fail);
    let warnings = report.count(Level::Warn);
    if failures > 0 {
        anyhow::bail!("{} problem(s) found; fix them before chatting with the agents", failures);
    }
    if warnings > 0 {
        Output::warning(&format!("Ready, with {} warning(s).", warnings));
    } else {
        Output::success("Everything looks good. Try 'agentdeck chat'.");
    }
    Ok(())
}

/// Every model an agent or the planner may use, without duplicates.
fn configured_models(settings: &Settings) -> Vec<String> {
    let mut models: Vec<String> = multi_agent_descriptors()
        .into_iter()
        .chain(fitness_descriptors(
            &settings.model.default_model,
            &settings.fitness.fallback_video_model,
        ))
        .map(|d| d.model)
        .collect();
    models.sort();
    models.dedup();
    models
}

fn model_findings(settings: &Settings, available: &[String]) -> Vec<Finding> {
    configured_models(settings)
        .into_iter()
        .map(|model| {
            if model_is_listed(available, &model) {
                Finding::pass(&model, "pulled")
            } else {
                let fix = format!("ollama pull {}", model);
                Finding::warn(&model, "not pulled", fix)
            }
        })
        .collect()
}

fn ytdlp_finding(ytdlp: &str) -> Finding {
    match preflight::check_tool(ytdlp) {
        Ok(version) => {
            let version: String = version.chars().take(50).collect();
            Finding::pass(ytdlp, version)
        }
        Err(e) => Finding::warn(
            ytdlp,
            e.to_string(),
            "The YouTube agents need it: pip install yt-dlp (or brew install yt-dlp)",
        ),
    }
}

fn history_finding(settings: &Settings) -> Finding {
    if !settings.storage.enabled {
        return Finding::pass("History store", "in memory (storage.enabled = false)");
    }

    let path = settings.sqlite_path();
    match std::fs::metadata(&path) {
        Ok(meta) => Finding::pass(
            "History store",
            format!("{} ({})", path.display(), format_size(meta.len())),
        ),
        Err(_) => Finding::warn(
            "History store",
            format!("{} (not created yet)", path.display()),
            "Created by the first chat with a Web, Finance or YouTube agent",
        ),
    }
}

fn config_finding(settings: &Settings) -> Finding {
    let path = Settings::default_config_path();
    if path.exists() {
        Finding::pass("Config file", path.display().to_string())
    } else {
        Finding::warn(
            "Config file",
            format!("using defaults (model {})", settings.model.default_model),
            "Create with: agentdeck config init",
        )
    }
}

fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB"] {
        if size < 1024.0 {
            return if unit == "B" {
                format!("{} B", bytes)
            } else {
                format!("{:.1} {}", size, unit)
            };
        }
        size /= 1024.0;
    }
    format!("{:.1} GB", size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_models_deduplicated() {
        let settings = Settings::default();
        let models = configured_models(&settings);
        assert_eq!(models, vec!["llama3.2", "llama3.2:3b", "llama3.2:latest"]);
    }

    #[test]
    fn test_unpulled_models_are_warnings() {
        let settings = Settings::default();
        let available = vec!["llama3.2:latest".to_string()];
        let findings = model_findings(&settings, &available);
        let missing: Vec<_> = findings
            .iter()
            .filter(|f| f.level == Level::Warn)
            .map(|f| f.subject.as_str())
            .collect();
        assert_eq!(missing, vec!["llama3.2:3b"]);
        assert_eq!(findings[0].fix, None);
    }

    #[test]
    fn test_missing_ytdlp_is_a_warning() {
        let finding = ytdlp_finding("agentdeck-no-such-binary");
        assert_eq!(finding.level, Level::Warn);
        assert!(finding.fix.unwrap().contains("yt-dlp"));
    }

    #[test]
    fn test_history_finding() {
        let mut settings = Settings::default();
        settings.storage.enabled = false;
        assert_eq!(history_finding(&settings).level, Level::Pass);

        let dir = tempfile::tempdir().unwrap();
        settings.storage.enabled = true;
        settings.storage.sqlite_path = dir.path().join("agents.db").to_string_lossy().to_string();
        assert_eq!(history_finding(&settings).level, Level::Warn);

        std::fs::write(dir.path().join("agents.db"), vec![0u8; 2048]).unwrap();
        let finding = history_finding(&settings);
        assert_eq!(finding.level, Level::Pass);
        assert!(finding.detail.ends_with("(2.0 KB)"));
    }

    #[test]
    fn test_report_counts() {
        let mut report = Report::default();
        report.section(
            "Test",
            vec![
                Finding::pass("a", "ok"),
                Finding::warn("b", "meh", "fix b"),
                Finding::fail("c", "bad", "fix c"),
            ],
        );
        assert_eq!(report.count(Level::Pass), 1);
        assert_eq!(report.count(Level::Warn), 1);
        assert_eq!(report.count(Level::Fail), 1);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024 / 2), "1.5 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
    }
}
