//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print an agent summary line for listings.
    pub fn agent_info(name: &str, model: &str, tools: &str, description: &str) {
        println!(
            "  {} {} ({}, tools: {})",
            style("*").cyan(),
            style(name).bold(),
            style(model).dim(),
            tools
        );
        if !description.is_empty() {
            println!("    {}", style(content_preview(description, 100)).dim());
        }
    }

    /// Print an agent's reply with its name and how long it took.
    pub fn reply(agent: &str, text: &str, elapsed: Duration) {
        println!(
            "\n{} {}",
            style(format!("{}:", agent)).green().bold(),
            style(format_elapsed(elapsed)).dim()
        );
        Self::markdown(text);
    }

    /// Print a block of markdown as-is, followed by a blank line.
    pub fn markdown(text: &str) {
        println!("{}\n", text.trim_end());
    }

    /// Print an input prompt without a trailing newline.
    pub fn prompt(label: &str) {
        print!("{} ", style(format!("{}>", label)).cyan().bold());
        let _ = std::io::stdout().flush();
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Format an elapsed duration as `(1.2s)` or `(1m 5s)`.
fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64();
    if seconds >= 60.0 {
        let total = seconds as u64;
        format!("({}m {}s)", total / 60, total % 60)
    } else {
        format!("({:.1}s)", seconds)
    }
}

/// Single-line preview with ellipsis.
fn content_preview(content: &str, max_len: usize) -> String {
    let content = content.replace('\n', " ");
    match content.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content,
    }
}
