//! DuckDuckGo web search.
//!
//! Uses the JavaScript-free HTML endpoint, which needs no API key.

use crate::error::{AgentDeckError, Result};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

const SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

static RESULT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a[^>]*class="result__a"[^>]*href="([^"]+)"[^>]*>(.*?)</a>"#)
        .expect("valid result link regex")
});

static RESULT_SNIPPET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__snippet"[^>]*>(.*?)</(?:a|div|td)>"#)
        .expect("valid snippet regex")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// A single search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Client for DuckDuckGo searches.
pub struct WebSearchClient {
    client: reqwest::Client,
}

impl WebSearchClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(format!("agentdeck/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Run a search and format the hits for the model.
    pub async fn search(&self, query: &str, max_results: usize, news: bool) -> Result<String> {
        let mut form = vec![("q", query.to_string())];
        if news {
            // Restrict to the past week; the HTML endpoint has no news vertical.
            form.push(("df", "w".to_string()));
        }

        debug!("DuckDuckGo search: {} (news: {})", query, news);

        let response = self
            .client
            .post(SEARCH_ENDPOINT)
            .form(&form)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AgentDeckError::Tool(format!("Search request failed: {}", e)))?;

        let html = response.text().await?;
        let hits = parse_results(&html, max_results);

        if hits.is_empty() {
            return Ok(format!("No results found for '{}'.", query));
        }

        let formatted = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| format!("{}. {}\n   {}\n   {}", i + 1, hit.title, hit.url, hit.snippet))
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(format!("Found {} results:\n\n{}", hits.len(), formatted))
    }
}

/// Parse result links and snippets out of a DuckDuckGo HTML page.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let snippets: Vec<String> = RESULT_SNIPPET
        .captures_iter(html)
        .map(|c| clean_text(&c[1]))
        .collect();

    RESULT_LINK
        .captures_iter(html)
        .enumerate()
        .map(|(i, caps)| SearchHit {
            title: clean_text(&caps[2]),
            url: resolve_redirect(&decode_entities(&caps[1])),
            snippet: snippets.get(i).cloned().unwrap_or_default(),
        })
        .filter(|hit| !hit.url.is_empty())
        .take(max_results)
        .collect()
}

/// DuckDuckGo wraps targets as `//duckduckgo.com/l/?uddg=<encoded>`.
fn resolve_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    match url::Url::parse(&absolute) {
        Ok(parsed) => parsed
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())
            .unwrap_or(absolute),
        Err(_) => absolute,
    }
}

fn clean_text(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, "");
    decode_entities(stripped.trim())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<div class="result results_links">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fsquats&amp;rut=abc">How to <b>Squat</b> Properly</a>
  </h2>
  <a class="result__snippet" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fsquats">Keep your <b>knees</b> &amp; hips aligned.</a>
</div>
<div class="result results_links">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="https://direct.example.org/deadlift">Deadlift Basics</a>
  </h2>
  <a class="result__snippet" href="https://direct.example.org/deadlift">Hinge at the hips.</a>
</div>
"#;

    #[test]
    fn test_parse_results_decodes_redirects_and_markup() {
        let hits = parse_results(PAGE, 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "How to Squat Properly");
        assert_eq!(hits[0].url, "https://example.com/squats");
        assert_eq!(hits[0].snippet, "Keep your knees & hips aligned.");
        assert_eq!(hits[1].url, "https://direct.example.org/deadlift");
    }

    #[test]
    fn test_parse_results_respects_limit() {
        assert_eq!(parse_results(PAGE, 1).len(), 1);
        assert!(parse_results("<html></html>", 5).is_empty());
    }
}
