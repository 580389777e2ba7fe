//! Yahoo Finance lookups.

use crate::error::{AgentDeckError, Result};
use chrono::DateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Client for Yahoo Finance data.
pub struct FinanceClient {}

impl FinanceClient {
    pub fn new() -> Self {
        Self {}
    }

    fn connector() -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| AgentDeckError::Tool(format!("Yahoo Finance: {}", e)))
    }

    /// Latest quote for `symbol`.
    pub async fn stock_price(&self, symbol: &str) -> Result<String> {
        debug!("Fetching latest quote for {}", symbol);
        let provider = Self::connector()?;

        let response = provider
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| AgentDeckError::Tool(format!("No quote for {}: {}", symbol, e)))?;
        let quote = response
            .last_quote()
            .map_err(|e| AgentDeckError::Tool(format!("No quote for {}: {}", symbol, e)))?;

        let when = DateTime::from_timestamp(quote.timestamp as i64, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "unknown time".to_string());

        Ok(format!(
            "{} at {}\n| Open | High | Low | Close | Volume |\n|---|---|---|---|---|\n| {:.2} | {:.2} | {:.2} | {:.2} | {} |",
            symbol, when, quote.open, quote.high, quote.low, quote.close, quote.volume
        ))
    }

    /// Summary statistics over a historical range.
    pub async fn price_history(&self, symbol: &str, range: &str) -> Result<String> {
        let range = match range {
            "5d" | "1mo" | "3mo" | "6mo" | "1y" | "5y" => range,
            other => {
                return Err(AgentDeckError::Tool(format!(
                    "Unsupported range '{}'. Use 5d, 1mo, 3mo, 6mo, 1y or 5y.",
                    other
                )))
            }
        };
        debug!("Fetching {} history for {}", range, symbol);

        let provider = Self::connector()?;
        let response = provider
            .get_quote_range(symbol, "1d", range)
            .await
            .map_err(|e| AgentDeckError::Tool(format!("No history for {}: {}", symbol, e)))?;
        let quotes = response
            .quotes()
            .map_err(|e| AgentDeckError::Tool(format!("No history for {}: {}", symbol, e)))?;

        let (Some(first), Some(last)) = (quotes.first(), quotes.last()) else {
            return Ok(format!("No price history available for {}.", symbol));
        };

        let high = quotes.iter().map(|q| q.high).fold(f64::MIN, f64::max);
        let low = quotes.iter().map(|q| q.low).fold(f64::MAX, f64::min);
        let change = if first.close != 0.0 {
            (last.close - first.close) / first.close * 100.0
        } else {
            0.0
        };

        Ok(format!(
            "{} over {} ({} trading days)\n| Start | End | Change | High | Low |\n|---|---|---|---|---|\n| {:.2} | {:.2} | {:+.2}% | {:.2} | {:.2} |",
            symbol,
            range,
            quotes.len(),
            first.close,
            last.close,
            change,
            high,
            low
        ))
    }

    /// Company name, exchange and instrument type.
    pub async fn company_info(&self, symbol: &str) -> Result<String> {
        let provider = Self::connector()?;
        let result = provider
            .search_ticker(symbol)
            .await
            .map_err(|e| AgentDeckError::Tool(format!("Lookup failed for {}: {}", symbol, e)))?;

        let item = result
            .quotes
            .iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
            .or_else(|| result.quotes.first())
            .ok_or_else(|| AgentDeckError::Tool(format!("No company found for {}", symbol)))?;

        let name = if item.long_name.is_empty() {
            &item.short_name
        } else {
            &item.long_name
        };

        Ok(format!(
            "| Field | Value |\n|---|---|\n| Symbol | {} |\n| Name | {} |\n| Exchange | {} |\n| Type | {} |",
            item.symbol, name, item.exchange, item.type_display
        ))
    }

    /// Recent headlines mentioning the company.
    pub async fn company_news(&self, symbol: &str, num_stories: usize) -> Result<String> {
        let provider = Self::connector()?;
        let result = provider
            .search_ticker(symbol)
            .await
            .map_err(|e| AgentDeckError::Tool(format!("News lookup failed for {}: {}", symbol, e)))?;

        if result.news.is_empty() {
            return Ok(format!("No recent news for {}.", symbol));
        }

        let stories = result
            .news
            .iter()
            .take(num_stories.max(1))
            .map(|n| format!("- {} ({})\n  {}", n.title, n.publisher, n.link))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(format!("Recent news for {}:\n{}", symbol, stories))
    }
}

impl Default for FinanceClient {
    fn default() -> Self {
        Self::new()
    }
}
