//! Tool definitions and implementations for agents.
//!
//! Each agent descriptor lists the [`ToolKind`]s it may use. The runner
//! advertises the matching function schemas to the model, parses the calls
//! the model makes and hands them to the [`ToolBox`].

mod finance;
mod web_search;
mod youtube;

pub use finance::FinanceClient;
pub use web_search::{parse_results, SearchHit, WebSearchClient};
pub use youtube::{flatten_vtt, YoutubeClient};

use crate::config::ToolSettings;
use crate::error::{AgentDeckError, Result};
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use serde::{Deserialize, Serialize};

/// Which finance functions an agent is allowed to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceFeatures {
    pub stock_price: bool,
    pub price_history: bool,
    pub company_info: bool,
    pub company_news: bool,
}

impl FinanceFeatures {
    pub fn all() -> Self {
        Self {
            stock_price: true,
            price_history: true,
            company_info: true,
            company_news: true,
        }
    }
}

/// A capability attached to an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolKind {
    /// DuckDuckGo web search, optionally with a news search function.
    WebSearch { news: bool },
    /// Yahoo Finance lookups.
    Finance(FinanceFeatures),
    /// YouTube metadata and captions.
    YouTube,
}

impl ToolKind {
    /// Function names this kind exposes to the model.
    pub fn function_names(&self) -> Vec<&'static str> {
        match self {
            ToolKind::WebSearch { news } => {
                let mut names = vec!["web_search"];
                if *news {
                    names.push("search_news");
                }
                names
            }
            ToolKind::Finance(features) => {
                let mut names = Vec::new();
                if features.stock_price {
                    names.push("get_stock_price");
                }
                if features.price_history {
                    names.push("get_price_history");
                }
                if features.company_info {
                    names.push("get_company_info");
                }
                if features.company_news {
                    names.push("get_company_news");
                }
                names
            }
            ToolKind::YouTube => vec!["get_youtube_video_data", "get_youtube_video_captions"],
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolKind::WebSearch { .. } => write!(f, "web search"),
            ToolKind::Finance(_) => write!(f, "financial data"),
            ToolKind::YouTube => write!(f, "youtube"),
        }
    }
}

/// A parsed tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    WebSearch { query: String, max_results: usize },
    SearchNews { query: String, max_results: usize },
    GetStockPrice { symbol: String },
    GetPriceHistory { symbol: String, range: String },
    GetCompanyInfo { symbol: String },
    GetCompanyNews { symbol: String, num_stories: usize },
    GetYoutubeVideoData { url: String },
    GetYoutubeVideoCaptions { url: String },
}

impl ToolCall {
    /// The function name the model used for this call.
    pub fn function_name(&self) -> &'static str {
        match self {
            ToolCall::WebSearch { .. } => "web_search",
            ToolCall::SearchNews { .. } => "search_news",
            ToolCall::GetStockPrice { .. } => "get_stock_price",
            ToolCall::GetPriceHistory { .. } => "get_price_history",
            ToolCall::GetCompanyInfo { .. } => "get_company_info",
            ToolCall::GetCompanyNews { .. } => "get_company_news",
            ToolCall::GetYoutubeVideoData { .. } => "get_youtube_video_data",
            ToolCall::GetYoutubeVideoCaptions { .. } => "get_youtube_video_captions",
        }
    }
}

/// Executes tool calls against the real services.
pub struct ToolBox {
    web: WebSearchClient,
    finance: FinanceClient,
    youtube: YoutubeClient,
    default_max_results: usize,
}

impl ToolBox {
    pub fn new(settings: &ToolSettings) -> Result<Self> {
        Ok(Self {
            web: WebSearchClient::new(settings.http_timeout_secs)?,
            finance: FinanceClient::new(),
            youtube: YoutubeClient::new(
                &settings.ytdlp_path,
                &settings.caption_language,
                settings.max_caption_chars,
            ),
            default_max_results: settings.search_max_results,
        })
    }

    /// Default `max_results` used when the model omits it.
    pub fn default_max_results(&self) -> usize {
        self.default_max_results
    }

    /// Execute a tool call and return the result as text for the model.
    pub async fn execute(&self, call: &ToolCall) -> Result<String> {
        match call {
            ToolCall::WebSearch { query, max_results } => {
                self.web.search(query, *max_results, false).await
            }
            ToolCall::SearchNews { query, max_results } => {
                self.web.search(query, *max_results, true).await
            }
            ToolCall::GetStockPrice { symbol } => self.finance.stock_price(symbol).await,
            ToolCall::GetPriceHistory { symbol, range } => {
                self.finance.price_history(symbol, range).await
            }
            ToolCall::GetCompanyInfo { symbol } => self.finance.company_info(symbol).await,
            ToolCall::GetCompanyNews {
                symbol,
                num_stories,
            } => self.finance.company_news(symbol, *num_stories).await,
            ToolCall::GetYoutubeVideoData { url } => self.youtube.video_data(url).await,
            ToolCall::GetYoutubeVideoCaptions { url } => self.youtube.captions(url).await,
        }
    }
}

/// Whether `call` is permitted by any of the agent's tool kinds.
pub fn is_allowed(kinds: &[ToolKind], call: &ToolCall) -> bool {
    let name = call.function_name();
    kinds.iter().any(|k| k.function_names().contains(&name))
}

fn function(name: &str, description: &str, parameters: serde_json::Value) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: name.to_string(),
            description: Some(description.to_string()),
            parameters: Some(parameters),
            strict: None,
        },
    }
}

fn symbol_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "symbol": {
                "type": "string",
                "description": "The stock ticker symbol, e.g. NVDA"
            }
        },
        "required": ["symbol"]
    })
}

fn query_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "The search query"
            },
            "max_results": {
                "type": "integer",
                "description": "Maximum number of results (default: 5)",
                "default": 5
            }
        },
        "required": ["query"]
    })
}

fn url_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "url": {
                "type": "string",
                "description": "The YouTube video URL"
            }
        },
        "required": ["url"]
    })
}

/// Get OpenAI function/tool definitions for the given tool kinds.
pub fn tool_definitions(kinds: &[ToolKind]) -> Vec<ChatCompletionTool> {
    let mut tools = Vec::new();

    for kind in kinds {
        for name in kind.function_names() {
            let tool = match name {
                "web_search" => function(
                    name,
                    "Search the web with DuckDuckGo. Use this to find current information and sources.",
                    query_schema(),
                ),
                "search_news" => function(
                    name,
                    "Search recent news articles with DuckDuckGo.",
                    query_schema(),
                ),
                "get_stock_price" => function(
                    name,
                    "Get the latest stock price for a ticker symbol.",
                    symbol_schema(),
                ),
                "get_price_history" => function(
                    name,
                    "Get a summary of historical prices for a ticker symbol.",
                    serde_json::json!({
                        "type": "object",
                        "properties": {
                            "symbol": {
                                "type": "string",
                                "description": "The stock ticker symbol"
                            },
                            "range": {
                                "type": "string",
                                "description": "One of 5d, 1mo, 3mo, 6mo, 1y, 5y (default: 1mo)",
                                "default": "1mo"
                            }
                        },
                        "required": ["symbol"]
                    }),
                ),
                "get_company_info" => function(
                    name,
                    "Get company name, exchange and instrument type for a ticker symbol.",
                    symbol_schema(),
                ),
                "get_company_news" => function(
                    name,
                    "Get recent news headlines for a company.",
                    serde_json::json!({
                        "type": "object",
                        "properties": {
                            "symbol": {
                                "type": "string",
                                "description": "The stock ticker symbol"
                            },
                            "num_stories": {
                                "type": "integer",
                                "description": "Number of stories to return (default: 3)",
                                "default": 3
                            }
                        },
                        "required": ["symbol"]
                    }),
                ),
                "get_youtube_video_data" => function(
                    name,
                    "Get metadata (title, channel, duration, description) for a YouTube video.",
                    url_schema(),
                ),
                "get_youtube_video_captions" => function(
                    name,
                    "Get the captions of a YouTube video with timestamps.",
                    url_schema(),
                ),
                _ => continue,
            };
            tools.push(tool);
        }
    }

    tools
}

fn required_str(args: &serde_json::Value, key: &str) -> Result<String> {
    args[key]
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AgentDeckError::Tool(format!("Missing '{}' argument", key)))
}

/// Parse a tool call from the OpenAI response format.
pub fn parse_tool_call(name: &str, arguments: &str, default_max_results: usize) -> Result<ToolCall> {
    // Some local models send an empty string for argument-less calls.
    let arguments = if arguments.trim().is_empty() { "{}" } else { arguments };
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| AgentDeckError::Tool(format!("Invalid tool arguments: {}", e)))?;

    let max_results = args["max_results"]
        .as_u64()
        .map(|n| n as usize)
        .unwrap_or(default_max_results);

    match name {
        "web_search" | "duckduckgo_search" => Ok(ToolCall::WebSearch {
            query: required_str(&args, "query")?,
            max_results,
        }),
        "search_news" | "duckduckgo_news" => Ok(ToolCall::SearchNews {
            query: required_str(&args, "query")?,
            max_results,
        }),
        "get_stock_price" | "get_current_stock_price" => Ok(ToolCall::GetStockPrice {
            symbol: required_str(&args, "symbol")?.to_uppercase(),
        }),
        "get_price_history" => Ok(ToolCall::GetPriceHistory {
            symbol: required_str(&args, "symbol")?.to_uppercase(),
            range: args["range"].as_str().unwrap_or("1mo").to_string(),
        }),
        "get_company_info" => Ok(ToolCall::GetCompanyInfo {
            symbol: required_str(&args, "symbol")?.to_uppercase(),
        }),
        "get_company_news" => Ok(ToolCall::GetCompanyNews {
            symbol: required_str(&args, "symbol")?.to_uppercase(),
            num_stories: args["num_stories"].as_u64().unwrap_or(3) as usize,
        }),
        "get_youtube_video_data" => Ok(ToolCall::GetYoutubeVideoData {
            url: required_str(&args, "url")?,
        }),
        "get_youtube_video_captions" => Ok(ToolCall::GetYoutubeVideoCaptions {
            url: required_str(&args, "url")?,
        }),
        _ => Err(AgentDeckError::Tool(format!("Unknown tool: {}", name))),
    }
}
