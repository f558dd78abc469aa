use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::handler::{parse_arguments, ToolHandler};
use crate::errors::AgentResult;
use crate::models::tool::Tool;

pub const TAVILY_HOST: &str = "https://api.tavily.com";
pub const MAX_RESULTS: usize = 5;

/// Returned to the model in place of search results when the provider fails
pub const SEARCH_APOLOGY: &str = "Sorry, I couldn't retrieve the information at this time.";

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub host: String,
    pub api_key: String,
}

impl SearchConfig {
    pub fn tavily<S: Into<String>>(api_key: S) -> Self {
        Self {
            host: TAVILY_HOST.to_string(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    include_answer: bool,
    max_results: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
}

/// Client for the Tavily search API
pub struct TavilyClient {
    client: Client,
    config: SearchConfig,
}

impl TavilyClient {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self { client, config })
    }

    /// Search with an inline synthesized answer
    pub async fn search(&self, query: &str, max_results: usize) -> Result<SearchResponse> {
        let url = format!("{}/search", self.config.host.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&SearchRequest {
                query,
                include_answer: true,
                max_results,
            })
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

/// Build the tool output: the answer (or a fallback line), then the sources as bullets
pub fn format_search_response(query: &str, response: &SearchResponse) -> String {
    let mut output = match response.answer.as_deref().map(str::trim) {
        Some(answer) if !answer.is_empty() => answer.to_string(),
        _ => format!("Here's what I found about *{}*:", query),
    };

    if !response.results.is_empty() {
        let sources: Vec<String> = response
            .results
            .iter()
            .take(MAX_RESULTS)
            .map(|r| format!("• {} | {}", r.title, r.url))
            .collect();
        // Exactly one blank line between the answer and the sources
        output.push_str("\n\n");
        output.push_str(&sources.join("\n"));
    }

    output
}

#[derive(Debug, Deserialize)]
struct WebSourcesParams {
    query: String,
}

/// The `webSources` tool. Never fails: provider errors become [`SEARCH_APOLOGY`].
pub struct WebSourcesTool {
    tool: Tool,
    client: TavilyClient,
}

impl WebSourcesTool {
    pub fn new(client: TavilyClient) -> Self {
        let tool = Tool::new(
            "webSources",
            "Use this to search the web for information",
            json!({
                "type": "object",
                "required": ["query"],
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search the web for."
                    }
                }
            }),
        );
        Self { tool, client }
    }

    pub async fn search(&self, query: &str) -> String {
        match self.client.search(query, MAX_RESULTS).await {
            Ok(response) => {
                let output = format_search_response(query, &response);
                tracing::info!(query, output = %output, "web search completed");
                output
            }
            Err(e) => {
                tracing::error!(query, error = %e, "web search failed");
                SEARCH_APOLOGY.to_string()
            }
        }
    }
}

#[async_trait]
impl ToolHandler for WebSourcesTool {
    fn tool(&self) -> &Tool {
        &self.tool
    }

    async fn call(&self, arguments: Value) -> AgentResult<Value> {
        let params: WebSourcesParams = parse_arguments(&self.tool.name, arguments)?;
        Ok(Value::String(self.search(&params.query).await))
    }
}
