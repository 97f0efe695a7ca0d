//! # Search Tool
//!
//! Web search over the Serper API. The researcher agent consumes ranked
//! snippets; the orchestrator fetches them before the LLM call and
//! injects them into the researcher's prompt.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

const SEARCH_URL: &str = "https://google.serper.dev/search";
const DEFAULT_RESULT_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search API returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// One ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Seam for the researcher's search capability.
#[async_trait]
pub trait SearchTool: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError>;
}

/// Serper-backed search.
pub struct SerperSearchTool {
    client: Client,
    api_key: String,
    limit: usize,
}

impl SerperSearchTool {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            limit: DEFAULT_RESULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

#[async_trait]
impl SearchTool for SerperSearchTool {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        debug!(%query, "querying serper");

        let response = self
            .client
            .post(SEARCH_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query, "num": self.limit }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api { status, message });
        }

        let body: serde_json::Value = response.json().await?;
        Ok(parse_organic(&body, self.limit))
    }
}

/// Map the `organic` section of a Serper response to hits.
fn parse_organic(body: &serde_json::Value, limit: usize) -> Vec<SearchHit> {
    body.get("organic")
        .and_then(|o| o.as_array())
        .map(|results| {
            results
                .iter()
                .take(limit)
                .map(|r| SearchHit {
                    title: r.get("title").and_then(|v| v.as_str()).unwrap_or("").to_string(),
                    link: r.get("link").and_then(|v| v.as_str()).unwrap_or("").to_string(),
                    snippet: r
                        .get("snippet")
                        .and_then(|v| v.as_str())
                        .unwrap_or("")
                        .to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Render hits as a context block for the researcher prompt.
pub fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No search results were found.".to_string();
    }
    hits.iter()
        .enumerate()
        .map(|(i, hit)| format!("{}. {}\n   {}\n   {}", i + 1, hit.title, hit.link, hit.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serper_fixture() -> serde_json::Value {
        json!({
            "searchParameters": { "q": "AI Agents in UX Design" },
            "organic": [
                {
                    "title": "Agents reshape UX research",
                    "link": "https://example.com/agents-ux",
                    "snippet": "A look at agentic workflows in design tools.",
                    "position": 1
                },
                {
                    "title": "Designing for AI agents",
                    "link": "https://example.com/designing",
                    "snippet": "Patterns for agent-driven interfaces.",
                    "position": 2
                }
            ]
        })
    }

    #[test]
    fn test_parse_organic_maps_fields() {
        let hits = parse_organic(&serper_fixture(), 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Agents reshape UX research");
        assert_eq!(hits[0].link, "https://example.com/agents-ux");
        assert!(hits[1].snippet.contains("agent-driven"));
    }

    #[test]
    fn test_parse_organic_respects_limit() {
        let hits = parse_organic(&serper_fixture(), 1);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_parse_organic_tolerates_missing_sections() {
        assert!(parse_organic(&json!({}), 5).is_empty());
        assert!(parse_organic(&json!({ "organic": [{}] }), 5)[0].title.is_empty());
    }

    #[test]
    fn test_format_hits_numbers_results() {
        let hits = parse_organic(&serper_fixture(), 5);
        let block = format_hits(&hits);
        assert!(block.starts_with("1. "));
        assert!(block.contains("2. Designing for AI agents"));
        assert!(block.contains("https://example.com/agents-ux"));
    }

    #[test]
    fn test_format_hits_empty() {
        assert_eq!(format_hits(&[]), "No search results were found.");
    }
}
