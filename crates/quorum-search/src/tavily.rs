//! Tavily search backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{SearchHit, SearchQuery, SearchResponse};
use crate::SearchProvider;

/// Default Tavily API root.
pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Configuration for [`TavilyClient`].
#[derive(Clone, Debug, Default)]
pub struct TavilyConfig {
    /// API key.
    pub api_key: String,
    /// Base URL override (defaults to the public API).
    pub base_url: Option<String>,
}

/// Search client for the Tavily API.
pub struct TavilyClient {
    config: TavilyConfig,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
    search_depth: &'a str,
    include_answer: bool,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<WireHit>,
}

#[derive(Deserialize)]
struct WireHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilyClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: TavilyConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            config,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    async fn search_inner(&self, query: &SearchQuery) -> Result<SearchResponse, String> {
        if self.config.api_key.is_empty() {
            return Err("TAVILY_API_KEY is not configured".into());
        }

        let depth = match query.depth {
            crate::types::SearchDepth::Basic => "basic",
            crate::types::SearchDepth::Advanced => "advanced",
        };
        let body = WireRequest {
            api_key: &self.config.api_key,
            query: &query.query,
            max_results: query.max_results,
            search_depth: depth,
            include_answer: query.include_answer,
        };

        debug!(query = %query.query, max_results = query.max_results, "searching");

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("search request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("search returned HTTP {status}: {body}"));
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| format!("search response was not valid JSON: {e}"))?;

        Ok(SearchResponse {
            answer: wire.answer.unwrap_or_default(),
            hits: wire
                .results
                .into_iter()
                .map(|h| SearchHit {
                    title: h.title,
                    url: h.url,
                    content: h.content,
                })
                .collect(),
            error: None,
        })
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &SearchQuery) -> SearchResponse {
        match self.search_inner(query).await {
            Ok(response) => response,
            Err(error) => {
                warn!(query = %query.query, error = %error, "search failed");
                SearchResponse::failed(error)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
