//! Search request/response types and model-facing formatting.

use serde::{Deserialize, Serialize};

/// Default number of hits requested.
pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// Character budget for per-hit content previews in [`format_for_model`].
const CONTENT_PREVIEW_CHARS: usize = 200;

// ─────────────────────────────────────────────────────────────────────────────
// Query
// ─────────────────────────────────────────────────────────────────────────────

/// Search depth requested from the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    /// Fast, shallow crawl.
    Basic,
    /// Slower, deeper crawl.
    Advanced,
}

/// One search request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Search keywords.
    pub query: String,
    /// Maximum hits to return.
    pub max_results: u32,
    /// Crawl depth.
    pub depth: SearchDepth,
    /// Whether to request a synthesized answer alongside the hits.
    pub include_answer: bool,
}

impl SearchQuery {
    /// Create a query with the default result count, basic depth, and a
    /// synthesized answer.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: DEFAULT_MAX_RESULTS,
            depth: SearchDepth::Basic,
            include_answer: true,
        }
    }

    /// Override the result count.
    #[must_use]
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Override the crawl depth.
    #[must_use]
    pub fn with_depth(mut self, depth: SearchDepth) -> Self {
        self.depth = depth;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────────────────────────────────────

/// One search hit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page title.
    #[serde(default)]
    pub title: String,
    /// Page URL.
    #[serde(default)]
    pub url: String,
    /// Extracted page content.
    #[serde(default)]
    pub content: String,
}

/// Search outcome. Failures are data, not errors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Synthesized answer, when requested and available.
    #[serde(default)]
    pub answer: String,
    /// Result hits.
    #[serde(default)]
    pub hits: Vec<SearchHit>,
    /// Failure description when the search could not be performed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    /// Build a failed response.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            answer: String::new(),
            hits: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Whether this response represents a failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Format a search response as text for model consumption.
#[must_use]
pub fn format_for_model(response: &SearchResponse) -> String {
    if let Some(error) = &response.error {
        return format!("Search failed: {error}");
    }

    let mut lines = vec!["### Search results\n".to_owned()];

    if !response.answer.is_empty() {
        lines.push(format!("**Summary**: {}\n", response.answer));
    }

    lines.push("**Sources**:".to_owned());
    for (i, hit) in response.hits.iter().enumerate() {
        lines.push(format!("\n{}. **{}**", i + 1, hit.title));
        lines.push(format!("   - URL: {}", hit.url));
        lines.push(format!("   - Content: {}...", preview(&hit.content)));
    }

    lines.join("\n")
}

/// Format only the source links as a markdown list.
#[must_use]
pub fn format_sources(response: &SearchResponse) -> String {
    if response.is_error() || response.hits.is_empty() {
        return String::new();
    }

    response
        .hits
        .iter()
        .map(|hit| format!("- [{}]({})", hit.title, hit.url))
        .collect::<Vec<_>>()
        .join("\n")
}

fn preview(content: &str) -> &str {
    match content.char_indices().nth(CONTENT_PREVIEW_CHARS) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
