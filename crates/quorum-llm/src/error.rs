//! Errors for chat provider operations.

use thiserror::Error;

/// Errors that can occur during chat provider operations.
#[derive(Debug, Error)]
pub enum ChatError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SSE stream parsing failed.
    #[error("SSE parse error: {message}")]
    SseParse {
        /// Error description.
        message: String,
    },

    /// Rate limited by the provider.
    #[error("Rate limited: retry after {retry_after_ms}ms")]
    RateLimited {
        /// Suggested retry delay in milliseconds (0 when the provider
        /// supplied none).
        retry_after_ms: u64,
        /// Error description.
        message: String,
    },

    /// Provider returned an API error.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
        /// Provider-specific error code.
        code: Option<String>,
        /// Whether this error can be retried.
        retryable: bool,
    },

    /// A tool call failed boundary validation.
    #[error("Invalid tool call `{name}`: {message}")]
    InvalidToolCall {
        /// Tool name as emitted by the model.
        name: String,
        /// Validation failure description.
        message: String,
    },

    /// Call was cancelled.
    #[error("Call cancelled")]
    Cancelled,

    /// Retry budget exhausted; carries the last error observed.
    #[error("retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Total attempts made (1-based).
        attempts: u32,
        /// The last error.
        #[source]
        source: Box<ChatError>,
    },

    /// Provider-specific error.
    #[error("{message}")]
    Other {
        /// Error description.
        message: String,
    },
}

impl ChatError {
    /// Whether this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| {
                        s == reqwest::StatusCode::TOO_MANY_REQUESTS || s.is_server_error()
                    })
            }
            Self::RateLimited { .. } => true,
            Self::Api { retryable, .. } => *retryable,
            Self::SseParse { .. }
            | Self::Json(_)
            | Self::InvalidToolCall { .. }
            | Self::Cancelled
            | Self::RetriesExhausted { .. }
            | Self::Other { .. } => false,
        }
    }

    /// Extract the suggested retry delay in milliseconds, if available.
    #[must_use]
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_ms, .. } => Some(*retry_after_ms),
            _ => None,
        }
    }

    /// Error category string for logging and event emission.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Http(_) => "network",
            Self::Json(_) | Self::SseParse { .. } => "parse",
            Self::RateLimited { .. } => "rate_limit",
            Self::Api { .. } => "api",
            Self::InvalidToolCall { .. } => "validation",
            Self::Cancelled => "cancelled",
            Self::RetriesExhausted { source, .. } => source.category(),
            Self::Other { .. } => "unknown",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
