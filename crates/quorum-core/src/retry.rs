//! Retry configuration and backoff calculation.
//!
//! Provides the types and math for retry logic. The actual async retry
//! execution lives in `quorum-llm` (which has access to tokio), while this
//! module contains the portable, sync-only building blocks:
//!
//! - [`RetryConfig`]: retry parameters (max retries, backoff, jitter)
//! - [`backoff_delay`] / [`backoff_delay_with_jitter`]: exponential backoff
//! - [`parse_retry_after_header`]: parse `Retry-After` HTTP header

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default maximum retries per logical call.
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Default base delay in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 2000;
/// Default maximum delay in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 60_000;
/// Default jitter factor (0.0–1.0). Zero keeps the schedule exactly
/// `base * 2^attempt`.
pub const DEFAULT_JITTER_FACTOR: f64 = 0.0;

/// Configuration for retry logic.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 2).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay for exponential backoff in ms (default: 2000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Maximum delay between retries in ms (default: 60000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Jitter factor 0.0–1.0 (default: 0.0).
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}
fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}
fn default_jitter_factor() -> f64 {
    DEFAULT_JITTER_FACTOR
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            jitter_factor: DEFAULT_JITTER_FACTOR,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backoff calculation
// ─────────────────────────────────────────────────────────────────────────────

/// Calculate exponential backoff delay without jitter.
///
/// Formula: `min(max_delay, base_delay * 2^attempt)` where `attempt` is
/// the zero-based retry index (0 for the first retry).
#[must_use]
pub fn backoff_delay(attempt: u32, base_delay_ms: u64, max_delay_ms: u64) -> u64 {
    let exponential = base_delay_ms.saturating_mul(1u64 << attempt.min(31));
    exponential.min(max_delay_ms)
}

/// Calculate backoff delay with explicit jitter randomness.
///
/// `random` should be a value in `[0.0, 1.0)` from a PRNG; it maps to a
/// symmetric `[-jitter, +jitter]` scaling of the capped exponential value.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn backoff_delay_with_jitter(
    attempt: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    jitter_factor: f64,
    random: f64,
) -> u64 {
    let capped = backoff_delay(attempt, base_delay_ms, max_delay_ms);
    let jitter = 1.0 + (random * 2.0 - 1.0) * jitter_factor;
    ((capped as f64) * jitter).round().max(0.0) as u64
}

// ─────────────────────────────────────────────────────────────────────────────
// Retry-After header parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a `Retry-After` HTTP header value.
///
/// The value can be either:
/// - A number of seconds (e.g. `"120"`)
/// - An HTTP-date (e.g. `"Thu, 01 Dec 2025 16:00:00 GMT"`)
///
/// Returns the delay in milliseconds, or `None` if parsing fails.
#[must_use]
pub fn parse_retry_after_header(value: &str) -> Option<u64> {
    // Try parsing as integer seconds first
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(seconds * 1000);
    }

    // Try parsing as HTTP date
    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value) {
        let now = chrono::Utc::now();
        let delay_ms = date.signed_duration_since(now).num_milliseconds();
        return Some(if delay_ms > 0 {
            #[allow(clippy::cast_sign_loss)]
            let ms = delay_ms as u64;
            ms
        } else {
            0
        });
    }

    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
