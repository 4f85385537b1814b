//! Validation errors raised before a session starts.

use thiserror::Error;

/// Configuration rejected before a run starts. No session state is
/// mutated when one of these is returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The discussion topic was empty or whitespace.
    #[error("discussion topic must not be empty")]
    EmptyTopic,

    /// No enabled panelists were configured.
    #[error("at least one enabled panelist is required")]
    NoPanelists,

    /// The round count was zero.
    #[error("total rounds must be at least 1")]
    ZeroRounds,

    /// A required setting is missing.
    #[error("missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    /// Error category string for logging and event emission.
    #[must_use]
    pub fn category(&self) -> &'static str {
        "validation"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
