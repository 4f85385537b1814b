//! Runtime errors.

use thiserror::Error;

use quorum_llm::ChatError;

/// A failure that escaped turn-level containment and aborts the run.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A moderator call (opening, summary, synthesis) failed terminally.
    #[error("{0}")]
    Chat(#[from] ChatError),

    /// Internal invariant violation.
    #[error("internal session error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Error category string for logging and event emission.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Chat(e) => e.category(),
            Self::Internal(_) => "internal",
        }
    }
}
