//! # Provider Trait
//!
//! Core abstraction over chat-completions backends. A provider exposes a
//! single-shot completion and an incrementally-streamed variant; the
//! retrying client in [`crate::client`] wraps either with its retry
//! envelope.
//!
//! The streaming variant returns a boxed [`Stream`] of text fragments —
//! a pull-based, single-pass, non-restartable sequence.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChatError;
use crate::types::{ChatRequest, ChatResponse};

/// Result type alias for provider operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Boxed stream of text fragments returned by [`ModelProvider::stream`].
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// A chat-completions backend.
///
/// Implementors must be `Send + Sync` so a single provider can be shared
/// across the session's serialized calls.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider identifier for logging (e.g. `"openrouter"`).
    fn name(&self) -> &str;

    /// Perform a non-streaming completion.
    async fn complete(&self, request: &ChatRequest) -> ChatResult<ChatResponse>;

    /// Perform a streaming completion, yielding text fragments as they
    /// arrive. The stream cannot be restarted once consumed.
    async fn stream(&self, request: &ChatRequest) -> ChatResult<TokenStream>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_is_object_safe() {
        fn assert_object_safe(_: &dyn ModelProvider) {}
        let _ = assert_object_safe;
    }

    #[test]
    fn provider_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ModelProvider>();
    }
}
