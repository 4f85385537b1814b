//! # Retrying chat client
//!
//! Wraps a [`ModelProvider`] with the session's resilience policy:
//!
//! - **Bounded retry with exponential backoff** on rate-limit and
//!   retryable provider-status failures; any other failure propagates
//!   immediately. Exhausting the budget raises
//!   [`ChatError::RetriesExhausted`] carrying the last error.
//! - **Retry only before first output.** Once a fragment has reached the
//!   caller the stream cannot be restarted — a later failure passes
//!   through, and fragments already delivered must not be treated as a
//!   committed turn.
//! - **Post-call cooldown** after every successful logical call
//!   (rate-limit hygiene), paid exactly once per call.
//! - **Cooperative cancellation** during backoff waits via an optional
//!   `CancellationToken`.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use quorum_core::retry::{RetryConfig, backoff_delay, backoff_delay_with_jitter};

use crate::error::ChatError;
use crate::provider::{ChatResult, ModelProvider, TokenStream};
use crate::types::{ChatRequest, ChatResponse};

/// Default post-success cooldown in milliseconds.
pub const DEFAULT_COOLDOWN_MS: u64 = 1500;

/// Configuration for the chat client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Retry parameters.
    pub retry: RetryConfig,
    /// Delay applied once after each successful logical call.
    pub cooldown_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }
}

/// Resilient wrapper over a shared [`ModelProvider`].
///
/// All session calls are serialized through one client; the provider is
/// shared rather than per-participant since at most one call is in flight
/// at a time.
pub struct ChatClient {
    provider: Arc<dyn ModelProvider>,
    config: ClientConfig,
}

impl ChatClient {
    /// Create a client with the default configuration.
    #[must_use]
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self::with_config(provider, ClientConfig::default())
    }

    /// Create a client with an explicit configuration.
    #[must_use]
    pub fn with_config(provider: Arc<dyn ModelProvider>, config: ClientConfig) -> Self {
        Self { provider, config }
    }

    /// Name of the wrapped provider, for logging.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Perform a streaming call, yielding text fragments.
    ///
    /// Connection failures before the first fragment are retried up to
    /// `max_retries` times; once output starts flowing, errors pass
    /// through to the caller. After the stream completes the cooldown is
    /// paid before the stream ends.
    pub fn stream_chat(
        &self,
        request: ChatRequest,
        max_retries: u32,
        cancel: Option<CancellationToken>,
    ) -> TokenStream {
        type Item = ChatResult<String>;

        let provider = Arc::clone(&self.provider);
        let config = self.config.clone();

        Box::pin(async_stream::stream! {
            use futures::StreamExt;

            let mut attempt = 0u32;
            let mut has_yielded = false;

            loop {
                match provider.stream(&request).await {
                    Ok(inner) => {
                        let mut inner = std::pin::pin!(inner);
                        let mut stream_err: Option<ChatError> = None;
                        while let Some(item) = inner.next().await {
                            match item {
                                Ok(fragment) => {
                                    has_yielded = true;
                                    let v: Item = Ok(fragment);
                                    yield v;
                                }
                                Err(err) => {
                                    stream_err = Some(err);
                                    break;
                                }
                            }
                        }

                        match stream_err {
                            None => {
                                // Stream completed; pay the cooldown once.
                                tokio::time::sleep(Duration::from_millis(config.cooldown_ms)).await;
                                break;
                            }
                            Some(err) if has_yielded => {
                                // Fragments already delivered — the call is
                                // not restartable, surface the failure.
                                let v: Item = Err(err);
                                yield v;
                                break;
                            }
                            Some(err) => {
                                if let Some(terminal) =
                                    wait_before_retry(&mut attempt, max_retries, err, &config, cancel.as_ref()).await
                                {
                                    let v: Item = Err(terminal);
                                    yield v;
                                    break;
                                }
                            }
                        }
                    }
                    Err(err) => {
                        if let Some(terminal) =
                            wait_before_retry(&mut attempt, max_retries, err, &config, cancel.as_ref()).await
                        {
                            let v: Item = Err(terminal);
                            yield v;
                            break;
                        }
                    }
                }
            }
        })
    }

    /// Perform a non-streaming call with the same retry envelope.
    pub async fn chat(&self, request: ChatRequest, max_retries: u32) -> ChatResult<ChatResponse> {
        let mut attempt = 0u32;
        loop {
            match self.provider.complete(&request).await {
                Ok(response) => {
                    debug!(
                        model = %request.model,
                        attempts = attempt + 1,
                        "chat call succeeded"
                    );
                    tokio::time::sleep(Duration::from_millis(self.config.cooldown_ms)).await;
                    return Ok(response);
                }
                Err(err) => {
                    if let Some(terminal) =
                        wait_before_retry(&mut attempt, max_retries, err, &self.config, None).await
                    {
                        return Err(terminal);
                    }
                }
            }
        }
    }

    /// Non-streaming call with tools populated, for inspecting the
    /// model's tool-call requests before continuing.
    pub async fn chat_with_tools(
        &self,
        request: ChatRequest,
        max_retries: u32,
    ) -> ChatResult<ChatResponse> {
        debug_assert!(
            !request.tools.is_empty(),
            "chat_with_tools called without tools"
        );
        self.chat(request, max_retries).await
    }
}

/// Decide whether to retry after `err`, sleeping the backoff delay.
///
/// Returns `None` when the caller should retry, or `Some(terminal)` when
/// the error must surface: non-retryable errors propagate unchanged,
/// budget exhaustion wraps the last error, and a cancellation observed
/// during the wait becomes [`ChatError::Cancelled`].
async fn wait_before_retry(
    attempt: &mut u32,
    max_retries: u32,
    err: ChatError,
    config: &ClientConfig,
    cancel: Option<&CancellationToken>,
) -> Option<ChatError> {
    if !err.is_retryable() {
        return Some(err);
    }
    if *attempt >= max_retries {
        return Some(ChatError::RetriesExhausted {
            attempts: *attempt + 1,
            source: Box::new(err),
        });
    }
    if let Some(token) = cancel {
        if token.is_cancelled() {
            return Some(ChatError::Cancelled);
        }
    }

    let delay_ms = retry_delay(*attempt, &config.retry, &err);
    warn!(
        attempt = *attempt + 1,
        max_retries,
        delay_ms,
        category = err.category(),
        error = %err,
        "chat call failed, retrying"
    );
    *attempt += 1;

    if let Some(token) = cancel {
        tokio::select! {
            () = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
            () = token.cancelled() => return Some(ChatError::Cancelled),
        }
    } else {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
    None
}

/// Backoff delay for the given zero-based retry index, honoring a larger
/// provider-supplied `Retry-After` when present.
fn retry_delay(attempt: u32, retry: &RetryConfig, err: &ChatError) -> u64 {
    let backoff = if retry.jitter_factor > 0.0 {
        backoff_delay_with_jitter(
            attempt,
            retry.base_delay_ms,
            retry.max_delay_ms,
            retry.jitter_factor,
            rand::random::<f64>(),
        )
    } else {
        backoff_delay(attempt, retry.base_delay_ms, retry.max_delay_ms)
    };
    err.retry_after_ms().map_or(backoff, |ra| backoff.max(ra))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
