//! Shared fakes for runtime tests.

use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use quorum_core::retry::RetryConfig;
use quorum_llm::provider::{ChatResult, ModelProvider, TokenStream};
use quorum_llm::types::{ChatRequest, ChatResponse, FinishReason, ToolCall};
use quorum_llm::{ChatClient, ChatError, ClientConfig};
use quorum_search::{SearchProvider, SearchQuery, SearchResponse};

/// A canned non-streaming reply.
pub(crate) struct CannedReply {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl CannedReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn web_search(query: &str) -> Self {
        Self {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: "call-1".into(),
                name: "web_search".into(),
                arguments: format!("{{\"query\":\"{query}\"}}"),
            }],
        }
    }
}

/// Scripted provider that records every request.
///
/// Calls are numbered from 1 across both kinds. Each call pops a scripted
/// stream/reply when one is queued, falls back to a deterministic default
/// otherwise, and can be failed or gated by call index.
pub(crate) struct RecordingProvider {
    calls: AtomicU32,
    fail_calls: Mutex<HashSet<u32>>,
    stream_script: Mutex<VecDeque<Vec<String>>>,
    complete_script: Mutex<VecDeque<CannedReply>>,
    requests: Mutex<Vec<ChatRequest>>,
    gate: Mutex<Option<(u32, Arc<Semaphore>)>>,
}

impl RecordingProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            fail_calls: Mutex::new(HashSet::new()),
            stream_script: Mutex::new(VecDeque::new()),
            complete_script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
        })
    }

    /// Provider whose first stream call yields exactly `fragments`.
    pub fn streaming(fragments: Vec<&str>) -> Arc<Self> {
        let provider = Self::new();
        provider.queue_stream(fragments);
        provider
    }

    pub fn queue_stream(&self, fragments: Vec<&str>) {
        self.stream_script
            .lock()
            .unwrap()
            .push_back(fragments.into_iter().map(str::to_owned).collect());
    }

    pub fn queue_reply(&self, reply: CannedReply) {
        self.complete_script.lock().unwrap().push_back(reply);
    }

    /// Fail call number `call` (1-based) with a permanent error.
    pub fn fail_call(&self, call: u32) {
        let _ = self.fail_calls.lock().unwrap().insert(call);
    }

    /// Block call number `call` until a permit is added to the returned
    /// semaphore.
    pub fn gate_call(&self, call: u32) -> Arc<Semaphore> {
        let semaphore = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some((call, Arc::clone(&semaphore)));
        semaphore
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    async fn begin_call(&self, request: &ChatRequest) -> Result<u32, ChatError> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());

        let gate = self.gate.lock().unwrap().clone();
        if let Some((call, semaphore)) = gate {
            if call == idx {
                semaphore.acquire().await.unwrap().forget();
            }
        }

        if self.fail_calls.lock().unwrap().contains(&idx) {
            return Err(ChatError::Api {
                status: 400,
                message: format!("scripted failure on call {idx}"),
                code: None,
                retryable: false,
            });
        }
        Ok(idx)
    }
}

#[async_trait]
impl ModelProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &ChatRequest) -> ChatResult<ChatResponse> {
        let idx = self.begin_call(request).await?;
        let reply = self
            .complete_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| CannedReply::text(format!("reply-{idx}")));

        let finish_reason = if reply.tool_calls.is_empty() {
            FinishReason::Stop
        } else {
            FinishReason::ToolCalls
        };
        Ok(ChatResponse {
            content: reply.content,
            tool_calls: reply.tool_calls,
            finish_reason,
        })
    }

    async fn stream(&self, request: &ChatRequest) -> ChatResult<TokenStream> {
        let idx = self.begin_call(request).await?;
        let fragments = self
            .stream_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| vec![format!("segment-{idx} "), "and a question?".to_owned()]);

        let items: Vec<ChatResult<String>> = fragments.into_iter().map(Ok).collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

/// Chat client with test-friendly timing (no cooldown, 1ms backoff).
pub(crate) fn test_client(provider: Arc<RecordingProvider>) -> ChatClient {
    ChatClient::with_config(
        provider,
        ClientConfig {
            retry: RetryConfig {
                max_retries: 2,
                base_delay_ms: 1,
                max_delay_ms: 10,
                jitter_factor: 0.0,
            },
            cooldown_ms: 0,
        },
    )
}

/// Search stub that records queries and returns a fixed response.
pub(crate) struct StubSearch {
    queries: Mutex<Vec<String>>,
    response: SearchResponse,
}

impl StubSearch {
    pub fn new(response: SearchResponse) -> Arc<Self> {
        Arc::new(Self {
            queries: Mutex::new(Vec::new()),
            response,
        })
    }

    pub fn answering(answer: &str) -> Arc<Self> {
        Self::new(SearchResponse {
            answer: answer.into(),
            hits: Vec::new(),
            error: None,
        })
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(&self, query: &SearchQuery) -> SearchResponse {
        self.queries.lock().unwrap().push(query.query.clone());
        self.response.clone()
    }
}
