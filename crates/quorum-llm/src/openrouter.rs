//! OpenRouter provider implementing the [`ModelProvider`] trait.
//!
//! Speaks the OpenAI-compatible chat-completions format: POST
//! `{base_url}/chat/completions` with bearer-key auth, either as a single
//! JSON response or as an SSE stream of content deltas.

use futures::StreamExt;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use async_trait::async_trait;
use quorum_core::retry::parse_retry_after_header;

use crate::error::ChatError;
use crate::provider::{ChatResult, ModelProvider, TokenStream};
use crate::sse::{SseParserOptions, parse_sse_lines};
use crate::types::{ChatMessage, ChatRequest, ChatResponse, FinishReason, ToolCall, ToolSpec};

/// Default OpenRouter API root.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// SSE parser options for the chat-completions stream.
///
/// OpenRouter terminates streams with an explicit `[DONE]` marker, so the
/// trailing buffer never holds a payload.
const SSE_OPTIONS: SseParserOptions = SseParserOptions {
    process_remaining_buffer: false,
};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for [`OpenRouterProvider`].
#[derive(Clone, Debug, Default)]
pub struct OpenRouterConfig {
    /// API key.
    pub api_key: String,
    /// Base URL override (defaults to the public API).
    pub base_url: Option<String>,
    /// Optional `HTTP-Referer` attribution header.
    pub referer: Option<String>,
    /// Optional `X-Title` attribution header.
    pub app_title: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSpec]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireToolFunction,
}

#[derive(Serialize, Deserialize)]
struct WireToolFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct WireCompletion {
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireChunk {
    choices: Vec<WireChunkChoice>,
}

#[derive(Deserialize)]
struct WireChunkChoice {
    delta: WireDelta,
}

#[derive(Deserialize)]
struct WireDelta {
    #[serde(default)]
    content: Option<String>,
}

fn wire_role(message: &ChatMessage) -> &'static str {
    match message.role {
        crate::types::ChatRole::System => "system",
        crate::types::ChatRole::User => "user",
        crate::types::ChatRole::Assistant => "assistant",
        crate::types::ChatRole::Tool => "tool",
    }
}

fn to_wire_messages(messages: &[ChatMessage]) -> Vec<WireMessage<'_>> {
    messages
        .iter()
        .map(|m| WireMessage {
            role: wire_role(m),
            content: &m.content,
            tool_calls: if m.tool_calls.is_empty() {
                None
            } else {
                Some(m.tool_calls.iter().map(to_wire_tool_call).collect())
            },
            tool_call_id: m.tool_call_id.as_deref(),
        })
        .collect()
}

fn to_wire_tool_call(tc: &ToolCall) -> WireToolCall {
    WireToolCall {
        id: tc.id.clone(),
        kind: "function".into(),
        function: WireToolFunction {
            name: tc.name.clone(),
            arguments: tc.arguments.clone(),
        },
    }
}

fn from_wire_tool_call(tc: WireToolCall) -> ToolCall {
    ToolCall {
        id: tc.id,
        name: tc.function.name,
        arguments: tc.function.arguments,
    }
}

/// Parse an API error response body.
fn parse_api_error(body: &str, status: u16) -> (String, Option<String>, bool) {
    let retryable = status == 429 || status >= 500;
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let error = &json["error"];
        let message = error["message"]
            .as_str()
            .unwrap_or("Unknown error")
            .to_string();
        let code = error["code"]
            .as_str()
            .or_else(|| error["type"].as_str())
            .map(String::from);
        (message, code, retryable)
    } else {
        (format!("HTTP {status}: {body}"), None, retryable)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────────────────────────

/// Chat provider backed by the OpenRouter API.
pub struct OpenRouterProvider {
    config: OpenRouterConfig,
    base_url: String,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    /// Create a new provider.
    #[must_use]
    pub fn new(config: OpenRouterConfig) -> Self {
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

    fn build_headers(&self) -> ChatResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", self.config.api_key);
        let _ = headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).map_err(|e| ChatError::Other {
                message: format!("invalid authorization header: {e}"),
            })?,
        );
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(referer) = self.config.referer.as_deref() {
            if let Ok(val) = HeaderValue::from_str(referer) {
                let _ = headers.insert("HTTP-Referer", val);
            }
        }
        if let Some(title) = self.config.app_title.as_deref() {
            if let Ok(val) = HeaderValue::from_str(title) {
                let _ = headers.insert("X-Title", val);
            }
        }

        Ok(headers)
    }

    async fn send(&self, request: &ChatRequest, stream: bool) -> ChatResult<reqwest::Response> {
        let wire = WireRequest {
            model: &request.model,
            messages: to_wire_messages(&request.messages),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream,
            tools: if request.tools.is_empty() {
                None
            } else {
                Some(&request.tools)
            },
            tool_choice: if request.tools.is_empty() {
                None
            } else {
                Some("auto")
            },
        };

        debug!(
            model = %request.model,
            message_count = request.messages.len(),
            tool_count = request.tools.len(),
            stream,
            "sending chat-completions request"
        );

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .headers(self.build_headers()?)
            .json(&wire)
            .send()
            .await
            .map_err(ChatError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after_header);
            let body = response.text().await.unwrap_or_default();
            let (message, code, retryable) = parse_api_error(&body, status.as_u16());

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ChatError::RateLimited {
                    retry_after_ms: retry_after.unwrap_or(0),
                    message,
                });
            }
            return Err(ChatError::Api {
                status: status.as_u16(),
                message,
                code,
                retryable,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ModelProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn complete(&self, request: &ChatRequest) -> ChatResult<ChatResponse> {
        let response = self.send(request, false).await?;
        let completion: WireCompletion = response.json().await.map_err(ChatError::Http)?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::Other {
                message: "completion carried no choices".into(),
            })?;

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls: choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(from_wire_tool_call)
                .collect(),
            finish_reason: FinishReason::parse(choice.finish_reason.as_deref().unwrap_or("stop")),
        })
    }

    async fn stream(&self, request: &ChatRequest) -> ChatResult<TokenStream> {
        let response = self.send(request, true).await?;
        let byte_stream = response.bytes_stream();
        let lines = parse_sse_lines(byte_stream, SSE_OPTIONS);

        let fragments = lines.filter_map(|line| {
            let out = match serde_json::from_str::<WireChunk>(&line) {
                Ok(chunk) => chunk
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.delta.content)
                    .filter(|content| !content.is_empty())
                    .map(Ok),
                Err(e) => {
                    warn!(error = %e, "failed to parse stream chunk");
                    None
                }
            };
            std::future::ready(out)
        });

        Ok(Box::pin(fragments))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::web_search_tool;
    use futures::StreamExt;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenRouterProvider {
        OpenRouterProvider::new(OpenRouterConfig {
            api_key: "test-key".into(),
            base_url: Some(server.uri()),
            referer: None,
            app_title: None,
        })
    }

    fn request() -> ChatRequest {
        ChatRequest::new(
            "openai/gpt-5.2",
            vec![
                ChatMessage::system("be brief"),
                ChatMessage::user("say hi"),
            ],
        )
    }

    // ── complete ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn complete_parses_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "openai/gpt-5.2",
                "stream": false,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": { "content": "hi there" },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let response = provider_for(&server).complete(&request()).await.unwrap();
        assert_eq!(response.content, "hi there");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert!(!response.has_tool_calls());
    }

    #[tokio::test]
    async fn complete_parses_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "content": null,
                        "tool_calls": [{
                            "id": "call-1",
                            "type": "function",
                            "function": {
                                "name": "web_search",
                                "arguments": "{\"query\":\"rust 2024\"}"
                            }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .mount(&server)
            .await;

        let req = request().with_tools(vec![web_search_tool()]);
        let response = provider_for(&server).complete(&req).await.unwrap();
        assert!(response.content.is_empty());
        assert_eq!(response.finish_reason, FinishReason::ToolCalls);
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "web_search");
        assert_eq!(response.tool_calls[0].arguments, "{\"query\":\"rust 2024\"}");
    }

    #[tokio::test]
    async fn complete_sends_tools_and_tool_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "tool_choice": "auto",
                "tools": [{"type": "function", "function": {"name": "web_search"}}],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "ok" }, "finish_reason": "stop" }]
            })))
            .mount(&server)
            .await;

        let req = request().with_tools(vec![web_search_tool()]);
        let response = provider_for(&server).complete(&req).await.unwrap();
        assert_eq!(response.content, "ok");
    }

    #[tokio::test]
    async fn complete_empty_choices_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let err = provider_for(&server).complete(&request()).await.unwrap_err();
        assert!(matches!(err, ChatError::Other { .. }));
    }

    // ── error mapping ────────────────────────────────────────────────

    #[tokio::test]
    async fn rate_limit_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "7")
                    .set_body_json(json!({
                        "error": { "message": "slow down", "code": "rate_limited" }
                    })),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server).complete(&request()).await.unwrap_err();
        match err {
            ChatError::RateLimited {
                retry_after_ms,
                message,
            } => {
                assert_eq!(retry_after_ms, 7000);
                assert_eq!(message, "slow down");
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_retryable_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = provider_for(&server).complete(&request()).await.unwrap_err();
        match err {
            ChatError::Api {
                status, retryable, ..
            } => {
                assert_eq!(status, 502);
                assert!(retryable);
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn client_error_is_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "bad model id", "code": "invalid_request" }
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server).complete(&request()).await.unwrap_err();
        match err {
            ChatError::Api {
                status,
                retryable,
                message,
                code,
            } => {
                assert_eq!(status, 400);
                assert!(!retryable);
                assert_eq!(message, "bad model id");
                assert_eq!(code.as_deref(), Some("invalid_request"));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    // ── stream ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn stream_yields_content_deltas() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo!\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{}}]}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({ "stream": true })))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream"),
            )
            .mount(&server)
            .await;

        let stream = provider_for(&server).stream(&request()).await.unwrap();
        let fragments: Vec<String> = stream.map(Result::unwrap).collect().await;
        assert_eq!(fragments, vec!["Hel", "lo!"]);
    }

    #[tokio::test]
    async fn stream_skips_unparseable_chunks() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: not json\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream"),
            )
            .mount(&server)
            .await;

        let stream = provider_for(&server).stream(&request()).await.unwrap();
        let fragments: Vec<String> = stream.map(Result::unwrap).collect().await;
        assert_eq!(fragments, vec!["ok"]);
    }

    #[tokio::test]
    async fn stream_propagates_http_errors_before_streaming() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = match provider_for(&server).stream(&request()).await {
            Ok(_) => panic!("expected stream to return an error"),
            Err(e) => e,
        };
        assert!(matches!(err, ChatError::Api { status: 500, .. }));
    }

    // ── wire conversion ──────────────────────────────────────────────

    #[test]
    fn wire_messages_carry_tool_plumbing() {
        let messages = vec![
            ChatMessage::assistant_with_tool_calls(
                "",
                vec![ToolCall {
                    id: "call-1".into(),
                    name: "web_search".into(),
                    arguments: "{\"query\":\"x\"}".into(),
                }],
            ),
            ChatMessage::tool_result("call-1", "results"),
        ];
        let wire = to_wire_messages(&messages);
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(json[0]["role"], "assistant");
        assert_eq!(json[0]["tool_calls"][0]["type"], "function");
        assert_eq!(json[0]["tool_calls"][0]["function"]["name"], "web_search");
        assert_eq!(json[1]["role"], "tool");
        assert_eq!(json[1]["tool_call_id"], "call-1");
        assert!(json[1].get("tool_calls").is_none());
    }

    #[test]
    fn parse_api_error_json_body() {
        let body = r#"{"error":{"message":"Internal error","type":"server_error"}}"#;
        let (msg, code, retryable) = parse_api_error(body, 500);
        assert_eq!(msg, "Internal error");
        assert_eq!(code.as_deref(), Some("server_error"));
        assert!(retryable);
    }

    #[test]
    fn parse_api_error_plain_body() {
        let (msg, code, retryable) = parse_api_error("Bad Gateway", 502);
        assert!(msg.contains("502"));
        assert!(code.is_none());
        assert!(retryable);
    }

    #[test]
    fn parse_api_error_400_not_retryable() {
        let (_, _, retryable) = parse_api_error("{}", 400);
        assert!(!retryable);
    }

    #[test]
    fn default_base_url_applied() {
        let provider = OpenRouterProvider::new(OpenRouterConfig {
            api_key: "k".into(),
            ..Default::default()
        });
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(provider.name(), "openrouter");
    }
}
