//! Chat wire types: messages, requests, responses, and tool calls.
//!
//! [`ToolCall`] keeps arguments as the raw JSON text returned on the wire;
//! [`ToolInvocation`] is the typed union parsed from it at the boundary —
//! unknown tool names and malformed arguments are rejected there instead
//! of leaking into the orchestration layer.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ChatError;

/// Default per-reply token budget.
pub const DEFAULT_MAX_TOKENS: u32 = 500;
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Name of the single tool the moderator may call during synthesis.
pub const WEB_SEARCH_TOOL_NAME: &str = "web_search";

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Role of a chat message on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System instruction.
    System,
    /// End-user turn.
    User,
    /// Model turn.
    Assistant,
    /// Tool result turn.
    Tool,
}

/// One message in a chat-completions request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role.
    pub role: ChatRole,
    /// Text content.
    pub content: String,
    /// Tool calls attached to an assistant turn.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// ID of the tool call a tool-result turn answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(ChatRole::System, content)
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(ChatRole::User, content)
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(ChatRole::Assistant, content)
    }

    /// Create an assistant message carrying tool calls, used when echoing
    /// the model's tool request back into a follow-up request.
    #[must_use]
    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Create a tool-result message answering `tool_call_id`.
    #[must_use]
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    fn plain(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool calls
// ─────────────────────────────────────────────────────────────────────────────

/// A tool call emitted by the model, with arguments kept as raw JSON text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique tool call ID.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Raw JSON argument text as returned by the model.
    pub arguments: String,
}

/// Typed tool invocation, validated at the boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolInvocation {
    /// A web search request.
    WebSearch {
        /// Search query.
        query: String,
    },
}

impl ToolInvocation {
    /// Parse and validate a raw [`ToolCall`].
    ///
    /// Unknown tool names and malformed or incomplete arguments are
    /// rejected with [`ChatError::InvalidToolCall`].
    pub fn parse(call: &ToolCall) -> Result<Self, ChatError> {
        match call.name.as_str() {
            WEB_SEARCH_TOOL_NAME => {
                let args: serde_json::Value =
                    serde_json::from_str(&call.arguments).map_err(|e| {
                        ChatError::InvalidToolCall {
                            name: call.name.clone(),
                            message: format!("arguments are not valid JSON: {e}"),
                        }
                    })?;
                let query = args
                    .get("query")
                    .and_then(serde_json::Value::as_str)
                    .map(str::trim)
                    .filter(|q| !q.is_empty())
                    .ok_or_else(|| ChatError::InvalidToolCall {
                        name: call.name.clone(),
                        message: "missing required string argument `query`".into(),
                    })?;
                Ok(Self::WebSearch {
                    query: query.to_owned(),
                })
            }
            other => Err(ChatError::InvalidToolCall {
                name: other.to_owned(),
                message: "unknown tool".into(),
            }),
        }
    }
}

/// A tool definition offered to the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Discriminator, always `"function"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Function declaration.
    pub function: ToolFunction,
}

/// Function declaration inside a [`ToolSpec`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolFunction {
    /// Tool name.
    pub name: String,
    /// Natural-language description shown to the model.
    pub description: String,
    /// JSON schema of the arguments.
    pub parameters: serde_json::Value,
}

/// The single web-search tool definition used during final synthesis.
#[must_use]
pub fn web_search_tool() -> ToolSpec {
    ToolSpec {
        kind: "function".into(),
        function: ToolFunction {
            name: WEB_SEARCH_TOOL_NAME.into(),
            description: "Search the web for up-to-date information. Use it when you need to \
                verify a factual claim, fetch current data, or check a statement made during \
                the discussion."
                .into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search keywords; keep them precise and relevant",
                    }
                },
                "required": ["query"],
            }),
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests and responses
// ─────────────────────────────────────────────────────────────────────────────

/// Why the model stopped generating.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FinishReason {
    /// Natural end of the reply.
    Stop,
    /// Hit the output token limit.
    Length,
    /// The model requested tool calls.
    ToolCalls,
    /// Output was filtered.
    ContentFilter,
    /// Any other provider-specific reason.
    Other(String),
}

impl FinishReason {
    /// Parse the wire string.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "tool_calls" => Self::ToolCalls,
            "content_filter" => Self::ContentFilter,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// A complete (non-streamed) chat reply.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatResponse {
    /// Reply text (empty when the model only requested tools).
    pub content: String,
    /// Tool calls requested by the model.
    pub tool_calls: Vec<ToolCall>,
    /// Stop reason.
    pub finish_reason: FinishReason,
}

impl ChatResponse {
    /// Whether the model requested any tool calls.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// One chat-completions request.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    /// Model ID (e.g. `"openai/gpt-5.2"`).
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Output token budget.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Tools offered to the model (empty for plain calls).
    pub tools: Vec<ToolSpec>,
}

impl ChatRequest {
    /// Create a request with default token budget and temperature.
    #[must_use]
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            tools: Vec::new(),
        }
    }

    /// Set the output token budget.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Offer tools to the model.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
