//! The discussion moderator.
//!
//! Opens the session, arbitrates speaker selection, summarizes after each
//! speech, and closes with a synthesis that may consult the search
//! collaborator through a single tool round-trip.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, info, warn};

use quorum_core::lens::Lens;
use quorum_core::transcript::{Message, RECENT_HISTORY_WINDOW, format_history, summarize_recent};
use quorum_llm::types::{ChatMessage, ChatRequest, ToolInvocation, web_search_tool};
use quorum_llm::{ChatClient, ChatResult, TokenStream};
use quorum_search::types::format_for_model;
use quorum_search::{SearchProvider, SearchQuery};

use crate::config::ModeratorConfig;
use crate::prompts;

/// Token budget for speaker arbitration — the reply is just a name.
const SELECT_MAX_TOKENS: u32 = 50;
/// Low temperature for speaker arbitration, for a more deterministic pick.
const SELECT_TEMPERATURE: f64 = 0.3;

/// Parameters for one after-speech summary.
#[derive(Clone, Debug)]
pub struct AfterSpeechRequest {
    /// Discussion topic.
    pub topic: String,
    /// Who just spoke.
    pub speaker_name: String,
    /// Their full speech.
    pub speaker_content: String,
    /// The lens they wore.
    pub speaker_lens: Option<Lens>,
    /// The previous running summary.
    pub previous_summary: String,
    /// Current round (1-based).
    pub current_round: u32,
    /// Configured round count.
    pub total_rounds: u32,
    /// Lens usage counts, for the moderator's awareness.
    pub lens_distribution: String,
    /// Token budget.
    pub max_tokens: u32,
    /// Retry budget.
    pub max_retries: u32,
}

/// The moderator: framing, arbitration, summaries, synthesis.
pub struct Moderator {
    config: ModeratorConfig,
    client: Arc<ChatClient>,
    search: Arc<dyn SearchProvider>,
}

impl Moderator {
    /// Create a moderator.
    #[must_use]
    pub fn new(
        config: ModeratorConfig,
        client: Arc<ChatClient>,
        search: Arc<dyn SearchProvider>,
    ) -> Self {
        Self {
            config,
            client,
            search,
        }
    }

    /// Model the moderator speaks with.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.config.model_id
    }

    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.config.display_name
    }

    fn system_prompt(&self) -> String {
        prompts::moderator_system_prompt(&self.config.system_prompt)
    }

    /// Stream the opening remarks.
    #[must_use]
    pub fn opening(
        &self,
        topic: &str,
        names: &[String],
        max_tokens: u32,
        max_retries: u32,
    ) -> TokenStream {
        let request = ChatRequest::new(
            &self.config.model_id,
            vec![
                ChatMessage::system(self.system_prompt()),
                ChatMessage::user(prompts::opening_prompt(topic, names)),
            ],
        )
        .with_max_tokens(max_tokens);

        self.client.stream_chat(request, max_retries, None)
    }

    /// Arbitrate the next speaker among the remaining candidates.
    ///
    /// The model's reply is validated by case-insensitive substring match
    /// in both directions against each candidate; when nothing matches,
    /// the first remaining candidate is returned so a malformed answer
    /// never stalls the session.
    pub async fn select_next_speaker(
        &self,
        topic: &str,
        history: &[Message],
        remaining: &[String],
        current_round: u32,
        total_rounds: u32,
        max_retries: u32,
    ) -> ChatResult<String> {
        if remaining.is_empty() {
            return Ok(String::new());
        }

        let summary = summarize_recent(history, RECENT_HISTORY_WINDOW);
        let request = ChatRequest::new(
            &self.config.model_id,
            vec![
                ChatMessage::system(self.system_prompt()),
                ChatMessage::user(prompts::select_speaker_prompt(
                    topic,
                    &summary,
                    remaining,
                    current_round,
                    total_rounds,
                )),
            ],
        )
        .with_max_tokens(SELECT_MAX_TOKENS)
        .with_temperature(SELECT_TEMPERATURE);

        let response = self.client.chat(request, max_retries).await?;
        let selected = response.content.trim().to_lowercase();

        for candidate in remaining {
            let candidate_lower = candidate.to_lowercase();
            if selected.contains(&candidate_lower) || candidate_lower.contains(&selected) {
                debug!(candidate = %candidate, "moderator selected next speaker");
                return Ok(candidate.clone());
            }
        }

        warn!(reply = %response.content, "unrecognized speaker pick, falling back");
        Ok(remaining[0].clone())
    }

    /// Stream the after-speech summary. Style is a deterministic function
    /// of the round index, not of the content.
    #[must_use]
    pub fn after_speech_summary(&self, request: &AfterSpeechRequest) -> TokenStream {
        let lens_label = request
            .speaker_lens
            .map_or("open", |l| l.profile().label);
        let chat_request = ChatRequest::new(
            &self.config.model_id,
            vec![
                ChatMessage::system(self.system_prompt()),
                ChatMessage::user(prompts::after_speech_prompt(
                    &request.topic,
                    &request.speaker_name,
                    lens_label,
                    &request.speaker_content,
                    &request.previous_summary,
                    request.current_round,
                    request.total_rounds,
                    &request.lens_distribution,
                )),
            ],
        )
        .with_max_tokens(request.max_tokens);

        self.client.stream_chat(chat_request, request.max_retries, None)
    }

    /// Stream the final synthesis.
    ///
    /// The first call offers exactly one tool (`web_search`). When the
    /// model requests it, each valid call is dispatched synchronously to
    /// the search collaborator, the results are appended to the transient
    /// call context only, and one follow-up streaming call produces the
    /// narrative. Without a tool call the plain content is yielded
    /// directly. At most one tool round-trip ever occurs.
    #[must_use]
    pub fn final_summary(
        &self,
        topic: &str,
        history: &[Message],
        max_tokens: u32,
        max_retries: u32,
    ) -> TokenStream {
        let client = Arc::clone(&self.client);
        let search = Arc::clone(&self.search);
        let model = self.config.model_id.clone();
        let mut messages = vec![
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(prompts::final_summary_prompt(
                topic,
                &format_history(history),
            )),
        ];

        Box::pin(async_stream::stream! {
            let request = ChatRequest::new(&model, messages.clone())
                .with_max_tokens(max_tokens)
                .with_tools(vec![web_search_tool()]);

            let first = match client.chat_with_tools(request, max_retries).await {
                Ok(response) => response,
                Err(err) => {
                    yield Err(err);
                    return;
                }
            };

            let mut tool_results: Vec<(String, String)> = Vec::new();
            for call in &first.tool_calls {
                match ToolInvocation::parse(call) {
                    Ok(ToolInvocation::WebSearch { query }) => {
                        info!(query = %query, "dispatching web search");
                        let response = search.search(&SearchQuery::new(query)).await;
                        tool_results.push((call.id.clone(), format_for_model(&response)));
                    }
                    Err(err) => {
                        warn!(error = %err, "skipping invalid tool call");
                    }
                }
            }

            if tool_results.is_empty() {
                // No (valid) tool call — use the plain content directly.
                if !first.content.is_empty() {
                    yield Ok(first.content);
                }
                return;
            }

            // Append the tool exchange to the transient call context only;
            // session history never sees it.
            messages.push(ChatMessage::assistant_with_tool_calls(
                first.content.clone(),
                first.tool_calls.clone(),
            ));
            for (call_id, formatted) in tool_results {
                messages.push(ChatMessage::tool_result(call_id, formatted));
            }

            let follow_up = ChatRequest::new(&model, messages).with_max_tokens(max_tokens);
            let mut stream = client.stream_chat(follow_up, max_retries, None);
            while let Some(item) = stream.next().await {
                yield item;
            }
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
