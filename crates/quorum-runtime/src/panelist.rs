//! Discussion panelists.

use std::sync::Arc;

use quorum_core::lens::Lens;
use quorum_llm::types::{ChatMessage, ChatRequest};
use quorum_llm::{ChatClient, TokenStream};

use crate::config::PanelistConfig;
use crate::prompts;

/// Parameters for one speaking turn.
#[derive(Clone, Debug)]
pub struct SpeakRequest {
    /// Discussion topic.
    pub topic: String,
    /// Lens assigned for this turn; `None` selects the free-form prompt.
    pub lens: Option<Lens>,
    /// Previous speaker's display name (empty on the first turn).
    pub previous_speaker: String,
    /// Previous speaker's full speech.
    pub previous_content: String,
    /// Closing question extracted from the previous speech.
    pub previous_question: String,
    /// Latest moderator summary.
    pub running_summary: String,
    /// Whether this is the session's first speech.
    pub is_first: bool,
    /// Token budget for the speech.
    pub max_tokens: u32,
    /// Retry budget for the call.
    pub max_retries: u32,
}

/// Per-turn binding of an identity and persona to the chat client.
///
/// Carries no retry logic of its own — resilience is entirely the
/// client's concern.
pub struct Panelist {
    config: PanelistConfig,
    client: Arc<ChatClient>,
}

impl Panelist {
    /// Create a panelist.
    #[must_use]
    pub fn new(config: PanelistConfig, client: Arc<ChatClient>) -> Self {
        Self { config, client }
    }

    /// Model this panelist speaks with.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.config.model_id
    }

    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.config.display_name
    }

    /// Produce this turn's speech as a lazy fragment stream.
    ///
    /// With a lens, the lens-aware prompt pair is used (mandatory
    /// reference to the previous speaker, mandatory closing question);
    /// without one, the legacy free-form prompt.
    #[must_use]
    pub fn speak(&self, request: &SpeakRequest) -> TokenStream {
        let (system_prompt, user_prompt) = if let Some(lens) = request.lens {
            (
                prompts::lens_system_prompt(lens),
                prompts::speak_prompt(
                    &request.topic,
                    &self.config.display_name,
                    lens,
                    &request.previous_speaker,
                    &request.previous_content,
                    &request.previous_question,
                    &request.running_summary,
                    request.is_first,
                ),
            )
        } else {
            let system = if self.config.system_prompt.is_empty() {
                prompts::PANELIST_DEFAULT_SYSTEM_PROMPT.to_owned()
            } else {
                self.config.system_prompt.clone()
            };
            (
                system,
                prompts::legacy_speak_prompt(
                    &request.topic,
                    &self.config.display_name,
                    &request.previous_content,
                    &self.config.system_prompt,
                ),
            )
        };

        let chat_request = ChatRequest::new(
            &self.config.model_id,
            vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_prompt),
            ],
        )
        .with_max_tokens(request.max_tokens);

        self.client.stream_chat(chat_request, request.max_retries, None)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingProvider, test_client};
    use futures::StreamExt;
    use quorum_llm::types::ChatRole;

    fn speak_request(lens: Option<Lens>) -> SpeakRequest {
        SpeakRequest {
            topic: "Can software be finished?".into(),
            lens,
            previous_speaker: "Alice".into(),
            previous_content: "It can.".into(),
            previous_question: "Can it really?".into(),
            running_summary: "Alice says yes.".into(),
            is_first: false,
            max_tokens: 300,
            max_retries: 1,
        }
    }

    fn panelist(provider: &Arc<RecordingProvider>) -> Panelist {
        Panelist::new(
            PanelistConfig::new("b/model", "Bob"),
            Arc::new(test_client(Arc::clone(provider))),
        )
    }

    #[tokio::test]
    async fn speak_streams_fragments() {
        let provider = RecordingProvider::streaming(vec!["A ", "view?"]);
        let p = panelist(&provider);

        let fragments: Vec<String> = p
            .speak(&speak_request(Some(Lens::Facts)))
            .map(Result::unwrap)
            .collect()
            .await;
        assert_eq!(fragments, vec!["A ", "view?"]);
    }

    #[tokio::test]
    async fn lens_request_uses_lens_prompts() {
        let provider = RecordingProvider::streaming(vec!["x"]);
        let p = panelist(&provider);

        let _: Vec<_> = p.speak(&speak_request(Some(Lens::Critique))).collect().await;

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.model, "b/model");
        assert_eq!(req.max_tokens, 300);
        assert_eq!(req.messages[0].role, ChatRole::System);
        assert!(req.messages[0].content.contains("CRITIQUE lens"));
        assert!(req.messages[1].content.contains("\"Can it really?\""));
        assert!(req.messages[1].content.contains("Alice says yes."));
    }

    #[tokio::test]
    async fn no_lens_uses_legacy_prompt_and_persona() {
        let provider = RecordingProvider::streaming(vec!["x"]);
        let mut config = PanelistConfig::new("b/model", "Bob");
        config.system_prompt = "You are terse.".into();
        let p = Panelist::new(config, Arc::new(test_client(Arc::clone(&provider))));

        let _: Vec<_> = p.speak(&speak_request(None)).collect().await;

        let requests = provider.requests();
        let req = &requests[0];
        assert_eq!(req.messages[0].content, "You are terse.");
        assert!(req.messages[1].content.contains("**Your persona**: You are terse."));
        assert!(req.messages[1].content.contains("You are Bob"));
    }

    #[tokio::test]
    async fn no_lens_without_persona_uses_default_system_prompt() {
        let provider = RecordingProvider::streaming(vec!["x"]);
        let p = panelist(&provider);

        let _: Vec<_> = p.speak(&speak_request(None)).collect().await;

        let requests = provider.requests();
        assert!(requests[0].messages[0]
            .content
            .contains("member of a panel of AI discussants"));
    }
}
