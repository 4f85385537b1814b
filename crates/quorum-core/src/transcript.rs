//! Transcript messages for the discussion history.
//!
//! History is append-only for the lifetime of a run: a [`Message`] is
//! created when a turn completes, owned by the session history, and never
//! mutated afterwards. A failed turn produces no entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lens::Lens;

// ─────────────────────────────────────────────────────────────────────────────
// Message
// ─────────────────────────────────────────────────────────────────────────────

/// Who produced a transcript entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerRole {
    /// The moderator.
    Moderator,
    /// A discussion panelist.
    Panelist,
}

/// What kind of transcript entry this is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Moderator framing remarks at the start of a session.
    Opening,
    /// One panelist's complete utterance for one scheduled slot.
    Speech,
    /// Moderator summary following a speech.
    RoundSummary,
    /// Moderator synthesis closing the session.
    FinalSummary,
}

/// One immutable entry in the discussion history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Entry kind.
    pub kind: MessageKind,
    /// Producer role.
    pub role: SpeakerRole,
    /// Display name of the speaker.
    pub speaker_name: String,
    /// Full text of the entry.
    pub content: String,
    /// Model that produced the content (empty for moderator entries
    /// where the session does not track it).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model_id: String,
    /// Lens the speaker adopted, for speech entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lens: Option<Lens>,
    /// Source links attached to search-backed entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create an opening entry.
    #[must_use]
    pub fn opening(speaker_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(MessageKind::Opening, SpeakerRole::Moderator, speaker_name, content)
    }

    /// Create a speech entry tagged with the lens the panelist adopted.
    #[must_use]
    pub fn speech(
        speaker_name: impl Into<String>,
        content: impl Into<String>,
        model_id: impl Into<String>,
        lens: Lens,
    ) -> Self {
        let mut msg = Self::new(MessageKind::Speech, SpeakerRole::Panelist, speaker_name, content);
        msg.model_id = model_id.into();
        msg.lens = Some(lens);
        msg
    }

    /// Create an after-speech summary entry.
    #[must_use]
    pub fn round_summary(speaker_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(
            MessageKind::RoundSummary,
            SpeakerRole::Moderator,
            speaker_name,
            content,
        )
    }

    /// Create a final synthesis entry.
    #[must_use]
    pub fn final_summary(speaker_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(
            MessageKind::FinalSummary,
            SpeakerRole::Moderator,
            speaker_name,
            content,
        )
    }

    /// Attach source links to this entry.
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// Returns `true` for speech entries.
    #[must_use]
    pub fn is_speech(&self) -> bool {
        self.kind == MessageKind::Speech
    }

    fn new(
        kind: MessageKind,
        role: SpeakerRole,
        speaker_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            role,
            speaker_name: speaker_name.into(),
            content: content.into(),
            model_id: String::new(),
            lens: None,
            sources: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// The most recent speech entry in the history, if any.
#[must_use]
pub fn last_speech(history: &[Message]) -> Option<&Message> {
    history.iter().rev().find(|m| m.is_speech())
}

// ─────────────────────────────────────────────────────────────────────────────
// Closing-question extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Extract the closing rhetorical question from a speech.
///
/// Scans for sentences terminated by either question-mark glyph (`?` or
/// `？`), takes the last qualifying sentence, and returns its last
/// non-empty line. Returns `None` when the content holds no question.
#[must_use]
pub fn extract_closing_question(content: &str) -> Option<String> {
    let mut questions: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in content.chars() {
        current.push(ch);
        if ch == '?' || ch == '？' {
            let sentence = current.trim();
            if !sentence.is_empty() {
                questions.push(sentence.to_owned());
            }
            current.clear();
        }
    }

    let last = questions.pop()?;
    last.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_owned)
}

// ─────────────────────────────────────────────────────────────────────────────
// History formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Default entry count for [`summarize_recent`].
pub const RECENT_HISTORY_WINDOW: usize = 5;

/// Character budget for per-entry previews in [`summarize_recent`].
const PREVIEW_CHARS: usize = 100;

/// Format the full history for the final-summary prompt.
#[must_use]
pub fn format_history(history: &[Message]) -> String {
    let mut lines = Vec::with_capacity(history.len());
    for msg in history {
        match msg.kind {
            MessageKind::Opening => {
                lines.push(format!("**Moderator opening**:\n{}\n", msg.content));
            }
            MessageKind::Speech => {
                lines.push(format!("**{}**:\n{}\n", msg.speaker_name, msg.content));
            }
            MessageKind::RoundSummary => {
                lines.push(format!("**Interim summary**:\n{}\n", msg.content));
            }
            MessageKind::FinalSummary => {}
        }
    }
    lines.join("\n")
}

/// Short rolling summary of the most recent entries, used when asking the
/// moderator to arbitrate the next speaker.
#[must_use]
pub fn summarize_recent(history: &[Message], window: usize) -> String {
    let start = history.len().saturating_sub(window);
    let lines: Vec<String> = history[start..]
        .iter()
        .filter(|m| !m.speaker_name.is_empty())
        .map(|m| format!("- {}: {}", m.speaker_name, preview(&m.content)))
        .collect();

    if lines.is_empty() {
        "The discussion has just begun.".to_owned()
    } else {
        lines.join("\n")
    }
}

/// Truncate to the preview budget on a character boundary.
fn preview(content: &str) -> String {
    let mut iter = content.char_indices();
    match iter.nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &content[..idx]),
        None => content.to_owned(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
