//! Presentation events emitted while a session runs.
//!
//! [`SessionEvent`]s are transient — never persisted — and drive real-time
//! UI updates as the discussion streams. The orchestrator is the sole
//! producer; a presentation layer consumes the ordered event sequence.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// SessionEvent
// ─────────────────────────────────────────────────────────────────────────────

/// Who an event belongs to, for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Session-level notices (turn announcements, warnings, diagnostics).
    System,
    /// Moderator output (opening, summaries, synthesis).
    Moderator,
    /// Panelist output.
    Member,
}

/// One presentation event.
///
/// Streaming output is delivered as a leading empty fragment with
/// `is_streaming`, followed by one event per text fragment, and closed by
/// an `is_final` event carrying the full accumulated text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    /// Event family.
    pub kind: EventKind,
    /// Display name of the speaker (empty for session-level notices).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub speaker_name: String,
    /// Text fragment while streaming; full text on the final event.
    pub content: String,
    /// Whether this event is part of an in-progress stream.
    #[serde(default)]
    pub is_streaming: bool,
    /// Whether this event closes a streamed block.
    #[serde(default)]
    pub is_final: bool,
    /// 1-based turn index for turn-scoped events, 0 otherwise.
    #[serde(default)]
    pub turn_index: u32,
    /// Lens tag of the speaker, when one was assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lens_tag: Option<String>,
}

impl SessionEvent {
    /// A session-level notice.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            kind: EventKind::System,
            speaker_name: String::new(),
            content: content.into(),
            is_streaming: false,
            is_final: false,
            turn_index: 0,
            lens_tag: None,
        }
    }

    /// A streamed fragment (or the leading empty fragment) of a block.
    #[must_use]
    pub fn streaming(
        kind: EventKind,
        speaker_name: impl Into<String>,
        fragment: impl Into<String>,
        turn_index: u32,
    ) -> Self {
        Self {
            kind,
            speaker_name: speaker_name.into(),
            content: fragment.into(),
            is_streaming: true,
            is_final: false,
            turn_index,
            lens_tag: None,
        }
    }

    /// The closing event of a streamed block, carrying the full text.
    #[must_use]
    pub fn finished(
        kind: EventKind,
        speaker_name: impl Into<String>,
        content: impl Into<String>,
        turn_index: u32,
    ) -> Self {
        Self {
            kind,
            speaker_name: speaker_name.into(),
            content: content.into(),
            is_streaming: false,
            is_final: true,
            turn_index,
            lens_tag: None,
        }
    }

    /// Attach a lens tag.
    #[must_use]
    pub fn with_lens(mut self, tag: impl Into<String>) -> Self {
        self.lens_tag = Some(tag.into());
        self
    }

    /// Attach a turn index.
    #[must_use]
    pub fn with_turn(mut self, turn_index: u32) -> Self {
        self.turn_index = turn_index;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
