//! Rhetorical lenses and the constrained-random lens allocator.
//!
//! Every speaking turn is taken through exactly one of five lenses — a
//! rhetorical stance the panelist adopts for that turn. The
//! [`LensAssigner`] rotates lenses so that all five appear once before any
//! repeats, with one constraint: the very first utterance of a session may
//! only draw from the subset that needs no prior content to push against.

use rand::Rng;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Lens
// ─────────────────────────────────────────────────────────────────────────────

/// One of the five rhetorical lenses a speaker adopts for a single turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Lens {
    /// Neutral evidence: facts, data, what is known and what is missing.
    Facts,
    /// Intuition and emotional reaction, stated without justification.
    Feeling,
    /// Risks, weaknesses, and worst cases — the devil's advocate.
    Critique,
    /// Benefits, opportunities, and reasons the idea can work.
    Upside,
    /// Lateral alternatives and unconventional reframings.
    Invention,
}

impl Lens {
    /// All five lenses, in canonical order.
    pub const ALL: [Self; 5] = [
        Self::Facts,
        Self::Feeling,
        Self::Critique,
        Self::Upside,
        Self::Invention,
    ];

    /// Lenses a session-opening speaker may draw. Critique-style lenses are
    /// excluded because there is nothing to push against yet.
    pub const FIRST_SPEAKER: [Self; 2] = [Self::Facts, Self::Invention];

    /// Static descriptor for this lens.
    #[must_use]
    pub fn profile(self) -> &'static LensProfile {
        &PROFILES[self.index()]
    }

    /// Position of this lens in [`Lens::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Facts => 0,
            Self::Feeling => 1,
            Self::Critique => 2,
            Self::Upside => 3,
            Self::Invention => 4,
        }
    }

    /// Stable tag string, identical to the serde representation.
    #[must_use]
    pub fn tag(self) -> &'static str {
        self.profile().key
    }
}

/// Display metadata and prompt instruction for one lens.
#[derive(Debug)]
pub struct LensProfile {
    /// Stable key (serde representation).
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Emoji shown next to the speaker name.
    pub emoji: &'static str,
    /// One-line summary of the stance.
    pub summary: &'static str,
    /// Stance text injected into the speaker's system prompt.
    pub instruction: &'static str,
}

static PROFILES: [LensProfile; 5] = [
    LensProfile {
        key: "facts",
        label: "Facts",
        emoji: "📊",
        summary: "evidence and data",
        instruction: "You are speaking through the FACTS lens.\n\n\
            Your mode of thinking:\n\
            - State only objective facts, figures, and information\n\
            - Keep personal judgment and emotion out of it\n\
            - Point out what is known and what still needs to be known\n\
            - Cite concrete sources or numbers where you have them\n\n\
            Tone: calm and objective, like a scientist or a reporter.",
    },
    LensProfile {
        key: "feeling",
        label: "Feeling",
        emoji: "❤️",
        summary: "intuition and emotion",
        instruction: "You are speaking through the FEELING lens.\n\n\
            Your mode of thinking:\n\
            - Voice gut reactions, emotions, and hunches\n\
            - You do not need to explain or rationalize what you feel\n\
            - Say things like \"my instinct is...\" or \"this makes me uneasy...\"\n\
            - Being subjective and emotional is allowed here\n\n\
            Tone: direct and candid about likes and dislikes.",
    },
    LensProfile {
        key: "critique",
        label: "Critique",
        emoji: "⚔️",
        summary: "risk and weakness",
        instruction: "You are speaking through the CRITIQUE lens.\n\n\
            Your mode of thinking:\n\
            - Point out weaknesses, risks, and potential failures\n\
            - Raise the worst-case scenario\n\
            - Question feasibility and hunt for logical gaps\n\
            - Play the devil's advocate\n\n\
            Tone: sharp and skeptical, like a strict auditor.",
    },
    LensProfile {
        key: "upside",
        label: "Upside",
        emoji: "☀️",
        summary: "value and opportunity",
        instruction: "You are speaking through the UPSIDE lens.\n\n\
            Your mode of thinking:\n\
            - Emphasize benefits, opportunities, and positive possibilities\n\
            - Find the reasons this can succeed\n\
            - Paint the best realistic outcome\n\
            - Defend the idea and surface its value\n\n\
            Tone: optimistic and encouraging, like an enthusiastic backer.",
    },
    LensProfile {
        key: "invention",
        label: "Invention",
        emoji: "💡",
        summary: "alternatives and reframings",
        instruction: "You are speaking through the INVENTION lens.\n\n\
            Your mode of thinking:\n\
            - Offer novel, unconventional ideas\n\
            - Step outside the current frame\n\
            - Ask \"what if we approached it from...\" or \"why not try...\"\n\
            - Ignore existing constraints and explore freely\n\n\
            Tone: open and curious, like a creative director.",
    },
];

// ─────────────────────────────────────────────────────────────────────────────
// LensAssigner
// ─────────────────────────────────────────────────────────────────────────────

/// Stateful constrained-random allocator of lenses to speakers.
///
/// Maintains a pool of remaining lenses, refilled whenever exhausted, so
/// that all five lenses are assigned exactly once per pool cycle. A refill
/// mid-session can make the same lens reappear sooner than a strict
/// round-robin would — the distribution stays roughly uniform per
/// five-turn window.
///
/// Only the random draw is nondeterministic; the refill and exhaustion
/// policy is deterministic.
#[derive(Clone, Debug)]
pub struct LensAssigner {
    remaining: Vec<Lens>,
    usage: [u32; 5],
}

impl LensAssigner {
    /// Create a fresh allocator with a full pool and zero usage counts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            remaining: Lens::ALL.to_vec(),
            usage: [0; 5],
        }
    }

    /// Draw the next lens uniformly at random from the eligible pool.
    ///
    /// When `is_first` is set, candidates are restricted to the
    /// intersection of the remaining pool with [`Lens::FIRST_SPEAKER`]; if
    /// that intersection is empty the pool is refilled first, so a valid
    /// first lens is always available.
    pub fn assign_next<R: Rng + ?Sized>(&mut self, rng: &mut R, is_first: bool) -> Lens {
        if self.remaining.is_empty() {
            self.refill();
        }

        let mut candidates: Vec<Lens> = if is_first {
            self.first_speaker_candidates()
        } else {
            self.remaining.clone()
        };
        if candidates.is_empty() {
            // Only reachable on a first draw whose pool holds no opening
            // lens — force a refill and recompute.
            self.refill();
            candidates = self.first_speaker_candidates();
        }

        let selected = candidates[rng.random_range(0..candidates.len())];
        self.remaining.retain(|l| *l != selected);
        self.usage[selected.index()] += 1;
        selected
    }

    /// Lenses that have never been assigned.
    #[must_use]
    pub fn unused(&self) -> Vec<Lens> {
        Lens::ALL
            .into_iter()
            .filter(|l| self.usage[l.index()] == 0)
            .collect()
    }

    /// Lenses still in the current pool cycle.
    #[must_use]
    pub fn remaining(&self) -> &[Lens] {
        &self.remaining
    }

    /// Per-lens usage counts, formatted for moderator prompts.
    #[must_use]
    pub fn distribution_summary(&self) -> String {
        Lens::ALL
            .into_iter()
            .map(|l| {
                let profile = l.profile();
                format!("{} {}: {}", profile.emoji, profile.label, self.usage[l.index()])
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Reset usage counts and refill the pool — indistinguishable from a
    /// fresh allocator.
    pub fn reset(&mut self) {
        self.remaining = Lens::ALL.to_vec();
        self.usage = [0; 5];
    }

    fn refill(&mut self) {
        self.remaining = Lens::ALL.to_vec();
    }

    fn first_speaker_candidates(&self) -> Vec<Lens> {
        self.remaining
            .iter()
            .copied()
            .filter(|l| Lens::FIRST_SPEAKER.contains(l))
            .collect()
    }
}

impl Default for LensAssigner {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
