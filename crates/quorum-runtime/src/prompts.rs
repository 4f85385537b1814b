//! Prompt builders.
//!
//! Pure functions from discussion state to prompt text — no side effects,
//! fully substitutable. The speaking discipline baked into these prompts
//! is what threads turns together: every lens-aware speech must open by
//! engaging the previous speaker and close with a pointed question for
//! the next one.

use quorum_core::lens::Lens;

// ─────────────────────────────────────────────────────────────────────────────
// System prompts
// ─────────────────────────────────────────────────────────────────────────────

/// Default moderator persona: a provocateur, not a referee.
pub const MODERATOR_SYSTEM_PROMPT: &str = "\
You are the PROVOCATIVE MODERATOR of a panel of AI discussants.

Core attitude:
- You are not a neutral referee; you are the catalyst of the discussion
- Your job is to make sparks fly, not to keep the peace
- When views converge too neatly, manufacture disagreement
- When views diverge, push them into direct confrontation

Duties:
1. Opening: frame the topic as a challenge and hint at likely fault lines
2. Interim summaries:
   - early rounds: surface contradictions, call out conflicts, build tension
   - late rounds: converge, integrate positions, prepare for a conclusion
3. Watch the lens distribution: note which angle of thinking is still missing
   - lenses are assigned randomly by the system; you cannot choose them
   - all five lenses appear once before any repeats

Output rules:
1. Be punchy; skip the pleasantries
2. Keep interim summaries to 2-3 sentences
3. Naming names is allowed: \"Alice's optimism ignores the risk Bob raised\"";

/// Neutral moderator persona, kept as a fallback.
pub const MODERATOR_NEUTRAL_SYSTEM_PROMPT: &str = "\
You are the moderator of a panel of AI discussants. Your duties:

1. Opening: introduce the topic and set the frame of the discussion
2. Interim summaries: after each speech, briefly capture its key points
3. Final summary: synthesize all views into a conclusion

Stay neutral and professional, and make sure every panelist gets heard.

Output rules:
1. Be concise; no filler.
2. Keep interim summaries to 2-3 sentences.";

/// Default panelist persona, used when no custom persona is configured
/// and no lens is in play.
pub const PANELIST_DEFAULT_SYSTEM_PROMPT: &str = "\
You are a member of a panel of AI discussants.

During the discussion:
1. Offer your own view and reasoning on the topic
2. Engage with the other speakers: agree, extend, or push back
3. Stay professional and constructive

Output rules:
1. Be extremely concise: open with the point itself, no greetings and no
   closing pleasantries.
2. Prefer bullet points for your core claims.
3. Keep each speech within the token budget you are given.";

/// Compose the moderator system prompt, prepending an optional custom
/// persona.
#[must_use]
pub fn moderator_system_prompt(custom: &str) -> String {
    if custom.is_empty() {
        MODERATOR_SYSTEM_PROMPT.to_owned()
    } else {
        format!("{custom}\n\n{MODERATOR_SYSTEM_PROMPT}")
    }
}

/// System prompt for a lens-wearing panelist: the lens stance plus the
/// reference-and-question discipline.
#[must_use]
pub fn lens_system_prompt(lens: Lens) -> String {
    let profile = lens.profile();
    format!(
        "You are a member of a panel of AI discussants.\n\n\
        {}\n\n\
        Mandatory discipline:\n\
        1. CITE: open by engaging the previous speaker's concrete argument\n\
        2. ASK: close with one challenging question for the next speaker\n\
        3. NO PLEASANTRIES: never say \"thank you\", \"well said\", \"I agree\" as filler\n\
        4. CUT IN: your first sentence is already the argument\n\n\
        Shape of the speech (no headings, flow naturally):\n\
        1. Response to the previous speaker (1-2 sentences)\n\
        2. Your {} view (the body)\n\
        3. The challenge question for the next speaker (ending in \"?\")",
        profile.instruction, profile.label
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Moderator prompts
// ─────────────────────────────────────────────────────────────────────────────

/// Opening remarks prompt.
#[must_use]
pub fn opening_prompt(topic: &str, names: &[String]) -> String {
    format!(
        "Open the discussion on the following topic:\n\n\
        **Topic**: {topic}\n\n\
        **Panelists**: {}\n\n\
        Please:\n\
        1. Briefly introduce today's topic\n\
        2. Set the frame and expectations for the discussion",
        names.join(", ")
    )
}

/// Speaker-arbitration prompt: pick the next speaker from the remaining
/// candidates.
#[must_use]
pub fn select_speaker_prompt(
    topic: &str,
    history_summary: &str,
    remaining: &[String],
    current_round: u32,
    total_rounds: u32,
) -> String {
    format!(
        "As the moderator, choose the next speaker.\n\n\
        **Topic**: {topic}\n\
        **Round**: {current_round} of {total_rounds}\n\
        **Panelists yet to speak**: {}\n\n\
        **Discussion so far**:\n{history_summary}\n\n\
        Pick the panelist best placed to speak next given the discussion.\n\
        Reply with the name only, for example: Alice\n\n\
        Choice:",
        remaining.join(", ")
    )
}

/// Interim summary style, a deterministic function of the round index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummaryStyle {
    /// Escalate: surface conflict, challenge blind spots.
    Provocative,
    /// Integrate: converge on consensus and open questions.
    Convergent,
}

impl SummaryStyle {
    /// Provocative for the first two rounds, convergent afterward. Not
    /// content-adaptive.
    #[must_use]
    pub fn for_round(current_round: u32) -> Self {
        if current_round <= 2 {
            Self::Provocative
        } else {
            Self::Convergent
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            Self::Provocative => {
                "Style for this round: ESCALATE\n\
                - point out where the views collide\n\
                - question positions that agree too readily\n\
                - challenge the speaker's blind spots\n\
                - foreshadow the confrontation to come"
            }
            Self::Convergent => {
                "Style for this round: INTEGRATE\n\
                - capture the consensus and the remaining splits\n\
                - steer the discussion toward a conclusion\n\
                - name the questions still unresolved\n\
                - prepare the ground for the final summary"
            }
        }
    }
}

/// After-speech summary prompt.
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn after_speech_prompt(
    topic: &str,
    speaker_name: &str,
    speaker_lens_label: &str,
    speaker_content: &str,
    previous_summary: &str,
    current_round: u32,
    total_rounds: u32,
    lens_distribution: &str,
) -> String {
    let mut prompt = String::new();
    if !previous_summary.is_empty() {
        prompt.push_str(&format!("**Running summary so far**:\n{previous_summary}\n\n"));
    }
    if !lens_distribution.is_empty() {
        prompt.push_str(&format!("**Lens distribution**: {lens_distribution}\n\n"));
    }
    prompt.push_str(&format!(
        "**{speaker_name}** ({speaker_lens_label} lens) has just finished speaking.\n\n\
        **Topic**: {topic}\n\
        **Round**: {current_round} of {total_rounds}\n\n\
        **{speaker_name}'s speech**:\n{speaker_content}\n\n\
        {}\n\n\
        As the moderator, give a 2-3 sentence interim summary:\n\
        1. {speaker_name}'s core claim\n\
        2. How it clashes with or echoes the other speakers\n\
        3. A hint or challenge for the next speaker",
        SummaryStyle::for_round(current_round).instruction()
    ));
    prompt
}

/// Final synthesis prompt. Invites the model to verify claims with the
/// search tool.
#[must_use]
pub fn final_summary_prompt(topic: &str, formatted_history: &str) -> String {
    format!(
        "The discussion has ended; produce the final summary.\n\n\
        **Topic**: {topic}\n\n\
        **Full discussion**:\n{formatted_history}\n\n\
        Provide:\n\
        1. **Core conclusions**: the main findings across all views\n\
        2. **Consensus**: where the panel agreed\n\
        3. **Open disagreements**: where views still differ (if any)\n\
        4. **Recommendations**: suggested next steps from the discussion\n\n\
        If any claim needs verification, you may use the search tool.\n\
        Keep the summary comprehensive and balanced across all speakers."
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Panelist prompts
// ─────────────────────────────────────────────────────────────────────────────

/// Lens-aware speech prompt.
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn speak_prompt(
    topic: &str,
    speaker_name: &str,
    lens: Lens,
    previous_speaker: &str,
    previous_content: &str,
    previous_question: &str,
    running_summary: &str,
    is_first: bool,
) -> String {
    let profile = lens.profile();
    let mut prompt = format!(
        "**Topic**: {topic}\n\n\
        **Your lens**: {} {} ({})\n\n---\n\n",
        profile.emoji, profile.label, profile.summary
    );

    if is_first {
        prompt.push_str(&format!(
            "You are {speaker_name}, speaking through the {} lens.\n\n\
            The discussion is just beginning; you are the first speaker.\n\n\
            Through the {} lens:\n\
            1. Lay out your initial position on the topic\n\
            2. Close with one pointed question for the next speaker\n\n\
            Remember: cut straight in, no filler.",
            profile.label, profile.label
        ));
        return prompt;
    }

    if !previous_speaker.is_empty() && !previous_content.is_empty() {
        prompt.push_str(&format!(
            "**{previous_speaker}'s speech**:\n{previous_content}\n\n"
        ));
        if !previous_question.is_empty() {
            prompt.push_str(&format!(
                "**{previous_speaker}'s question to you**:\n\"{previous_question}\"\n\n---\n\n"
            ));
        }
    }

    if !running_summary.is_empty() {
        prompt.push_str(&format!(
            "**Running summary of the discussion**:\n{running_summary}\n\n---\n\n"
        ));
    }

    prompt.push_str(&format!(
        "You are {speaker_name}, speaking through the {} lens.\n\n\
        Speak through the {} lens:\n\
        1. First respond to {previous_speaker}'s argument (or answer their question)\n\
        2. Make your {} case\n\
        3. Close with one pointed question for the next speaker\n\n\
        Remember: cut straight in, no filler.",
        profile.label, profile.label, profile.label
    ));
    prompt
}

/// Free-form speech prompt, used when no lens is supplied.
#[must_use]
pub fn legacy_speak_prompt(
    topic: &str,
    speaker_name: &str,
    history: &str,
    persona: &str,
) -> String {
    let base = format!(
        "**Topic**: {topic}\n\n\
        **Discussion so far**:\n{history}\n\n---\n\n\
        You are {speaker_name}; it is your turn to speak.\n\n\
        Give your view on the topic and the discussion so far."
    );

    if persona.is_empty() {
        base
    } else {
        format!("**Your persona**: {persona}\n\n{base}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
