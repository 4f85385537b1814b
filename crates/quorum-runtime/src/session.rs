//! The session orchestrator.
//!
//! A finite-state machine driving the full discussion lifecycle:
//!
//! ```text
//! Idle → Running → (Summarizing) → Finished
//!         └─ on unrecoverable error → Idle
//! ```
//!
//! The run is a single logical thread of control: one provider call in
//! flight at a time, state mutation only between suspension points.
//! External stop / summarize-now requests are idempotent boolean flags
//! written from any context and read only at checkpoints — after the
//! opening, after each full turn's stream completes, and after each
//! summary. An in-flight turn always runs to completion or terminal
//! failure first.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use quorum_core::errors::ConfigError;
use quorum_core::events::{EventKind, SessionEvent};
use quorum_core::ids::SessionId;
use quorum_core::lens::LensAssigner;
use quorum_core::transcript::{Message, extract_closing_question, last_speech};
use quorum_llm::ChatClient;
use quorum_search::SearchProvider;

use crate::config::SessionConfig;
use crate::errors::SessionError;
use crate::emitter::EventEmitter;
use crate::moderator::{AfterSpeechRequest, Moderator};
use crate::panelist::{Panelist, SpeakRequest};

// ─────────────────────────────────────────────────────────────────────────────
// State and signals
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Not running (initial state, and the state after a fatal abort).
    Idle,
    /// Turns are being taken.
    Running,
    /// The final synthesis is being produced.
    Summarizing,
    /// The run completed.
    Finished,
}

/// Cloneable handle for raising cooperative signals on a running session.
///
/// Both flags are idempotent and may be written from any context; the
/// orchestrator reads them only at checkpoints. Stop and summarize-now
/// share checkpoint granularity and both converge on the final summary,
/// making them observably identical today — both are kept so intent is
/// recorded.
#[derive(Clone, Debug, Default)]
pub struct SessionSignals {
    inner: Arc<SignalFlags>,
}

#[derive(Debug, Default)]
struct SignalFlags {
    stop: AtomicBool,
    summarize: AtomicBool,
}

impl SessionSignals {
    /// Request that the session stop at the next checkpoint.
    pub fn request_stop(&self) {
        self.inner.stop.store(true, Ordering::SeqCst);
    }

    /// Request that the session skip ahead to the final summary at the
    /// next checkpoint.
    pub fn request_summary(&self) {
        self.inner.summarize.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.inner.stop.load(Ordering::SeqCst)
    }

    /// Whether an early summary has been requested.
    #[must_use]
    pub fn summary_requested(&self) -> bool {
        self.inner.summarize.load(Ordering::SeqCst)
    }

    fn interrupted(&self) -> bool {
        self.stop_requested() || self.summary_requested()
    }

    fn reset(&self) {
        self.inner.stop.store(false, Ordering::SeqCst);
        self.inner.summarize.store(false, Ordering::SeqCst);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Speaking order
// ─────────────────────────────────────────────────────────────────────────────

/// Build the full speaking order eagerly: one fresh uniformly-random
/// permutation of the panelist set per round, concatenated.
///
/// Adjacent repeats across a round boundary are permitted — the same
/// panelist may close one round and open the next.
#[must_use]
pub fn build_speaking_order<R: Rng + ?Sized>(
    names: &[String],
    rounds: u32,
    rng: &mut R,
) -> Vec<String> {
    let mut order = Vec::with_capacity(names.len() * rounds as usize);
    for _ in 0..rounds {
        let mut round: Vec<String> = names.to_vec();
        round.shuffle(rng);
        order.extend(round);
    }
    order
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// One discussion session: configuration, collaborators, and run state.
pub struct Session {
    id: SessionId,
    config: SessionConfig,
    moderator: Moderator,
    panelists: Vec<Panelist>,
    state: SessionState,
    history: Vec<Message>,
    signals: SessionSignals,
    assigner: LensAssigner,
    rng: StdRng,
    turn_count: u32,
    running_summary: String,
}

impl Session {
    /// Build a session, rejecting invalid configuration up front.
    ///
    /// Validation failures leave nothing constructed and no state
    /// mutated.
    pub fn new(
        config: SessionConfig,
        client: Arc<ChatClient>,
        search: Arc<dyn SearchProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let moderator = Moderator::new(config.moderator.clone(), Arc::clone(&client), search);
        let panelists: Vec<Panelist> = config
            .panelists
            .iter()
            .filter(|p| p.enabled)
            .map(|p| Panelist::new(p.clone(), Arc::clone(&client)))
            .collect();
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        Ok(Self {
            id: SessionId::new(),
            config,
            moderator,
            panelists,
            state: SessionState::Idle,
            history: Vec::new(),
            signals: SessionSignals::default(),
            assigner: LensAssigner::new(),
            rng,
            turn_count: 0,
            running_summary: String::new(),
        })
    }

    /// Session ID.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The append-only discussion history.
    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Handle for raising stop / summarize-now signals from another
    /// context.
    #[must_use]
    pub fn signals(&self) -> SessionSignals {
        self.signals.clone()
    }

    /// Display names of the enabled panelists, in configuration order.
    #[must_use]
    pub fn panelist_names(&self) -> Vec<String> {
        self.panelists
            .iter()
            .map(|p| p.display_name().to_owned())
            .collect()
    }

    /// Run the session to completion, emitting presentation events.
    ///
    /// Any failure escaping turn-level containment aborts the run: one
    /// diagnostic event is emitted, events already emitted are not rolled
    /// back, and the state reverts to [`SessionState::Idle`].
    #[instrument(skip_all, fields(session_id = %self.id, topic = %self.config.topic))]
    pub async fn run(&mut self, emitter: &EventEmitter) {
        if let Err(err) = self.run_inner(emitter).await {
            error!(error = %err, category = err.category(), "session aborted");
            emitter.emit(SessionEvent::system(format!("session error: {err}")));
            self.state = SessionState::Idle;
        }
    }

    async fn run_inner(&mut self, emitter: &EventEmitter) -> Result<(), SessionError> {
        // 1. Enter Running and reset per-run state.
        self.state = SessionState::Running;
        self.signals.reset();
        self.assigner.reset();
        self.turn_count = 0;
        self.running_summary.clear();
        info!(panelists = self.panelists.len(), rounds = self.config.total_rounds, "session started");
        emitter.emit(SessionEvent::system("discussion started"));

        // 2. Moderator opening.
        self.moderator_opening(emitter).await?;
        if self.signals.interrupted() {
            return self.final_summary(emitter).await;
        }

        // 3. Build the full speaking order eagerly.
        let names = self.panelist_names();
        let per_round = names.len();
        let total_turns = per_round * self.config.total_rounds as usize;
        let order = build_speaking_order(&names, self.config.total_rounds, &mut self.rng);
        debug!(?order, "speaking order built");

        // 4–6. Take turns, checking signals only at checkpoints.
        for (index, name) in order.iter().enumerate() {
            if self.signals.interrupted() {
                break;
            }
            #[allow(clippy::cast_possible_truncation)]
            let round = (index / per_round) as u32 + 1;

            let succeeded = self.panelist_turn(name, emitter).await;

            if self.signals.interrupted() {
                break;
            }
            if succeeded && index < total_turns - 1 {
                self.after_speech(round, emitter).await?;
            }
        }

        // 7. Always close with the final summary.
        self.final_summary(emitter).await
    }

    async fn moderator_opening(&mut self, emitter: &EventEmitter) -> Result<(), SessionError> {
        let mod_name = self.moderator.display_name().to_owned();
        emitter.emit(SessionEvent::streaming(EventKind::Moderator, &mod_name, "", 0));

        let mut stream = self.moderator.opening(
            &self.config.topic,
            &self.panelist_names(),
            self.config.max_tokens,
            self.config.moderator_retries,
        );

        let mut content = String::new();
        while let Some(item) = stream.next().await {
            let fragment = item?;
            content.push_str(&fragment);
            emitter.emit(SessionEvent::streaming(
                EventKind::Moderator,
                &mod_name,
                fragment,
                0,
            ));
        }

        self.history.push(Message::opening(&mod_name, &content));
        emitter.emit(SessionEvent::finished(EventKind::Moderator, &mod_name, content, 0));
        Ok(())
    }

    fn previous_speaker_info(&self) -> (String, String, String) {
        match last_speech(&self.history) {
            Some(msg) => {
                let question = extract_closing_question(&msg.content).unwrap_or_default();
                (msg.speaker_name.clone(), msg.content.clone(), question)
            }
            None => (String::new(), String::new(), String::new()),
        }
    }

    /// Take one panelist turn. Returns whether the turn succeeded.
    ///
    /// A terminal provider failure is contained here: the turn is
    /// abandoned with no history entry, one warning event fires, and the
    /// run continues with the next scheduled speaker.
    async fn panelist_turn(&mut self, name: &str, emitter: &EventEmitter) -> bool {
        self.turn_count += 1;
        let turn = self.turn_count;
        let is_first = turn == 1;

        let lens = self.assigner.assign_next(&mut self.rng, is_first);
        let profile = lens.profile();
        let (previous_speaker, previous_content, previous_question) = self.previous_speaker_info();

        emitter.emit(
            SessionEvent::system(format!(
                "{name} {} takes the floor (turn {turn}, {} lens)",
                profile.emoji, profile.label
            ))
            .with_turn(turn)
            .with_lens(profile.key),
        );
        emitter.emit(
            SessionEvent::streaming(EventKind::Member, name, "", turn).with_lens(profile.key),
        );

        let Some(panelist) = self.panelists.iter().find(|p| p.display_name() == name) else {
            warn!(name, "scheduled speaker is not on the panel, skipping");
            return false;
        };
        let model_id = panelist.model_id().to_owned();

        let request = SpeakRequest {
            topic: self.config.topic.clone(),
            lens: Some(lens),
            previous_speaker,
            previous_content,
            previous_question,
            running_summary: self.running_summary.clone(),
            is_first,
            max_tokens: self.config.max_tokens,
            max_retries: self.config.panelist_retries,
        };
        let mut stream = panelist.speak(&request);

        let mut content = String::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => {
                    content.push_str(&fragment);
                    emitter.emit(
                        SessionEvent::streaming(EventKind::Member, name, fragment, turn)
                            .with_lens(profile.key),
                    );
                }
                Err(err) => {
                    warn!(name, turn, error = %err, category = err.category(), "turn abandoned");
                    emitter.emit(
                        SessionEvent::system(format!(
                            "⚠️ {name} failed to speak and was skipped: {err}"
                        ))
                        .with_turn(turn),
                    );
                    return false;
                }
            }
        }

        self.history
            .push(Message::speech(name, &content, model_id, lens));
        emitter.emit(
            SessionEvent::finished(EventKind::Member, name, content, turn).with_lens(profile.key),
        );
        true
    }

    async fn after_speech(&mut self, round: u32, emitter: &EventEmitter) -> Result<(), SessionError> {
        let Some(last) = last_speech(&self.history) else {
            return Ok(());
        };
        let request = AfterSpeechRequest {
            topic: self.config.topic.clone(),
            speaker_name: last.speaker_name.clone(),
            speaker_content: last.content.clone(),
            speaker_lens: last.lens,
            previous_summary: self.running_summary.clone(),
            current_round: round,
            total_rounds: self.config.total_rounds,
            lens_distribution: self.assigner.distribution_summary(),
            max_tokens: self.config.max_tokens,
            max_retries: self.config.moderator_retries,
        };

        let mod_name = self.moderator.display_name().to_owned();
        emitter.emit(SessionEvent::streaming(EventKind::Moderator, &mod_name, "", 0));

        let mut stream = self.moderator.after_speech_summary(&request);
        let mut content = String::new();
        while let Some(item) = stream.next().await {
            let fragment = item?;
            content.push_str(&fragment);
            emitter.emit(SessionEvent::streaming(
                EventKind::Moderator,
                &mod_name,
                fragment,
                0,
            ));
        }

        self.running_summary.clone_from(&content);
        self.history.push(Message::round_summary(&mod_name, &content));
        emitter.emit(SessionEvent::finished(EventKind::Moderator, &mod_name, content, 0));
        Ok(())
    }

    async fn final_summary(&mut self, emitter: &EventEmitter) -> Result<(), SessionError> {
        self.state = SessionState::Summarizing;
        let mod_name = self.moderator.display_name().to_owned();
        let summary_name = format!("{mod_name} (synthesis)");

        emitter.emit(SessionEvent::system("moving to the final summary"));
        emitter.emit(SessionEvent::streaming(
            EventKind::Moderator,
            &summary_name,
            "",
            0,
        ));

        let mut stream = self.moderator.final_summary(
            &self.config.topic,
            &self.history,
            self.config.summary_max_tokens,
            self.config.moderator_retries,
        );

        let mut content = String::new();
        while let Some(item) = stream.next().await {
            let fragment = item?;
            content.push_str(&fragment);
            emitter.emit(SessionEvent::streaming(
                EventKind::Moderator,
                &summary_name,
                fragment,
                0,
            ));
        }

        self.history.push(Message::final_summary(&mod_name, &content));
        emitter.emit(SessionEvent::finished(
            EventKind::Moderator,
            &summary_name,
            content,
            0,
        ));
        self.state = SessionState::Finished;
        info!(entries = self.history.len(), "session finished");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
