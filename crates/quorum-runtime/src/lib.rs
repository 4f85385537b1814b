//! # quorum-runtime
//!
//! Session orchestration for the Quorum discussion engine.
//!
//! A [`session::Session`] sequences N model-backed panelists and one
//! moderator through a streaming, turn-based discussion:
//!
//! ```text
//! opening → repeat (assign lens → speak → summarize) → final summary
//! ```
//!
//! The orchestrator is a single logical thread of control — at most one
//! provider call is in flight at a time — and emits a sequence of
//! presentation events through an [`emitter::EventEmitter`]. External
//! callers raise stop / summarize-now signals on
//! [`session::SessionSignals`]; both are consulted only at defined
//! checkpoints, never preemptively mid-stream.

#![deny(unsafe_code)]

pub mod config;
pub mod emitter;
pub mod errors;
pub mod moderator;
pub mod panelist;
pub mod prompts;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ModeratorConfig, PanelistConfig, SessionConfig};
pub use emitter::EventEmitter;
pub use errors::SessionError;
pub use moderator::Moderator;
pub use panelist::Panelist;
pub use session::{Session, SessionSignals, SessionState};
