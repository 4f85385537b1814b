//! # quorum-core
//!
//! Foundation types for the Quorum discussion engine.
//!
//! This crate provides the shared vocabulary that the other Quorum crates
//! depend on:
//!
//! - **Branded IDs**: [`ids::SessionId`] as a newtype for type safety
//! - **Lenses**: the five rhetorical lenses and the constrained-random
//!   [`lens::LensAssigner`]
//! - **Transcript**: append-only [`transcript::Message`] records and the
//!   closing-question extraction used to thread turns together
//! - **Events**: transient [`events::SessionEvent`] records consumed by a
//!   presentation layer
//! - **Retry**: [`retry::RetryConfig`] and backoff math shared by the
//!   chat client
//! - **Errors**: [`errors::ConfigError`] raised before a session starts

#![deny(unsafe_code)]

pub mod errors;
pub mod events;
pub mod ids;
pub mod lens;
pub mod retry;
pub mod transcript;
