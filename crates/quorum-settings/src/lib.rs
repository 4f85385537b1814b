//! # quorum-settings
//!
//! Settings for the Quorum discussion engine.
//!
//! Loading flow:
//! 1. Start with compiled [`types::QuorumSettings::default()`]
//! 2. If `~/.quorum/settings.json` exists, deep-merge user values over
//!    the defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! The [`catalog`] module carries the default model catalog and the
//! anonymized speaker-name pools.

#![deny(unsafe_code)]

pub mod catalog;
pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{load_settings, load_settings_from_path, settings_path};
pub use types::{ApiSettings, DiscussionDefaults, QuorumSettings};
