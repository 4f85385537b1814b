//! Session, panelist, and moderator configuration.

use serde::{Deserialize, Serialize};

use quorum_core::errors::ConfigError;
use quorum_settings::DiscussionDefaults;

/// Configuration for one discussion panelist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelistConfig {
    /// Model ID (e.g. `"openai/gpt-5.2"`).
    pub model_id: String,
    /// Display name (e.g. `"Alice"`).
    pub display_name: String,
    /// Custom persona, prepended to the default when present.
    #[serde(default)]
    pub system_prompt: String,
    /// Disabled panelists are skipped when the session is built.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl PanelistConfig {
    /// Create an enabled panelist with no custom persona.
    #[must_use]
    pub fn new(model_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            display_name: display_name.into(),
            system_prompt: String::new(),
            enabled: true,
        }
    }
}

/// Configuration for the moderator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeratorConfig {
    /// Model ID.
    pub model_id: String,
    /// Display name.
    pub display_name: String,
    /// Custom persona, prepended to the default when present.
    #[serde(default)]
    pub system_prompt: String,
}

impl ModeratorConfig {
    /// Create a moderator with no custom persona.
    #[must_use]
    pub fn new(model_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            display_name: display_name.into(),
            system_prompt: String::new(),
        }
    }
}

/// Immutable input for one session, built once before a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Discussion topic.
    pub topic: String,
    /// Number of rounds (one full pass through all panelists each).
    pub total_rounds: u32,
    /// Per-speech token budget.
    pub max_tokens: u32,
    /// Token budget for the final synthesis.
    pub summary_max_tokens: u32,
    /// Retry budget for panelist calls.
    pub panelist_retries: u32,
    /// Retry budget for moderator calls.
    pub moderator_retries: u32,
    /// Moderator configuration.
    pub moderator: ModeratorConfig,
    /// Panelist configurations (disabled entries are skipped).
    pub panelists: Vec<PanelistConfig>,
    /// Seed for the session RNG; random when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SessionConfig {
    /// Create a config with the compiled discussion defaults.
    #[must_use]
    pub fn new(
        topic: impl Into<String>,
        moderator: ModeratorConfig,
        panelists: Vec<PanelistConfig>,
    ) -> Self {
        Self::with_defaults(topic, moderator, panelists, &DiscussionDefaults::default())
    }

    /// Create a config from loaded settings defaults.
    #[must_use]
    pub fn with_defaults(
        topic: impl Into<String>,
        moderator: ModeratorConfig,
        panelists: Vec<PanelistConfig>,
        defaults: &DiscussionDefaults,
    ) -> Self {
        Self {
            topic: topic.into(),
            total_rounds: defaults.total_rounds,
            max_tokens: defaults.max_tokens,
            summary_max_tokens: defaults.summary_max_tokens,
            panelist_retries: defaults.max_retries,
            moderator_retries: defaults.moderator_retries,
            moderator,
            panelists,
            seed: None,
        }
    }

    /// Set the round count.
    #[must_use]
    pub fn with_rounds(mut self, total_rounds: u32) -> Self {
        self.total_rounds = total_rounds;
        self
    }

    /// Seed the session RNG for reproducible schedules and lens draws.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Display names of the enabled panelists, in configuration order.
    #[must_use]
    pub fn enabled_names(&self) -> Vec<String> {
        self.panelists
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.display_name.clone())
            .collect()
    }

    /// Reject invalid configuration before a run starts. Nothing is
    /// mutated on failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.topic.trim().is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        if self.panelists.iter().filter(|p| p.enabled).count() == 0 {
            return Err(ConfigError::NoPanelists);
        }
        if self.total_rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SessionConfig {
        SessionConfig::new(
            "Should tests be deterministic?",
            ModeratorConfig::new("mod/model", "Max"),
            vec![
                PanelistConfig::new("a/model", "Alice"),
                PanelistConfig::new("b/model", "Bob"),
            ],
        )
    }

    #[test]
    fn defaults_applied() {
        let c = config();
        assert_eq!(c.total_rounds, 3);
        assert_eq!(c.max_tokens, 500);
        assert_eq!(c.summary_max_tokens, 1000);
        assert_eq!(c.panelist_retries, 2);
        assert_eq!(c.moderator_retries, 5);
        assert!(c.seed.is_none());
    }

    #[test]
    fn with_defaults_reads_settings() {
        let defaults = DiscussionDefaults {
            total_rounds: 5,
            max_tokens: 250,
            ..DiscussionDefaults::default()
        };
        let c = SessionConfig::with_defaults(
            "t",
            ModeratorConfig::new("m", "Max"),
            vec![PanelistConfig::new("a", "Alice")],
            &defaults,
        );
        assert_eq!(c.total_rounds, 5);
        assert_eq!(c.max_tokens, 250);
    }

    #[test]
    fn enabled_names_skips_disabled() {
        let mut c = config();
        c.panelists[0].enabled = false;
        assert_eq!(c.enabled_names(), vec!["Bob".to_owned()]);
    }

    #[test]
    fn validate_ok() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn validate_empty_topic() {
        let mut c = config();
        c.topic = "   ".into();
        assert_eq!(c.validate(), Err(ConfigError::EmptyTopic));
    }

    #[test]
    fn validate_no_enabled_panelists() {
        let mut c = config();
        for p in &mut c.panelists {
            p.enabled = false;
        }
        assert_eq!(c.validate(), Err(ConfigError::NoPanelists));
    }

    #[test]
    fn validate_zero_rounds() {
        let c = config().with_rounds(0);
        assert_eq!(c.validate(), Err(ConfigError::ZeroRounds));
    }

    #[test]
    fn serde_roundtrip() {
        let c = config().with_seed(7);
        let json = serde_json::to_string(&c).unwrap();
        let back: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn panelist_enabled_defaults_true_in_serde() {
        let p: PanelistConfig =
            serde_json::from_str(r#"{"modelId": "m", "displayName": "Alice"}"#).unwrap();
        assert!(p.enabled);
        assert!(p.system_prompt.is_empty());
    }
}
