//! Settings types with serde defaults.

use serde::{Deserialize, Serialize};

use quorum_core::errors::ConfigError;

// ─────────────────────────────────────────────────────────────────────────────
// Top level
// ─────────────────────────────────────────────────────────────────────────────

/// All Quorum settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuorumSettings {
    /// External API settings.
    #[serde(default)]
    pub api: ApiSettings,
    /// Discussion defaults.
    #[serde(default)]
    pub defaults: DiscussionDefaults,
}

impl QuorumSettings {
    /// Validate that the required keys are present.
    ///
    /// Returns one [`ConfigError::MissingSetting`] per missing key. The
    /// OpenRouter key is mandatory; the Tavily key is required for
    /// search-backed synthesis.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.api.openrouter.api_key.is_empty() {
            errors.push(ConfigError::MissingSetting("OPENROUTER_API_KEY".into()));
        }
        if self.api.tavily.api_key.is_empty() {
            errors.push(ConfigError::MissingSetting("TAVILY_API_KEY".into()));
        }
        errors
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API settings
// ─────────────────────────────────────────────────────────────────────────────

/// External API settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSettings {
    /// OpenRouter (chat completions).
    #[serde(default)]
    pub openrouter: OpenRouterSettings,
    /// Tavily (web search).
    #[serde(default)]
    pub tavily: TavilySettings,
}

/// OpenRouter settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRouterSettings {
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// API root URL.
    #[serde(default = "default_openrouter_base_url")]
    pub base_url: String,
}

fn default_openrouter_base_url() -> String {
    "https://openrouter.ai/api/v1".to_owned()
}

impl Default for OpenRouterSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openrouter_base_url(),
        }
    }
}

/// Tavily settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TavilySettings {
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// API root URL.
    #[serde(default = "default_tavily_base_url")]
    pub base_url: String,
}

fn default_tavily_base_url() -> String {
    "https://api.tavily.com".to_owned()
}

impl Default for TavilySettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_tavily_base_url(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Discussion defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Defaults applied when a session does not override them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionDefaults {
    /// Per-reply token budget.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Token budget for the final synthesis.
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,
    /// Number of rounds.
    #[serde(default = "default_total_rounds")]
    pub total_rounds: u32,
    /// Sampling temperature for speeches and summaries.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Low temperature used for speaker arbitration.
    #[serde(default = "default_select_temperature")]
    pub select_temperature: f64,
    /// Retry budget for panelist calls.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Retry budget for moderator calls.
    #[serde(default = "default_moderator_retries")]
    pub moderator_retries: u32,
    /// Post-call cooldown in milliseconds.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

fn default_max_tokens() -> u32 {
    500
}
fn default_summary_max_tokens() -> u32 {
    1000
}
fn default_total_rounds() -> u32 {
    3
}
fn default_temperature() -> f64 {
    0.7
}
fn default_select_temperature() -> f64 {
    0.3
}
fn default_max_retries() -> u32 {
    2
}
fn default_moderator_retries() -> u32 {
    5
}
fn default_cooldown_ms() -> u64 {
    1500
}

impl Default for DiscussionDefaults {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            summary_max_tokens: default_summary_max_tokens(),
            total_rounds: default_total_rounds(),
            temperature: default_temperature(),
            select_temperature: default_select_temperature(),
            max_retries: default_max_retries(),
            moderator_retries: default_moderator_retries(),
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
