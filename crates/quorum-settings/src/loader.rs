//! Settings loading with deep merge and environment variable overrides.
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::QuorumSettings;

/// Resolve the path to the settings file (`~/.quorum/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".quorum").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<QuorumSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<QuorumSettings> {
    let defaults = serde_json::to_value(QuorumSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: QuorumSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Each env var has strict parsing rules:
/// - Integers must be valid and within the specified range
/// - Floats must be valid and within the specified range
/// - Invalid values are silently ignored (fall back to file/default)
pub fn apply_env_overrides(settings: &mut QuorumSettings) {
    // ── API keys ────────────────────────────────────────────────────
    if let Some(v) = read_env_string("OPENROUTER_API_KEY") {
        settings.api.openrouter.api_key = v;
    }
    if let Some(v) = read_env_string("TAVILY_API_KEY") {
        settings.api.tavily.api_key = v;
    }
    if let Some(v) = read_env_string("QUORUM_OPENROUTER_BASE_URL") {
        settings.api.openrouter.base_url = v;
    }
    if let Some(v) = read_env_string("QUORUM_TAVILY_BASE_URL") {
        settings.api.tavily.base_url = v;
    }

    // ── Discussion defaults ─────────────────────────────────────────
    if let Some(v) = read_env_u32("QUORUM_MAX_TOKENS", 1, 32_000) {
        settings.defaults.max_tokens = v;
    }
    if let Some(v) = read_env_u32("QUORUM_SUMMARY_MAX_TOKENS", 1, 32_000) {
        settings.defaults.summary_max_tokens = v;
    }
    if let Some(v) = read_env_u32("QUORUM_ROUNDS", 1, 50) {
        settings.defaults.total_rounds = v;
    }
    if let Some(v) = read_env_f64("QUORUM_TEMPERATURE", 0.0, 2.0) {
        settings.defaults.temperature = v;
    }
    if let Some(v) = read_env_u32("QUORUM_MAX_RETRIES", 0, 10) {
        settings.defaults.max_retries = v;
    }
    if let Some(v) = read_env_u64("QUORUM_COOLDOWN_MS", 0, 60_000) {
        settings.defaults.cooldown_ms = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as an `f64` within a range.
pub fn parse_f64_range(val: &str, min: f64, max: f64) -> Option<f64> {
    let n: f64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_u32_range(&v, min, max))
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_u64_range(&v, min, max))
}

fn read_env_f64(name: &str, min: f64, max: f64) -> Option<f64> {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_f64_range(&v, min, max))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- deep_merge --

    #[test]
    fn merge_objects_recursively() {
        let target = json!({"a": {"x": 1, "y": 2}, "b": 3});
        let source = json!({"a": {"y": 20}});
        let merged = deep_merge(target, source);
        assert_eq!(merged, json!({"a": {"x": 1, "y": 20}, "b": 3}));
    }

    #[test]
    fn merge_replaces_arrays_and_primitives() {
        let target = json!({"list": [1, 2, 3], "n": 1});
        let source = json!({"list": [9], "n": 2});
        let merged = deep_merge(target, source);
        assert_eq!(merged, json!({"list": [9], "n": 2}));
    }

    #[test]
    fn merge_skips_nulls() {
        let target = json!({"keep": "me"});
        let source = json!({"keep": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged, json!({"keep": "me"}));
    }

    #[test]
    fn merge_adds_new_keys() {
        let target = json!({"a": 1});
        let source = json!({"b": 2});
        let merged = deep_merge(target, source);
        assert_eq!(merged, json!({"a": 1, "b": 2}));
    }

    // -- load_settings_from_path --

    #[test]
    fn missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from_path(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings.defaults.total_rounds, QuorumSettings::default().defaults.total_rounds);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"defaults": {"totalRounds": 7}, "api": {"openrouter": {"apiKey": "from-file"}}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.defaults.total_rounds, 7);
        // Untouched values keep their defaults
        assert_eq!(settings.defaults.max_tokens, 500);
        assert!(settings.api.openrouter.base_url.contains("openrouter.ai"));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_settings_from_path(&path).is_err());
    }

    // -- parse_bool --

    #[test]
    fn parse_bool_accepts_variants() {
        for v in ["true", "TRUE", "1", "yes", "on"] {
            assert_eq!(parse_bool(v), Some(true), "{v}");
        }
        for v in ["false", "0", "no", "OFF"] {
            assert_eq!(parse_bool(v), Some(false), "{v}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    // -- range parsers --

    #[test]
    fn parse_u32_range_bounds() {
        assert_eq!(parse_u32_range("5", 1, 10), Some(5));
        assert_eq!(parse_u32_range("1", 1, 10), Some(1));
        assert_eq!(parse_u32_range("10", 1, 10), Some(10));
        assert_eq!(parse_u32_range("0", 1, 10), None);
        assert_eq!(parse_u32_range("11", 1, 10), None);
        assert_eq!(parse_u32_range("abc", 1, 10), None);
    }

    #[test]
    fn parse_u64_range_bounds() {
        assert_eq!(parse_u64_range("1500", 0, 60_000), Some(1500));
        assert_eq!(parse_u64_range("60001", 0, 60_000), None);
    }

    #[test]
    fn parse_f64_range_bounds() {
        assert_eq!(parse_f64_range("0.7", 0.0, 2.0), Some(0.7));
        assert_eq!(parse_f64_range("2.0", 0.0, 2.0), Some(2.0));
        assert_eq!(parse_f64_range("2.1", 0.0, 2.0), None);
        assert_eq!(parse_f64_range("x", 0.0, 2.0), None);
    }

    #[test]
    fn settings_path_under_home() {
        let path = settings_path();
        assert!(path.ends_with(".quorum/settings.json"));
    }
}
