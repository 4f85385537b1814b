//! Settings errors.

use thiserror::Error;

/// Result alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading the settings file failed.
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file held invalid JSON or an invalid shape.
    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_message() {
        let err = SettingsError::from(std::io::Error::other("denied"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn json_error_message() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SettingsError::from(parse_err);
        assert!(err.to_string().starts_with("failed to parse settings"));
    }
}
