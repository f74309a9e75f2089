//! Media server connection settings.
//!
//! The connection descriptor (base address and access key) is kept in a
//! single persisted row, written by administrators and read once at the start
//! of every sync invocation.

mod sqlite;

pub use sqlite::SqliteSettingsStore;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Connection descriptor for the media server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaServerSettings {
    /// Base address, e.g. `http://media.local:8096`.
    pub url: String,
    /// Access key issued by the media server.
    pub access_key: String,
}

impl MediaServerSettings {
    pub fn new(url: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim().trim_end_matches('/').to_string(),
            access_key: access_key.into().trim().to_string(),
        }
    }

    /// Both fields are present and non-blank.
    pub fn is_complete(&self) -> bool {
        !self.url.trim().is_empty() && !self.access_key.trim().is_empty()
    }
}

// Hand-written so the access key never reaches a log line.
impl std::fmt::Debug for MediaServerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaServerSettings")
            .field("url", &self.url)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

/// Settings view safe to return from the API.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMediaServerSettings {
    pub url: String,
    pub access_key_configured: bool,
}

impl From<&MediaServerSettings> for SanitizedMediaServerSettings {
    fn from(settings: &MediaServerSettings) -> Self {
        Self {
            url: settings.url.clone(),
            access_key_configured: !settings.access_key.is_empty(),
        }
    }
}

/// Errors for settings operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Media server settings are not configured")]
    NotConfigured,

    #[error("Invalid settings: {0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Storage for the single media server settings row.
pub trait SettingsStore: Send + Sync {
    /// Load the connection descriptor.
    ///
    /// Fails with `NotConfigured` when the row is absent or incomplete.
    fn load(&self) -> Result<MediaServerSettings, SettingsError>;

    /// Replace the connection descriptor.
    fn save(&self, settings: &MediaServerSettings) -> Result<(), SettingsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let settings = MediaServerSettings::new("http://media.local:8096/ ", " key ");
        assert_eq!(settings.url, "http://media.local:8096");
        assert_eq!(settings.access_key, "key");
    }

    #[test]
    fn test_is_complete() {
        assert!(MediaServerSettings::new("http://x", "k").is_complete());
        assert!(!MediaServerSettings::new("", "k").is_complete());
        assert!(!MediaServerSettings::new("http://x", "  ").is_complete());
    }

    #[test]
    fn test_debug_redacts_access_key() {
        let settings = MediaServerSettings::new("http://x", "super-secret");
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_sanitized_settings() {
        let settings = MediaServerSettings::new("http://x", "k");
        let sanitized = SanitizedMediaServerSettings::from(&settings);
        assert_eq!(sanitized.url, "http://x");
        assert!(sanitized.access_key_configured);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("\"k\""));
    }
}
