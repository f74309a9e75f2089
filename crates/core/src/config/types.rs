use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub media_server: MediaServerClientConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
///
/// The settings row and the catalog table share this file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("shelfsync.db")
}

/// Upper bound accepted for `sync.page_size`.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Library sync configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Items requested per page (one page per sync invocation).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Case-insensitive title substrings that are never written to the catalog.
    #[serde(default)]
    pub excluded_titles: Vec<String>,
    /// Source item types requested from the media server.
    #[serde(default = "default_item_types")]
    pub item_types: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            excluded_titles: Vec::new(),
            item_types: default_item_types(),
        }
    }
}

fn default_page_size() -> u32 {
    200
}

fn default_item_types() -> Vec<String> {
    vec!["Movie".to_string(), "Series".to_string()]
}

/// How this process identifies itself to the media server.
///
/// Connection details (address and access key) are not part of the file
/// configuration; they live in the settings store.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaServerClientConfig {
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    #[serde(default = "default_client_name")]
    pub client_name: String,
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// Stable device identifier. Derived from client and device name when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default = "default_client_version")]
    pub client_version: String,
}

impl Default for MediaServerClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            client_name: default_client_name(),
            device_name: default_device_name(),
            device_id: None,
            client_version: default_client_version(),
        }
    }
}

fn default_timeout() -> u32 {
    30
}

fn default_client_name() -> String {
    "shelfsync".to_string()
}

fn default_device_name() -> String {
    "shelfsync-server".to_string()
}

fn default_client_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Sanitized config for API responses
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sync: SanitizedSyncConfig,
    pub media_server: MediaServerClientConfig,
}

/// Sync config with the deny-list reduced to a count.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSyncConfig {
    pub page_size: u32,
    pub excluded_titles_count: usize,
    pub item_types: Vec<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            sync: SanitizedSyncConfig {
                page_size: config.sync.page_size,
                excluded_titles_count: config.sync.excluded_titles.len(),
                item_types: config.sync.item_types.clone(),
            },
            media_server: config.media_server.clone(),
        }
    }
}
