//! Media server integration.
//!
//! This module provides the authenticating HTTP client for the media server
//! and the `MediaLibrary` abstraction the sync engine paginates through.

mod auth;
mod client;
mod types;

pub use auth::{AuthSession, AuthStrategy, ClientIdentity};
pub use client::MediaServerClient;
pub use types::{ItemPage, LibraryView, RawItem};

use async_trait::async_trait;
use thiserror::Error;

use crate::config::MediaServerClientConfig;
use crate::settings::MediaServerSettings;

/// Errors that can occur when talking to the media server.
#[derive(Debug, Error)]
pub enum MediaServerError {
    /// Could not reach the server.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// No handshake strategy succeeded.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// An authorized request was rejected with 401.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Connection settings unusable.
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Paginated read access to the media server library.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Enumerate top-level library groupings with their item counts.
    async fn list_libraries(&self) -> Result<Vec<LibraryView>, MediaServerError>;

    /// Fetch up to `page_size` items of a library starting at `offset`.
    ///
    /// An empty page is a valid result, not an error.
    async fn get_page(
        &self,
        library_id: &str,
        offset: u64,
        page_size: u32,
    ) -> Result<ItemPage, MediaServerError>;
}

/// An authenticated library handle plus the handshake that produced it.
pub struct ConnectedLibrary {
    pub session: AuthSession,
    pub library: Box<dyn MediaLibrary>,
}

/// Builds an authenticated `MediaLibrary` from connection settings.
///
/// One connection is made per sync invocation.
#[async_trait]
pub trait LibraryConnector: Send + Sync {
    async fn connect(
        &self,
        settings: &MediaServerSettings,
    ) -> Result<ConnectedLibrary, MediaServerError>;
}

/// Connector producing HTTP clients for a real media server.
pub struct HttpLibraryConnector {
    config: MediaServerClientConfig,
    item_types: Vec<String>,
}

impl HttpLibraryConnector {
    pub fn new(config: MediaServerClientConfig, item_types: Vec<String>) -> Self {
        Self { config, item_types }
    }
}

#[async_trait]
impl LibraryConnector for HttpLibraryConnector {
    async fn connect(
        &self,
        settings: &MediaServerSettings,
    ) -> Result<ConnectedLibrary, MediaServerError> {
        let client = MediaServerClient::new(settings, &self.config, self.item_types.clone())?;
        let session = client.authenticate().await?;
        Ok(ConnectedLibrary {
            session,
            library: Box::new(client),
        })
    }
}
