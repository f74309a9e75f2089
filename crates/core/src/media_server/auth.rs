//! Authorization context for media server requests.
//!
//! Two handshakes exist. The keyed session exchanges the access key for a
//! session token and then sends a composite `MediaBrowser` header carrying
//! both. The direct token fallback uses the access key as a bearer credential
//! and picks an operating account from the account list. Whichever succeeds
//! first is kept for the lifetime of the client.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::MediaServerClientConfig;

/// Which handshake established the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStrategy {
    /// Access key exchanged for a session token.
    KeyedSession,
    /// Access key used directly as a bearer token.
    DirectToken,
}

impl AuthStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStrategy::KeyedSession => "keyed_session",
            AuthStrategy::DirectToken => "direct_token",
        }
    }
}

/// Outcome of a successful handshake, safe to expose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSession {
    pub strategy: AuthStrategy,
    /// Account whose library views are enumerated.
    pub account_id: String,
}

/// How this process identifies itself in the composite header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub client: String,
    pub device: String,
    pub device_id: String,
    pub version: String,
}

impl ClientIdentity {
    pub fn from_config(config: &MediaServerClientConfig) -> Self {
        let device_id = config
            .device_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| derive_device_id(&config.client_name, &config.device_name));

        Self {
            client: config.client_name.clone(),
            device: config.device_name.clone(),
            device_id,
            version: config.client_version.clone(),
        }
    }
}

/// Stable device id so the media server sees one device across restarts.
fn derive_device_id(client_name: &str, device_name: &str) -> String {
    let digest = Sha256::digest(format!("{}:{}", client_name, device_name).as_bytes());
    format!("{:x}", digest)[..32].to_string()
}

/// Credentials in use for the current client.
#[derive(Clone)]
pub(crate) struct AuthContext {
    pub strategy: AuthStrategy,
    pub account_id: String,
    pub session_token: Option<String>,
}

impl AuthContext {
    pub(crate) fn keyed_session(session_token: String, account_id: String) -> Self {
        Self {
            strategy: AuthStrategy::KeyedSession,
            account_id,
            session_token: Some(session_token),
        }
    }

    pub(crate) fn direct_token(account_id: String) -> Self {
        Self {
            strategy: AuthStrategy::DirectToken,
            account_id,
            session_token: None,
        }
    }

    pub(crate) fn session(&self) -> AuthSession {
        AuthSession {
            strategy: self.strategy,
            account_id: self.account_id.clone(),
        }
    }

    /// `Authorization` header value for data requests.
    pub(crate) fn authorization_header(&self, identity: &ClientIdentity, access_key: &str) -> String {
        match (self.strategy, &self.session_token) {
            (AuthStrategy::KeyedSession, Some(token)) => {
                composite_header(identity, access_key, Some(token))
            }
            _ => bearer_header(access_key),
        }
    }
}

// Hand-written so tokens never reach a log line.
impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("strategy", &self.strategy)
            .field("account_id", &self.account_id)
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// `MediaBrowser` header; the token part is only present once a session exists.
pub(crate) fn composite_header(
    identity: &ClientIdentity,
    access_key: &str,
    session_token: Option<&str>,
) -> String {
    let mut header = format!(
        "MediaBrowser Client=\"{}\", Device=\"{}\", DeviceId=\"{}\", Version=\"{}\", ApiKey=\"{}\"",
        quote_safe(&identity.client),
        quote_safe(&identity.device),
        quote_safe(&identity.device_id),
        quote_safe(&identity.version),
        access_key
    );
    if let Some(token) = session_token {
        header.push_str(&format!(", Token=\"{}\"", token));
    }
    header
}

pub(crate) fn bearer_header(access_key: &str) -> String {
    format!("Bearer {}", access_key)
}

fn quote_safe(value: &str) -> String {
    value.replace('"', "'")
}
