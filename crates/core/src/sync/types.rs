//! Invocation contract of the sync engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::media_server::{LibraryView, MediaServerError};
use crate::settings::SettingsError;

use super::SyncCheckpoint;

/// Inbound request: `{}` enumerates libraries, `{libraryId, offset}` syncs a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl SyncRequest {
    pub fn enumerate() -> Self {
        Self::default()
    }

    pub fn page(library_id: impl Into<String>, offset: u64) -> Self {
        Self {
            library_id: Some(library_id.into()),
            offset: Some(offset),
        }
    }
}

/// One library in the enumerate response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSummary {
    pub id: String,
    pub name: String,
    pub total_items: u64,
}

impl From<LibraryView> for ViewSummary {
    fn from(view: LibraryView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            total_items: view.total_item_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewsResponse {
    pub views: Vec<ViewSummary>,
}

/// Page sync response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSyncResponse {
    pub items_processed: usize,
    pub next_start_index: u64,
    pub is_view_done: bool,
}

/// Either response shape, serialized without a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SyncResponse {
    Views(ViewsResponse),
    Page(PageSyncResponse),
}

/// Everything one page invocation did.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOutcome {
    pub checkpoint: SyncCheckpoint,
    /// Raw items returned by the media server.
    pub fetched: usize,
    /// Rows written to the catalog.
    pub upserted: usize,
    pub excluded: usize,
    pub skipped: usize,
}

impl From<&PageOutcome> for PageSyncResponse {
    fn from(outcome: &PageOutcome) -> Self {
        Self {
            items_processed: outcome.upserted,
            next_start_index: outcome.checkpoint.offset,
            is_view_done: outcome.checkpoint.done,
        }
    }
}

/// Sync failures, by the stage that failed.
///
/// Every variant aborts the invocation. A failed page can be retried at the
/// same offset because catalog writes are idempotent.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid sync request: {0}")]
    InvalidRequest(String),

    #[error("Media server settings unavailable: {0}")]
    Settings(#[from] SettingsError),

    #[error("Could not connect to media server: {0}")]
    Auth(#[source] MediaServerError),

    #[error("{context}: {source}")]
    Fetch {
        context: String,
        #[source]
        source: MediaServerError,
    },

    #[error("Failed to write catalog batch for library {library_id} at offset {offset}: {source}")]
    Upsert {
        library_id: String,
        offset: u64,
        #[source]
        source: CatalogError,
    },
}

impl SyncError {
    /// Stage label for logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            SyncError::InvalidRequest(_) => "request",
            SyncError::Settings(_) => "settings",
            SyncError::Auth(_) => "auth",
            SyncError::Fetch { .. } => "fetch",
            SyncError::Upsert { .. } => "upsert",
        }
    }
}
