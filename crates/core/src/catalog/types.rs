//! Types for the local catalog.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Catalog media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            other => Err(CatalogError::Internal(format!(
                "Unknown media type: {}",
                other
            ))),
        }
    }
}

/// A normalized catalog record, as produced by the normalizer and written by
/// the upserter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Stable item id from the media server (unique merge key).
    pub external_item_id: String,
    pub media_type: MediaType,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    /// Relative poster image reference on the media server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_ref: Option<String>,
    /// Relative backdrop image reference on the media server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_ref: Option<String>,
    /// Release date (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// TMDB id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_metadata_id: Option<i64>,
    /// IMDb id (e.g. `tt0133093`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_metadata_id: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// A catalog row as read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub item: CatalogItem,
    /// When the row was last written by a sync pass.
    pub synced_at: DateTime<Utc>,
}

/// Query for searching the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSearchQuery {
    /// Matched against the title; empty lists everything.
    #[serde(default)]
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    /// Maximum results.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for CatalogSearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            media_type: None,
            limit: default_limit(),
        }
    }
}

fn default_limit() -> u32 {
    100
}

/// Catalog statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_items: u64,
    pub movies: u64,
    pub series: u64,
    /// Rows carrying an `external_metadata_id`.
    pub with_metadata_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
