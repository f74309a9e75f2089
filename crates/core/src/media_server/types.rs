//! Media server wire types and the library/page shapes handed to the sync engine.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// A top-level library grouping ("view") on the media server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryView {
    pub id: String,
    pub name: String,
    /// Items of the configured types in this library.
    pub total_item_count: u64,
}

/// One page of raw items from a library.
#[derive(Debug, Clone, Default)]
pub struct ItemPage {
    pub items: Vec<RawItem>,
    /// Total items in the library as reported alongside this page, when the
    /// server reported one.
    pub total_count: Option<u64>,
}

/// A raw library item, as returned by the items endpoint.
///
/// Every field is optional on the wire; the normalizer decides what a usable
/// item looks like.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Source type, e.g. "Movie" or "Series".
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// ISO-8601 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premiere_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_year: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_rating: Option<f64>,
    /// Cross-reference ids keyed by provider name ("Tmdb", "Imdb", ...).
    #[serde(default, deserialize_with = "null_as_default")]
    pub provider_ids: HashMap<String, String>,
    /// Image tags keyed by image type ("Primary", "Logo", ...).
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_tags: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub backdrop_image_tags: Vec<String>,
}

/// Treat an explicit JSON `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Response envelopes (crate-private)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ItemsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<RawItem>,
    #[serde(default)]
    pub total_record_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ViewsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<RawView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawView {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SessionResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<RawAccount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawAccount {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub policy: Option<RawPolicy>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawPolicy {
    #[serde(default)]
    pub is_administrator: bool,
}

impl RawAccount {
    pub(crate) fn is_administrator(&self) -> bool {
        self.policy.as_ref().is_some_and(|p| p.is_administrator)
    }
}
