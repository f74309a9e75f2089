//! Conversion of raw media server items into catalog records.

use tracing::debug;

use crate::catalog::{CatalogItem, MediaType};
use crate::media_server::RawItem;

/// Case-insensitive title deny-list.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    needles: Vec<String>,
}

impl ExclusionFilter {
    pub fn new<I, S>(substrings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let needles = substrings
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { needles }
    }

    /// Whether `title` contains any deny-listed substring.
    pub fn excludes(&self, title: &str) -> bool {
        if self.needles.is_empty() {
            return false;
        }
        let title = title.to_lowercase();
        self.needles.iter().any(|needle| title.contains(needle.as_str()))
    }
}

/// Result of normalizing one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    /// Records ready for upsert, in page order.
    pub items: Vec<CatalogItem>,
    /// Dropped by the deny-list.
    pub excluded: usize,
    /// Dropped for lacking an id or a title.
    pub skipped: usize,
}

/// Normalize a single raw item.
///
/// Returns `None` when the item has no id or no non-blank title; such an item
/// can be neither keyed nor matched.
pub fn normalize_item(raw: &RawItem) -> Option<CatalogItem> {
    let id = raw.id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    let title = raw.name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;

    let media_type = match raw.item_type.as_deref() {
        Some("Series") => MediaType::Tv,
        _ => MediaType::Movie,
    };

    let poster_ref = raw
        .image_tags
        .get("Primary")
        .filter(|tag| !tag.is_empty())
        .map(|tag| format!("/Items/{}/Images/Primary?tag={}", id, tag));
    let backdrop_ref = raw
        .backdrop_image_tags
        .first()
        .filter(|tag| !tag.is_empty())
        .map(|tag| format!("/Items/{}/Images/Backdrop/0?tag={}", id, tag));

    Some(CatalogItem {
        external_item_id: id.to_string(),
        media_type,
        title: title.to_string(),
        overview: raw.overview.clone().unwrap_or_default(),
        poster_ref,
        backdrop_ref,
        release_date: release_date(raw),
        external_metadata_id: provider_id(raw, "Tmdb")
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|id| *id > 0),
        secondary_metadata_id: provider_id(raw, "Imdb").map(str::to_string),
        genres: raw.genres.clone(),
        rating: raw.community_rating,
    })
}

/// Normalize a page, applying the deny-list.
pub fn normalize_page(raw_items: &[RawItem], filter: &ExclusionFilter) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for raw in raw_items {
        let Some(item) = normalize_item(raw) else {
            debug!(id = ?raw.id, "Skipping item without id or title");
            batch.skipped += 1;
            continue;
        };

        if filter.excludes(&item.title) {
            debug!(id = %item.external_item_id, title = %item.title, "Excluded by title deny-list");
            batch.excluded += 1;
            continue;
        }

        batch.items.push(item);
    }

    batch
}

/// Provider id by case-insensitive key; blank values count as absent.
fn provider_id<'a>(raw: &'a RawItem, provider: &str) -> Option<&'a str> {
    raw.provider_ids
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(provider))
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

fn release_date(raw: &RawItem) -> Option<String> {
    if let Some(premiere) = raw.premiere_date.as_deref() {
        let date = premiere.split('T').next().unwrap_or_default();
        if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok() {
            return Some(date.to_string());
        }
    }
    raw.production_year
        .filter(|year| *year > 0)
        .map(|year| format!("{:04}-01-01", year))
}
