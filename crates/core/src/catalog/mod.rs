//! Local catalog - a mirror of the media server library.
//!
//! Rows are keyed by the media server's item id and fully overwritten on every
//! sync pass that observes the item. Search, schedules and trending features
//! read from here instead of querying the media server.

mod sqlite;
mod types;

pub use sqlite::SqliteCatalog;
pub use types::*;

use std::collections::HashSet;

/// Trait for catalog storage.
pub trait CatalogStore: Send + Sync {
    /// Merge a batch of normalized items into the catalog.
    ///
    /// `external_item_id` is the conflict key; every column of an existing row
    /// is overwritten with the incoming values. The batch is applied in a
    /// single transaction: either every row is written or none is.
    ///
    /// Returns the number of rows written.
    fn upsert_batch(&self, items: &[CatalogItem]) -> Result<usize, CatalogError>;

    /// Get a specific item by its media server id.
    fn get(&self, external_item_id: &str) -> Result<CatalogEntry, CatalogError>;

    /// Search the catalog by title.
    fn search(&self, query: &CatalogSearchQuery) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Get catalog statistics.
    fn stats(&self) -> Result<CatalogStats, CatalogError>;

    /// Return the subset of `metadata_ids` that appear as `external_metadata_id`
    /// on at least one catalog row.
    fn present_metadata_ids(&self, metadata_ids: &[i64]) -> Result<HashSet<i64>, CatalogError>;
}
