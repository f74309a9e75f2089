//! Catalog store that fails every operation.

use std::collections::HashSet;

use crate::catalog::{
    CatalogEntry, CatalogError, CatalogItem, CatalogSearchQuery, CatalogStats, CatalogStore,
};

/// Catalog whose every call returns a database error.
///
/// Used to exercise the upsert failure path and the degraded availability
/// lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingCatalog;

fn unavailable() -> CatalogError {
    CatalogError::Database("catalog unavailable".to_string())
}

impl CatalogStore for FailingCatalog {
    fn upsert_batch(&self, _items: &[CatalogItem]) -> Result<usize, CatalogError> {
        Err(unavailable())
    }

    fn get(&self, _external_item_id: &str) -> Result<CatalogEntry, CatalogError> {
        Err(unavailable())
    }

    fn search(&self, _query: &CatalogSearchQuery) -> Result<Vec<CatalogEntry>, CatalogError> {
        Err(unavailable())
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        Err(unavailable())
    }

    fn present_metadata_ids(&self, _metadata_ids: &[i64]) -> Result<HashSet<i64>, CatalogError> {
        Err(unavailable())
    }
}
