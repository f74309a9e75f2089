//! Availability lookups by external metadata id.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::CatalogStore;
use crate::metrics::AVAILABILITY_LOOKUPS;

/// Reports which external metadata ids are present in the catalog.
///
/// Availability only decorates other features, so a failed lookup degrades to
/// "nothing available" instead of an error.
pub struct AvailabilityResolver {
    catalog: Arc<dyn CatalogStore>,
}

impl AvailabilityResolver {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    /// Subset of `metadata_ids` present in the catalog.
    pub fn resolve(&self, metadata_ids: &HashSet<i64>) -> HashSet<i64> {
        if metadata_ids.is_empty() {
            return HashSet::new();
        }

        let ids: Vec<i64> = metadata_ids.iter().copied().collect();
        match self.catalog.present_metadata_ids(&ids) {
            Ok(found) => {
                AVAILABILITY_LOOKUPS.with_label_values(&["success"]).inc();
                debug!(requested = ids.len(), found = found.len(), "Resolved availability");
                found
            }
            Err(e) => {
                AVAILABILITY_LOOKUPS.with_label_values(&["degraded"]).inc();
                warn!(requested = ids.len(), error = %e, "Availability lookup failed, reporting none available");
                HashSet::new()
            }
        }
    }
}
