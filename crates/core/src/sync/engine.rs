//! The sync engine.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::CatalogStore;
use crate::config::SyncConfig;
use crate::media_server::{ConnectedLibrary, LibraryConnector, LibraryView};
use crate::metrics::{ITEMS_EXCLUDED, ITEMS_SKIPPED, ITEMS_UPSERTED, SYNC_FAILURES, SYNC_PAGES};
use crate::normalize::{normalize_page, ExclusionFilter};
use crate::settings::SettingsStore;

use super::{
    PageOutcome, PageSyncResponse, SyncCheckpoint, SyncError, SyncRequest, SyncResponse,
    ViewSummary, ViewsResponse,
};

/// Stateless driver for enumerate and page-sync invocations.
///
/// Nothing is remembered between calls; a fresh media server connection is
/// made for every invocation with the settings current at that moment.
pub struct SyncEngine {
    settings: Arc<dyn SettingsStore>,
    catalog: Arc<dyn CatalogStore>,
    connector: Arc<dyn LibraryConnector>,
    page_size: u32,
    filter: ExclusionFilter,
}

impl SyncEngine {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        catalog: Arc<dyn CatalogStore>,
        connector: Arc<dyn LibraryConnector>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            settings,
            catalog,
            connector,
            page_size: config.page_size,
            filter: ExclusionFilter::new(&config.excluded_titles),
        }
    }

    /// Dispatch an inbound request to enumerate or page sync.
    pub async fn handle(&self, request: SyncRequest) -> Result<SyncResponse, SyncError> {
        match request.library_id {
            None => {
                let views = self.list_libraries().await?;
                Ok(SyncResponse::Views(ViewsResponse {
                    views: views.into_iter().map(ViewSummary::from).collect(),
                }))
            }
            Some(library_id) => {
                let outcome = self
                    .sync_page(&library_id, request.offset.unwrap_or(0))
                    .await?;
                Ok(SyncResponse::Page(PageSyncResponse::from(&outcome)))
            }
        }
    }

    /// Enumerate the libraries visible to the operating account.
    pub async fn list_libraries(&self) -> Result<Vec<LibraryView>, SyncError> {
        let result = async {
            let connected = self.connect().await?;
            connected
                .library
                .list_libraries()
                .await
                .map_err(|source| SyncError::Fetch {
                    context: "Failed to list libraries".to_string(),
                    source,
                })
        }
        .await;

        match &result {
            Ok(views) => info!(count = views.len(), "Enumerated media server libraries"),
            Err(e) => {
                SYNC_FAILURES.with_label_values(&[e.stage()]).inc();
                warn!(stage = e.stage(), error = %e, "Library enumeration failed");
            }
        }
        result
    }

    /// Sync one page of `library_id` starting at `offset`.
    ///
    /// On failure nothing from this page has been written and the caller can
    /// retry the same offset.
    pub async fn sync_page(&self, library_id: &str, offset: u64) -> Result<PageOutcome, SyncError> {
        let result = self.run_page(library_id, offset).await;

        match &result {
            Ok(outcome) => {
                let label = if outcome.checkpoint.done { "done" } else { "continued" };
                SYNC_PAGES.with_label_values(&[label]).inc();
                info!(
                    library_id,
                    offset,
                    fetched = outcome.fetched,
                    upserted = outcome.upserted,
                    excluded = outcome.excluded,
                    skipped = outcome.skipped,
                    next_offset = outcome.checkpoint.offset,
                    done = outcome.checkpoint.done,
                    "Synced library page"
                );
            }
            Err(e) => {
                SYNC_PAGES.with_label_values(&["failed"]).inc();
                SYNC_FAILURES.with_label_values(&[e.stage()]).inc();
                warn!(library_id, offset, stage = e.stage(), error = %e, "Page sync failed");
            }
        }
        result
    }

    async fn run_page(&self, library_id: &str, offset: u64) -> Result<PageOutcome, SyncError> {
        if library_id.trim().is_empty() {
            return Err(SyncError::InvalidRequest(
                "libraryId must not be empty".to_string(),
            ));
        }

        let connected = self.connect().await?;
        let page = connected
            .library
            .get_page(library_id, offset, self.page_size)
            .await
            .map_err(|source| SyncError::Fetch {
                context: format!(
                    "Failed to fetch library {} at offset {}",
                    library_id, offset
                ),
                source,
            })?;

        let fetched = page.items.len();
        let batch = normalize_page(&page.items, &self.filter);

        let upserted = if batch.items.is_empty() {
            0
        } else {
            self.catalog
                .upsert_batch(&batch.items)
                .map_err(|source| SyncError::Upsert {
                    library_id: library_id.to_string(),
                    offset,
                    source,
                })?
        };

        ITEMS_UPSERTED.inc_by(upserted as u64);
        ITEMS_EXCLUDED.inc_by(batch.excluded as u64);
        ITEMS_SKIPPED.inc_by(batch.skipped as u64);

        Ok(PageOutcome {
            checkpoint: SyncCheckpoint::after_page(
                library_id,
                offset,
                fetched as u64,
                self.page_size,
                page.total_count,
            ),
            fetched,
            upserted,
            excluded: batch.excluded,
            skipped: batch.skipped,
        })
    }

    async fn connect(&self) -> Result<ConnectedLibrary, SyncError> {
        let settings = self.settings.load()?;
        let connected = self
            .connector
            .connect(&settings)
            .await
            .map_err(SyncError::Auth)?;
        debug!(
            strategy = connected.session.strategy.as_str(),
            account_id = %connected.session.account_id,
            "Connected to media server"
        );
        Ok(connected)
    }
}
