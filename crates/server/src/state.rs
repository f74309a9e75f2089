use std::sync::Arc;

use shelfsync_core::{
    AvailabilityResolver, CatalogStore, Config, LibraryConnector, SanitizedConfig,
    SettingsStore, SyncEngine,
};

/// Shared application state
pub struct AppState {
    config: Config,
    settings: Arc<dyn SettingsStore>,
    catalog: Arc<dyn CatalogStore>,
    connector: Arc<dyn LibraryConnector>,
    sync_engine: SyncEngine,
    availability: AvailabilityResolver,
}

impl AppState {
    pub fn new(
        config: Config,
        settings: Arc<dyn SettingsStore>,
        catalog: Arc<dyn CatalogStore>,
        connector: Arc<dyn LibraryConnector>,
    ) -> Self {
        let sync_engine = SyncEngine::new(
            Arc::clone(&settings),
            Arc::clone(&catalog),
            Arc::clone(&connector),
            &config.sync,
        );
        let availability = AvailabilityResolver::new(Arc::clone(&catalog));

        Self {
            config,
            settings,
            catalog,
            connector,
            sync_engine,
            availability,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }

    pub fn connector(&self) -> &dyn LibraryConnector {
        self.connector.as_ref()
    }

    pub fn sync_engine(&self) -> &SyncEngine {
        &self.sync_engine
    }

    pub fn availability(&self) -> &AvailabilityResolver {
        &self.availability
    }
}
