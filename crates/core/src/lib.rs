pub mod availability;
pub mod catalog;
pub mod config;
pub mod media_server;
pub mod metrics;
pub mod normalize;
pub mod settings;
pub mod sync;
pub mod testing;

pub use availability::AvailabilityResolver;
pub use catalog::{
    CatalogEntry, CatalogError, CatalogItem, CatalogSearchQuery, CatalogStats, CatalogStore,
    MediaType, SqliteCatalog,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use media_server::{
    AuthSession, AuthStrategy, HttpLibraryConnector, LibraryConnector, LibraryView, MediaLibrary,
    MediaServerClient, MediaServerError,
};
pub use normalize::{normalize_item, normalize_page, ExclusionFilter, NormalizedBatch};
pub use settings::{
    MediaServerSettings, SanitizedMediaServerSettings, SettingsError, SettingsStore,
    SqliteSettingsStore,
};
pub use sync::{
    PageOutcome, PageSyncResponse, SyncCheckpoint, SyncEngine, SyncError, SyncRequest,
    SyncResponse,
};
