use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{availability, catalog, handlers, media_server, settings, sync};
use super::middleware::metrics_middleware;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Sync invocations (driven by an external scheduler)
        .route("/sync", post(sync::run_sync))
        .route("/availability", post(availability::check_availability))
        // Media server connection
        .route(
            "/settings/media-server",
            get(settings::get_media_server_settings).put(settings::update_media_server_settings),
        )
        .route("/media-server/test", post(media_server::test_connection))
        // Catalog (local mirror of the media server library)
        .route("/catalog", get(catalog::list_catalog))
        .route("/catalog/stats", get(catalog::get_stats))
        .route("/catalog/{id}", get(catalog::get_entry));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
