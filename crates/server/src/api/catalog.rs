//! Catalog API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use shelfsync_core::{CatalogEntry, CatalogError, CatalogSearchQuery, CatalogStats, MediaType};

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQueryParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

#[derive(Debug, Serialize)]
pub struct CatalogListResponse {
    pub entries: Vec<CatalogEntry>,
    pub total: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/catalog
///
/// Search or list synced items.
pub async fn list_catalog(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CatalogQueryParams>,
) -> Result<Json<CatalogListResponse>, ApiError> {
    let query = CatalogSearchQuery {
        query: params.query.unwrap_or_default(),
        media_type: params.media_type,
        limit: params.limit,
    };

    match state.catalog().search(&query) {
        Ok(entries) => {
            let total = entries.len();
            Ok(Json(CatalogListResponse { entries, total }))
        }
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// GET /api/v1/catalog/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogStats>, ApiError> {
    state
        .catalog()
        .stats()
        .map(Json)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// GET /api/v1/catalog/{id}
///
/// Get a specific item by its media server id.
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CatalogEntry>, ApiError> {
    match state.catalog().get(&id) {
        Ok(entry) => Ok(Json(entry)),
        Err(CatalogError::NotFound(_)) => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Item not found: {}", id),
        )),
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}
