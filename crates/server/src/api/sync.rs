//! Sync invocation handler.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use shelfsync_core::{SettingsError, SyncError, SyncRequest, SyncResponse};

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

/// POST /api/v1/sync
///
/// `{}` enumerates libraries; `{libraryId, offset}` syncs one page and returns
/// the checkpoint for the next call.
pub async fn run_sync(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, ApiError> {
    state
        .sync_engine()
        .handle(request)
        .await
        .map(Json)
        .map_err(|e| api_error(sync_error_status(&e), e.to_string()))
}

pub fn sync_error_status(error: &SyncError) -> StatusCode {
    match error {
        SyncError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        SyncError::Settings(SettingsError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        SyncError::Settings(_) => StatusCode::SERVICE_UNAVAILABLE,
        SyncError::Auth(_) | SyncError::Fetch { .. } => StatusCode::BAD_GATEWAY,
        SyncError::Upsert { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
