//! Media server diagnostics.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use shelfsync_core::{AuthStrategy, SettingsError};
use tracing::warn;

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ConnectionTestResponse {
    pub strategy: AuthStrategy,
    pub account_id: String,
    pub libraries: usize,
}

/// POST /api/v1/media-server/test
///
/// Authenticates with the stored settings and lists libraries, reporting which
/// handshake worked.
pub async fn test_connection(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConnectionTestResponse>, ApiError> {
    let settings = state.settings().load().map_err(|e| {
        let status = match e {
            SettingsError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::SERVICE_UNAVAILABLE,
        };
        api_error(status, e.to_string())
    })?;

    let connected = state.connector().connect(&settings).await.map_err(|e| {
        warn!(error = %e, "Media server connection test failed");
        api_error(StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    let libraries = connected
        .library
        .list_libraries()
        .await
        .map_err(|e| api_error(StatusCode::BAD_GATEWAY, e.to_string()))?;

    Ok(Json(ConnectionTestResponse {
        strategy: connected.session.strategy,
        account_id: connected.session.account_id,
        libraries: libraries.len(),
    }))
}
