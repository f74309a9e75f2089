//! Media server settings handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use shelfsync_core::{MediaServerSettings, SanitizedMediaServerSettings, SettingsError};
use tracing::info;

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateMediaServerSettingsRequest {
    pub url: String,
    /// Omitted or blank keeps the stored key.
    #[serde(default)]
    pub access_key: Option<String>,
}

/// GET /api/v1/settings/media-server
///
/// Returns the url and whether a key is stored, never the key itself.
pub async fn get_media_server_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SanitizedMediaServerSettings>, ApiError> {
    match state.settings().load() {
        Ok(settings) => Ok(Json(SanitizedMediaServerSettings::from(&settings))),
        Err(SettingsError::NotConfigured) => Ok(Json(SanitizedMediaServerSettings {
            url: String::new(),
            access_key_configured: false,
        })),
        Err(e) => Err(settings_error(e)),
    }
}

/// PUT /api/v1/settings/media-server
pub async fn update_media_server_settings(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateMediaServerSettingsRequest>,
) -> Result<Json<SanitizedMediaServerSettings>, ApiError> {
    let access_key = match request.access_key.filter(|k| !k.trim().is_empty()) {
        Some(key) => key,
        None => match state.settings().load() {
            Ok(existing) => existing.access_key,
            Err(SettingsError::NotConfigured) => String::new(),
            Err(e) => return Err(settings_error(e)),
        },
    };

    let settings = MediaServerSettings::new(request.url, access_key);
    state.settings().save(&settings).map_err(settings_error)?;
    info!(url = %settings.url, "Media server settings updated");

    Ok(Json(SanitizedMediaServerSettings::from(&settings)))
}

fn settings_error(error: SettingsError) -> ApiError {
    let status = match error {
        SettingsError::Invalid(_) | SettingsError::NotConfigured => StatusCode::BAD_REQUEST,
        SettingsError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, error.to_string())
}
