//! Availability lookup handler.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    #[serde(default)]
    pub metadata_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Requested ids present in the catalog, ascending.
    pub available: Vec<i64>,
}

/// POST /api/v1/availability
///
/// Never fails: a broken lookup reports nothing as available.
pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AvailabilityRequest>,
) -> Json<AvailabilityResponse> {
    let requested: HashSet<i64> = request.metadata_ids.into_iter().collect();
    let mut available: Vec<i64> = state.availability().resolve(&requested).into_iter().collect();
    available.sort_unstable();
    Json(AvailabilityResponse { available })
}
