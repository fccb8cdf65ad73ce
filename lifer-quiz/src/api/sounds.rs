//! Sounds proxy endpoint
//!
//! Forwards a species query to the sound archive with the three-tier
//! quality fallback and returns at most one recording. Carries a permissive
//! cross-origin header so browser clients can call it directly.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::services::xeno_client::TopRecording;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SoundsParams {
    pub species: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SoundsResponse {
    /// Zero or one recording
    pub recordings: Vec<TopRecording>,
}

/// GET /api/sounds?species=...
pub async fn get_sounds(
    State(state): State<AppState>,
    Query(params): Query<SoundsParams>,
) -> ApiResult<impl IntoResponse> {
    let species = params
        .species
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Species name required".to_string()))?
        .to_string();

    let recording = state.sounds.top_recording(&species).await.map_err(|e| {
        warn!(species = %species, error = %e, "Sound archive fetch failed");
        ApiError::Upstream("Failed to fetch sounds".to_string())
    })?;

    let body = SoundsResponse {
        recordings: recording.into_iter().collect(),
    };

    Ok((
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(body),
    ))
}

/// Build sounds proxy routes
pub fn sounds_routes() -> Router<AppState> {
    Router::new().route("/api/sounds", get(get_sounds))
}
