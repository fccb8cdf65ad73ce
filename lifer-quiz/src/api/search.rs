//! Bulk species search endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::lookup::{self, SearchSession};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Free-text names, one per entry; blank entries are ignored
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchStarted {
    pub session_id: Uuid,
    pub total: usize,
}

/// POST /api/search
///
/// Starts a bulk lookup session and returns immediately; progress arrives
/// over the event stream and results are polled per session. Any previous
/// session still running is cancelled.
pub async fn start_search(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> ApiResult<Json<SearchStarted>> {
    let names: Vec<String> = body
        .names
        .iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();

    if names.is_empty() {
        return Err(ApiError::BadRequest("No names provided".to_string()));
    }

    let total = names.len();
    let (session_id, token, _superseded) = state.searches.write().await.begin(total);

    tokio::spawn(lookup::run_session(state.clone(), session_id, names, token));

    Ok(Json(SearchStarted { session_id, total }))
}

/// GET /api/search/:id
pub async fn get_search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SearchSession>> {
    let registry = state.searches.read().await;
    let session = registry
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("No search session {id}")))?;

    Ok(Json(session.clone()))
}

/// Build search routes
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/api/search", post(start_search))
        .route("/api/search/:id", get(get_search))
}
