//! Current list management endpoints

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;

use lifer_common::SpeciesRecord;

use crate::error::ApiResult;
use crate::AppState;

/// Current list snapshot returned by every list mutation
#[derive(Debug, Serialize)]
pub struct ListResponse {
    /// Name of the loaded saved list, if any
    pub active_name: Option<String>,
    /// Current list entries, sorted by display name
    pub species: Vec<SpeciesRecord>,
    /// Running correct-answer streak
    pub streak: u32,
}

async fn list_snapshot(state: &AppState) -> ListResponse {
    let store = state.store.read().await;
    let quiz = state.quiz.read().await;
    ListResponse {
        active_name: store.active_name().map(str::to_string),
        species: store.current().to_vec(),
        streak: quiz.streak(),
    }
}

/// GET /api/list
pub async fn get_list(State(state): State<AppState>) -> Json<ListResponse> {
    Json(list_snapshot(&state).await)
}

/// POST /api/list/add
///
/// Body: a species record, typically a staged search candidate echoed back.
/// Duplicates are rejected with a user-visible message.
pub async fn add_species(
    State(state): State<AppState>,
    Json(record): Json<SpeciesRecord>,
) -> ApiResult<Json<ListResponse>> {
    {
        let mut store = state.store.write().await;
        store.add(record)?;
        store.persist(&state.db).await?;
    }
    Ok(Json(list_snapshot(&state).await))
}

/// DELETE /api/list/:id
pub async fn remove_species(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<ListResponse>> {
    {
        let mut store = state.store.write().await;
        if store.remove(id) {
            store.persist(&state.db).await?;
        }
    }
    Ok(Json(list_snapshot(&state).await))
}

/// POST /api/list/clear
pub async fn clear_list(State(state): State<AppState>) -> ApiResult<Json<ListResponse>> {
    {
        let mut store = state.store.write().await;
        store.clear();
        store.persist(&state.db).await?;
    }
    state.quiz.write().await.reset();
    Ok(Json(list_snapshot(&state).await))
}

/// Build current-list routes
pub fn list_routes() -> Router<AppState> {
    Router::new()
        .route("/api/list", get(get_list))
        .route("/api/list/add", post(add_species))
        .route("/api/list/clear", post(clear_list))
        .route("/api/list/:id", delete(remove_species))
}
