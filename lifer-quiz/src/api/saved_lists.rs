//! Saved list endpoints: save, load, delete, summaries

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// One saved list in the overview
#[derive(Debug, Serialize)]
pub struct SavedListSummary {
    pub name: String,
    pub species_count: usize,
    pub high_score: u32,
    /// Whether this list is currently loaded
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct NamedListRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    /// Destructive-action guard; the delete is rejected without it
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// GET /api/lists
pub async fn get_saved_lists(State(state): State<AppState>) -> Json<Vec<SavedListSummary>> {
    let store = state.store.read().await;
    let active = store.active_name();

    let summaries = store
        .saved_lists()
        .iter()
        .map(|l| SavedListSummary {
            name: l.name.clone(),
            species_count: l.species.len(),
            high_score: l.high_score,
            active: active == Some(l.name.as_str()),
        })
        .collect();

    Json(summaries)
}

/// POST /api/lists/save
///
/// Snapshots the current list under the given name, seeding the high score
/// from the running streak, and drops any staged search results.
pub async fn save_list(
    State(state): State<AppState>,
    Json(body): Json<NamedListRequest>,
) -> ApiResult<Json<Vec<SavedListSummary>>> {
    let streak = state.quiz.read().await.streak();

    {
        let mut store = state.store.write().await;
        store.save_as(&body.name, streak)?;
        store.persist(&state.db).await?;
    }
    state.searches.write().await.clear();

    Ok(get_saved_lists(State(state)).await)
}

/// POST /api/lists/load
///
/// Replaces the current list with the saved snapshot and zeroes the streak.
pub async fn load_list(
    State(state): State<AppState>,
    Json(body): Json<NamedListRequest>,
) -> ApiResult<Json<super::list::ListResponse>> {
    {
        let mut store = state.store.write().await;
        store.load(&body.name)?;
        store.persist(&state.db).await?;
    }
    state.quiz.write().await.reset();

    let store = state.store.read().await;
    Ok(Json(super::list::ListResponse {
        active_name: store.active_name().map(str::to_string),
        species: store.current().to_vec(),
        streak: 0,
    }))
}

/// DELETE /api/lists/:name?confirm=true
///
/// Requires the explicit confirmation flag. Deleting an unknown name is a
/// non-fatal no-op.
pub async fn delete_list(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<Json<DeleteResponse>> {
    if !params.confirm {
        return Err(ApiError::BadRequest(
            "Deleting a saved list requires confirm=true".to_string(),
        ));
    }

    let deleted = {
        let mut store = state.store.write().await;
        let deleted = store.delete(&name);
        if deleted {
            store.persist(&state.db).await?;
        }
        deleted
    };

    Ok(Json(DeleteResponse { deleted }))
}

/// Build saved-list routes
pub fn saved_list_routes() -> Router<AppState> {
    Router::new()
        .route("/api/lists", get(get_saved_lists))
        .route("/api/lists/save", post(save_list))
        .route("/api/lists/load", post(load_list))
        .route("/api/lists/:name", delete(delete_list))
}
