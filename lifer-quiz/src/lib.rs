//! lifer-quiz - bird list curation and identification quiz service
//!
//! Owns the user's curated species list and saved lists, resolves free-text
//! names against the iNaturalist taxa database, resolves recordings from the
//! xeno-canto sound archive, and serves multiple-choice identification
//! questions. All state is persisted to a local SQLite database and exposed
//! over an HTTP REST + SSE API.

pub mod api;
pub mod error;
pub mod list_store;
pub mod quiz;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use lifer_common::events::EventBus;

use crate::list_store::ListStore;
use crate::quiz::QuizSession;
use crate::services::lookup::SearchRegistry;
use crate::services::{InatClient, XenoCantoClient};

/// Application state shared across handlers
///
/// The store, quiz session, and search registry are mutated only from the
/// single request flow; the locks serialize that flow rather than coordinate
/// parallel writers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Current list + saved lists + active name
    pub store: Arc<RwLock<ListStore>>,
    /// Active question and streak
    pub quiz: Arc<RwLock<QuizSession>>,
    /// Bulk search sessions
    pub searches: Arc<RwLock<SearchRegistry>>,
    /// iNaturalist lookup client
    pub lookup: Arc<InatClient>,
    /// xeno-canto sound archive client
    pub sounds: Arc<XenoCantoClient>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, event_bus: EventBus, store: ListStore) -> anyhow::Result<Self> {
        Ok(Self {
            db,
            event_bus,
            store: Arc::new(RwLock::new(store)),
            quiz: Arc::new(RwLock::new(QuizSession::default())),
            searches: Arc::new(RwLock::new(SearchRegistry::default())),
            lookup: Arc::new(InatClient::new()?),
            sounds: Arc::new(XenoCantoClient::new()?),
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::health_routes())
        .merge(api::list_routes())
        .merge(api::saved_list_routes())
        .merge(api::search_routes())
        .merge(api::quiz_routes())
        .merge(api::sounds_routes())
        .route("/api/events", get(api::event_stream))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
