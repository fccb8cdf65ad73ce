//! Bulk species lookup orchestration
//!
//! Names are resolved in fixed-size batches with a fixed pause between
//! batches to respect the upstream rate limit. Lookups within a batch run
//! concurrently and fail independently; one name's failure never aborts the
//! rest. Each bulk search runs as a session identified by UUID; starting a
//! new search cancels the previous session, which stops between lookups and
//! keeps its partial results readable.

use futures::stream::{Stream, StreamExt};
use lifer_common::events::LiferEvent;
use lifer_common::SpeciesRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use super::inat_client::InatClient;
use crate::AppState;

/// Names resolved concurrently per batch
pub const BATCH_SIZE: usize = 3;

/// Pause between batches
pub const BATCH_PAUSE_MS: u64 = 1000;

/// Outcome of a single name's lookup
#[derive(Debug, Clone)]
pub struct LookupOutcome {
    /// The free-text input as submitted
    pub input: String,
    /// The resolved species, or `None` when no usable match was found
    pub record: Option<SpeciesRecord>,
}

/// Lazy bulk search: yields one outcome per input name, in input order.
///
/// The stream is finite and not restartable; nothing is fetched until it is
/// polled.
pub fn search<'a>(
    client: &'a InatClient,
    names: Vec<String>,
) -> impl Stream<Item = LookupOutcome> + 'a {
    async_stream::stream! {
        for (batch_idx, batch) in names.chunks(BATCH_SIZE).enumerate() {
            if batch_idx > 0 {
                tokio::time::sleep(Duration::from_millis(BATCH_PAUSE_MS)).await;
            }

            let lookups = batch.iter().map(|name| client.lookup(name));
            let records = futures::future::join_all(lookups).await;

            for (name, record) in batch.iter().zip(records) {
                yield LookupOutcome {
                    input: name.clone(),
                    record,
                };
            }
        }
    }
}

/// Lifecycle of a search session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStatus {
    Running,
    Completed,
    Cancelled,
}

/// State of one bulk search, kept readable after completion or cancellation
#[derive(Debug, Clone, Serialize)]
pub struct SearchSession {
    pub id: Uuid,
    pub status: SearchStatus,
    pub total: usize,
    pub completed: usize,
    /// Resolved candidates staged for the user to add to the list
    pub matched: Vec<SpeciesRecord>,
    /// Inputs that resolved to nothing
    pub missed: Vec<String>,
}

impl SearchSession {
    fn apply(&mut self, outcome: LookupOutcome) {
        self.completed += 1;
        match outcome.record {
            Some(record) => self.matched.push(record),
            None => self.missed.push(outcome.input),
        }
    }
}

/// Registry of search sessions; at most one is running at a time
#[derive(Debug, Default)]
pub struct SearchRegistry {
    sessions: HashMap<Uuid, SearchSession>,
    active: Option<(Uuid, CancellationToken)>,
}

impl SearchRegistry {
    /// Open a new running session, cancelling the previous one if it is
    /// still active. Returns the new session id, its cancellation token, and
    /// the id of the session that was cancelled, if any.
    pub fn begin(&mut self, total: usize) -> (Uuid, CancellationToken, Option<Uuid>) {
        let cancelled = self.cancel_active();

        let id = Uuid::new_v4();
        let token = CancellationToken::new();
        self.sessions.insert(
            id,
            SearchSession {
                id,
                status: SearchStatus::Running,
                total,
                completed: 0,
                matched: Vec::new(),
                missed: Vec::new(),
            },
        );
        self.active = Some((id, token.clone()));

        (id, token, cancelled)
    }

    /// Cancel the active session, if any, and mark it cancelled
    pub fn cancel_active(&mut self) -> Option<Uuid> {
        let (id, token) = self.active.take()?;
        token.cancel();
        if let Some(session) = self.sessions.get_mut(&id) {
            if session.status == SearchStatus::Running {
                session.status = SearchStatus::Cancelled;
            }
        }
        Some(id)
    }

    /// Drop all staged sessions (the pending-search reset on list save)
    pub fn clear(&mut self) {
        self.cancel_active();
        self.sessions.clear();
    }

    pub fn get(&self, id: &Uuid) -> Option<&SearchSession> {
        self.sessions.get(id)
    }

    fn get_mut(&mut self, id: &Uuid) -> Option<&mut SearchSession> {
        self.sessions.get_mut(id)
    }

    fn finish(&mut self, id: &Uuid) {
        if let Some(session) = self.get_mut(id) {
            if session.status == SearchStatus::Running {
                session.status = SearchStatus::Completed;
            }
        }
        if matches!(self.active, Some((active_id, _)) if active_id == *id) {
            self.active = None;
        }
    }
}

/// Drive one search session to completion, publishing progress events.
///
/// Runs as a spawned task; a cancelled token stops the loop between lookups
/// and leaves partial results in the registry.
pub async fn run_session(
    state: AppState,
    session_id: Uuid,
    names: Vec<String>,
    token: CancellationToken,
) {
    let total = names.len();
    info!(%session_id, total, "Bulk species search started");
    state.event_bus.emit(LiferEvent::SearchStarted {
        session_id,
        total,
        timestamp: chrono::Utc::now(),
    });

    let client = state.lookup.clone();
    let stream = search(&client, names);
    futures::pin_mut!(stream);

    while let Some(outcome) = stream.next().await {
        if token.is_cancelled() {
            warn!(%session_id, "Search session cancelled, discarding in-flight result");
            state.event_bus.emit(LiferEvent::SearchCancelled {
                session_id,
                timestamp: chrono::Utc::now(),
            });
            return;
        }

        let completed = {
            let mut registry = state.searches.write().await;
            match registry.get_mut(&session_id) {
                Some(session) => {
                    session.apply(outcome);
                    session.completed
                }
                None => return,
            }
        };

        state.event_bus.emit(LiferEvent::SearchProgress {
            session_id,
            completed,
            total,
            timestamp: chrono::Utc::now(),
        });
    }

    let (status, matched, missed) = {
        let mut registry = state.searches.write().await;
        registry.finish(&session_id);
        match registry.get(&session_id) {
            Some(session) => (session.status, session.matched.len(), session.missed.len()),
            None => return,
        }
    };

    // A session superseded right as its last lookup landed stays cancelled.
    match status {
        SearchStatus::Cancelled => {
            state.event_bus.emit(LiferEvent::SearchCancelled {
                session_id,
                timestamp: chrono::Utc::now(),
            });
        }
        _ => {
            info!(%session_id, matched, missed, "Bulk species search completed");
            state.event_bus.emit(LiferEvent::SearchCompleted {
                session_id,
                matched,
                missed,
                timestamp: chrono::Utc::now(),
            });
        }
    }
}
