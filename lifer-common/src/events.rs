//! Event types for the Lifer event system
//!
//! Provides shared event definitions and EventBus for service components.
//! Events are broadcast via EventBus and can be serialized for SSE
//! transmission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Lifer event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LiferEvent {
    /// A bulk species search session started
    SearchStarted {
        /// Search session UUID
        session_id: Uuid,
        /// Number of names submitted
        total: usize,
        /// When the session started
        timestamp: DateTime<Utc>,
    },

    /// Incremental bulk search progress, emitted as names resolve
    SearchProgress {
        /// Search session UUID
        session_id: Uuid,
        /// Names resolved so far (matched or missed)
        completed: usize,
        /// Number of names submitted
        total: usize,
        /// When progress was recorded
        timestamp: DateTime<Utc>,
    },

    /// Bulk search session ran to completion
    SearchCompleted {
        /// Search session UUID
        session_id: Uuid,
        /// Names that resolved to a species
        matched: usize,
        /// Names with no usable match
        missed: usize,
        /// When the session completed
        timestamp: DateTime<Utc>,
    },

    /// Bulk search session was superseded by a newer search
    SearchCancelled {
        /// Search session UUID
        session_id: Uuid,
        /// When cancellation was observed
        timestamp: DateTime<Utc>,
    },
}

impl LiferEvent {
    /// Event type name, used as the SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            LiferEvent::SearchStarted { .. } => "SearchStarted",
            LiferEvent::SearchProgress { .. } => "SearchProgress",
            LiferEvent::SearchCompleted { .. } => "SearchCompleted",
            LiferEvent::SearchCancelled { .. } => "SearchCancelled",
        }
    }
}

/// Central event distribution bus
///
/// Uses tokio::broadcast internally: non-blocking publish, multiple
/// concurrent subscribers, automatic cleanup when subscribers drop, lagged
/// message detection for slow subscribers.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LiferEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<LiferEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns the subscriber count, or 0 when nobody is listening — an
    /// event with no subscribers is not an error.
    pub fn emit(&self, event: LiferEvent) -> usize {
        match self.tx.send(event) {
            Ok(count) => count,
            Err(_) => 0,
        }
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
