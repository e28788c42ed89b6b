//! Realtime progress notifications
//!
//! Progress is published as `{"progress": [completed, total]}` (or
//! `{"progress": "0"}` when a read starts) on a channel keyed by event name and
//! user. Delivery is fire-and-forget: nobody acknowledges, and subscribers that
//! fall behind lose events.

use serde::{Serialize, Serializer};
use tokio::sync::broadcast;

/// Default capacity of the broadcast channel
const DEFAULT_CAPACITY: usize = 256;

/// One progress report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Work accepted, nothing completed yet
    Started,
    /// `completed` out of `total` sub-steps done
    Step { completed: u32, total: u32 },
}

impl Progress {
    pub fn step(completed: u32, total: u32) -> Self {
        Self::Step { completed, total }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Step { completed, total } if completed == total)
    }
}

impl Serialize for Progress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Started => serializer.serialize_str("0"),
            Self::Step { completed, total } => [completed, total].serialize(serializer),
        }
    }
}

/// Message body delivered to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressMessage {
    pub progress: Progress,
}

/// Anything that accepts progress notifications
pub trait ProgressSink: Send + Sync {
    fn publish(&self, event: &str, user: &str, progress: Progress);
}

/// A progress message together with its routing key
#[derive(Debug, Clone)]
pub struct RealtimeEvent {
    pub event: String,
    pub user: String,
    pub message: ProgressMessage,
}

impl RealtimeEvent {
    pub fn matches(&self, event: &str, user: &str) -> bool {
        self.event == event && self.user == user
    }
}

/// In-process pub/sub hub backed by a tokio broadcast channel
pub struct RealtimeHub {
    tx: broadcast::Sender<RealtimeEvent>,
}

impl RealtimeHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.tx.subscribe()
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ProgressSink for RealtimeHub {
    fn publish(&self, event: &str, user: &str, progress: Progress) {
        tracing::trace!(event, user, ?progress, "Publishing progress");
        // No subscribers is not an error
        let _ = self.tx.send(RealtimeEvent {
            event: event.to_string(),
            user: user.to_string(),
            message: ProgressMessage { progress },
        });
    }
}
