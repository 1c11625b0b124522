//! Progress events for host applications.
//!
//! The loop publishes a fixed-shape snapshot after every story processed
//! (including "unavailable" cycles) over a broadcast channel. Delivery is
//! fire-and-forget: a slow or absent consumer drops messages and never
//! stalls the loop.

use chrono::{DateTime, Local};
use tokio::sync::broadcast;
use tracing::trace;

const PROGRESS_BUFFER: usize = 64;

/// Display value used when a field could not be determined.
pub const UNAVAILABLE: &str = "N/A";

/// Snapshot of the loop's latest observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// When the loop last looked at the account.
    pub last_check: DateTime<Local>,

    /// Total viewers on the story just processed, if known.
    pub total_viewers: Option<usize>,

    /// Relative age of that story, if known.
    pub story_age: Option<String>,
}

impl ProgressEvent {
    /// Snapshot for a cycle where no story could be opened.
    pub fn unavailable() -> Self {
        Self {
            last_check: Local::now(),
            total_viewers: None,
            story_age: None,
        }
    }

    /// Total viewers formatted for display, with the N/A sentinel.
    pub fn total_viewers_display(&self) -> String {
        self.total_viewers
            .map(|n| n.to_string())
            .unwrap_or_else(|| UNAVAILABLE.to_string())
    }

    /// Story age formatted for display, with the N/A sentinel.
    pub fn story_age_display(&self) -> &str {
        self.story_age.as_deref().unwrap_or(UNAVAILABLE)
    }
}

/// Sending side of the progress stream.
#[derive(Clone)]
pub struct ProgressSender {
    tx: broadcast::Sender<ProgressEvent>,
}

impl ProgressSender {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(PROGRESS_BUFFER);
        Self { tx }
    }

    /// Publishes an event. Never blocks; a send with no subscribers is fine.
    pub fn emit(&self, event: ProgressEvent) {
        if self.tx.send(event).is_err() {
            trace!("progress event dropped: no subscribers");
        }
    }

    /// Subscribes a consumer (e.g. a GUI thread) to the stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }
}

impl Default for ProgressSender {
    fn default() -> Self {
        Self::new()
    }
}
