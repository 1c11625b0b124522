//! Optional audit store seam.
//!
//! A relational audit trail is an optional collaborator: its absence or
//! failure must never abort the monitoring loop.

use async_trait::async_trait;
use std::collections::BTreeSet;
use storywatch_core::{StoryId, Username, WatchResult};

/// Pluggable audit backend for recording view events.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Records a batch of newly observed viewers, best-effort.
    async fn record_views(
        &self,
        new_viewers: &BTreeSet<Username>,
        story_id: &StoryId,
        total_views: usize,
    ) -> WatchResult<()>;
}

/// Audit backend that records nothing.
pub struct NoopAudit;

#[async_trait]
impl AuditStore for NoopAudit {
    async fn record_views(
        &self,
        _new_viewers: &BTreeSet<Username>,
        _story_id: &StoryId,
        _total_views: usize,
    ) -> WatchResult<()> {
        Ok(())
    }
}
