//! Hourly reporting aggregate.
//!
//! Accumulates per-hour counters across all stories processed within the
//! hour. The scheduler decides when an hour has elapsed; the aggregate only
//! records and drains.

use crate::{StoryId, Username};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Rolling accumulator for the current hourly window.
#[derive(Debug)]
pub struct HourlyAggregate {
    new_viewers: BTreeSet<Username>,
    special_sightings: BTreeSet<Username>,
    window_start: DateTime<Utc>,
}

/// Snapshot emitted when the hourly digest fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestPayload {
    pub new_viewers: BTreeSet<Username>,
    pub special_sightings: BTreeSet<Username>,
    pub window_start: DateTime<Utc>,

    /// Latest known total viewer count, reported even on quiet hours.
    pub total_viewers: Option<usize>,

    /// Identity of the most recently processed story, if any.
    pub story_id: Option<StoryId>,

    /// Relative age of that story.
    pub relative_age: Option<String>,
}

impl DigestPayload {
    /// A quiet hour: no new viewers at all. The digest still goes out,
    /// with a distinct tone.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.new_viewers.is_empty()
    }
}

impl HourlyAggregate {
    pub fn new() -> Self {
        Self {
            new_viewers: BTreeSet::new(),
            special_sightings: BTreeSet::new(),
            window_start: Utc::now(),
        }
    }

    /// Records one story's worth of activity into the current window.
    pub fn record(
        &mut self,
        new_viewers: impl IntoIterator<Item = Username>,
        special_sightings: impl IntoIterator<Item = Username>,
    ) {
        self.new_viewers.extend(new_viewers);
        self.special_sightings.extend(special_sightings);
    }

    /// Returns true if anything has been recorded this window.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new_viewers.is_empty() && self.special_sightings.is_empty()
    }

    /// Drains the window into a digest payload and resets the accumulators.
    ///
    /// Draining and resetting happen in one step so a digest can never be
    /// emitted twice for the same window.
    pub fn flush(
        &mut self,
        total_viewers: Option<usize>,
        story_id: Option<StoryId>,
        relative_age: Option<String>,
    ) -> DigestPayload {
        let payload = DigestPayload {
            new_viewers: std::mem::take(&mut self.new_viewers),
            special_sightings: std::mem::take(&mut self.special_sightings),
            window_start: self.window_start,
            total_viewers,
            story_id,
            relative_age,
        };
        self.window_start = Utc::now();
        payload
    }
}

impl Default for HourlyAggregate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<Username> {
        list.iter().map(|n| Username::new(n)).collect()
    }

    #[test]
    fn test_record_accumulates_across_stories() {
        let mut agg = HourlyAggregate::new();
        agg.record(names(&["alice"]), names(&[]));
        agg.record(names(&["bob"]), names(&["carol"]));

        let digest = agg.flush(Some(10), Some(StoryId::new("s1")), Some("2 hours".into()));
        assert_eq!(digest.new_viewers.len(), 2);
        assert_eq!(digest.special_sightings.len(), 1);
        assert!(!digest.is_quiet());
    }

    #[test]
    fn test_flush_resets_atomically() {
        let mut agg = HourlyAggregate::new();
        agg.record(names(&["alice"]), names(&["alice"]));

        let first = agg.flush(None, None, None);
        assert!(!first.is_quiet());
        assert!(agg.is_empty());

        let second = agg.flush(None, None, None);
        assert!(second.is_quiet());
        assert!(second.special_sightings.is_empty());
    }

    #[test]
    fn test_quiet_hour_digest_still_carries_totals() {
        let mut agg = HourlyAggregate::new();
        let digest = agg.flush(Some(42), Some(StoryId::new("s9")), Some("5 hours".into()));
        assert!(digest.is_quiet());
        assert_eq!(digest.total_viewers, Some(42));
        assert_eq!(digest.story_id, Some(StoryId::new("s9")));
    }

    #[test]
    fn test_window_start_advances_on_flush() {
        let mut agg = HourlyAggregate::new();
        let first_start = agg.flush(None, None, None).window_start;
        let second_start = agg.flush(None, None, None).window_start;
        assert!(second_start >= first_start);
    }

    #[test]
    fn test_duplicate_viewers_counted_once() {
        let mut agg = HourlyAggregate::new();
        agg.record(names(&["alice"]), names(&[]));
        agg.record(names(&["alice"]), names(&[]));
        let digest = agg.flush(None, None, None);
        assert_eq!(digest.new_viewers.len(), 1);
    }
}
