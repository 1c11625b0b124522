//! Story source seam.
//!
//! The browser-automation layer that actually drives the platform UI lives
//! behind this trait. Every operation has a bounded wait of its own;
//! failures surface as `false` or empty results and never leave the session
//! in an undefined state. The loop layers its own retry ceiling on top.

use async_trait::async_trait;
use std::collections::BTreeSet;
use storywatch_core::{StoryInfo, Username};

/// External collaborator that navigates the account's stories.
#[async_trait]
pub trait StorySource: Send {
    /// Navigates to the monitored account's profile.
    async fn open_profile(&mut self) -> bool;

    /// Opens the latest story, if one is available.
    async fn open_latest_story(&mut self) -> bool;

    /// Identity and age of the currently open story.
    ///
    /// `StoryInfo.id == None` when identity could not be determined; the
    /// cycle skips that story.
    async fn story_info(&mut self) -> StoryInfo;

    /// Current viewer snapshot for the open story. Empty on extraction
    /// failure or when nobody has viewed yet; the two are indistinguishable
    /// by design and both yield an empty diff.
    async fn fetch_viewers(&mut self) -> BTreeSet<Username>;

    /// Advances to the next open story. `false` once exhausted.
    async fn advance_to_next(&mut self) -> bool;

    /// Low-cost probe that keeps the underlying session from expiring.
    async fn keep_alive(&mut self) -> bool;

    /// Releases the session. Called exactly once at loop end,
    /// including on error paths.
    async fn close(&mut self);
}

/// Stand-in source used when no scraper backend is wired in.
///
/// Opens the profile but never finds a story, so the daemon idles through
/// its cycles (and keeps emitting "unavailable" progress events) until a
/// real backend is plugged into `Watcher::new`.
pub struct OfflineSource;

#[async_trait]
impl StorySource for OfflineSource {
    async fn open_profile(&mut self) -> bool {
        true
    }

    async fn open_latest_story(&mut self) -> bool {
        false
    }

    async fn story_info(&mut self) -> StoryInfo {
        StoryInfo {
            id: None,
            relative_age: String::new(),
            age_hours: None,
        }
    }

    async fn fetch_viewers(&mut self) -> BTreeSet<Username> {
        BTreeSet::new()
    }

    async fn advance_to_next(&mut self) -> bool {
        false
    }

    async fn keep_alive(&mut self) -> bool {
        true
    }

    async fn close(&mut self) {}
}
