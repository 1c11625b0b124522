//! Durable seen-state store.
//!
//! Maps story id -> set of usernames already reported for that story. The
//! record is small, so every save rewrites the whole file via a temp file
//! and an atomic rename; no partial-write recovery is needed. Per-story sets
//! only ever grow (union on record, never removal) so a username is never
//! re-reported for the same story.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use storywatch_core::{StoryId, Username, WatchResult};
use tracing::{debug, warn};

/// Persistent mapping of story id to reported viewer usernames.
#[derive(Debug)]
pub struct SeenStore {
    path: PathBuf,
    entries: BTreeMap<StoryId, BTreeSet<Username>>,
    /// Set when the last save failed; the next mutation retries.
    dirty: bool,
}

impl SeenStore {
    /// Loads the store from `path`.
    ///
    /// A missing file is a fresh start; an unreadable or undecodable file is
    /// logged and treated as empty rather than crashing the process.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<StoryId, BTreeSet<Username>>>(&raw) {
                Ok(entries) => {
                    debug!(stories = entries.len(), path = %path.display(), "seen store loaded");
                    entries
                }
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "seen store undecodable, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "seen store unreadable, starting empty");
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries,
            dirty: false,
        }
    }

    /// The usernames already reported for `story_id` (empty if first seen).
    pub fn seen_for(&self, story_id: &StoryId) -> BTreeSet<Username> {
        self.entries.get(story_id).cloned().unwrap_or_default()
    }

    /// Unions `viewers` into the story's seen set and persists.
    ///
    /// A write failure keeps the in-memory state and marks the store dirty
    /// so the next mutation (or the shutdown flush) retries.
    pub fn record(&mut self, story_id: &StoryId, viewers: &BTreeSet<Username>) {
        let entry = self.entries.entry(story_id.clone()).or_default();
        entry.extend(viewers.iter().cloned());
        self.dirty = true;

        if let Err(e) = self.save() {
            warn!(error = %e, story_id = %story_id, "seen store save failed, will retry");
        }
    }

    /// Writes the whole store, replacing the file atomically.
    pub fn save(&mut self) -> WatchResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        self.dirty = false;
        Ok(())
    }

    /// Union of every username ever reported, across all stories.
    pub fn all_seen(&self) -> BTreeSet<Username> {
        self.entries.values().flatten().cloned().collect()
    }

    /// Number of story ids tracked.
    pub fn story_count(&self) -> usize {
        self.entries.len()
    }

    /// True when an earlier save failed and state is not yet on disk.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
