//! Story identity and age.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stories live for 24 hours; at this age we flag them as about to expire.
pub const NEAR_EXPIRY_HOURS: i64 = 23;

/// Opaque identifier for one story instance.
///
/// The story source produces this on a best-effort basis (the platform does
/// not expose a stable key, so it is typically derived from the story's
/// media URL or timestamp). It is only ever used as a key into the seen
/// store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(String);

impl StoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity and age of the currently open story, as reported by the source.
///
/// `id == None` means the source could not determine identity; the cycle
/// skips past such a story without diffing or persisting anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryInfo {
    /// Best-effort unique token for this story instance.
    pub id: Option<StoryId>,

    /// Human-readable age, e.g. "3 hours".
    pub relative_age: String,

    /// Age in whole hours, when the publish time could be read.
    pub age_hours: Option<i64>,
}

impl StoryInfo {
    /// Returns true when the story is at or past the near-expiry threshold.
    #[must_use]
    pub fn near_expiry(&self) -> bool {
        matches!(self.age_hours, Some(h) if h >= NEAR_EXPIRY_HOURS)
    }
}

/// Buckets an elapsed duration into a human-readable age label.
///
/// Mirrors what the platform itself shows next to a story: seconds under a
/// minute, minutes under an hour, hours under a day, then days.
pub fn relative_age_label(elapsed_seconds: i64) -> (String, i64) {
    let secs = elapsed_seconds.max(0);
    let hours = secs / 3600;

    let label = if secs < 60 {
        format!("{secs} seconds")
    } else if secs < 3600 {
        format!("{} minutes", secs / 60)
    } else if hours < 24 {
        format!("{hours} hours")
    } else {
        format!("{} days", hours / 24)
    };

    (label, hours)
}
