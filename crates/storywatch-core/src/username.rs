//! Case-insensitive username value object.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A platform username, case-folded at construction.
///
/// The monitored platform treats usernames case-insensitively, so two
/// spellings of the same handle must compare (and hash) equal. Folding
/// happens once, here, instead of at every comparison site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Creates a new username, lowercasing the input.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    /// Returns the folded string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the username is empty after trimming.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Username {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Username {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
