//! Special-user presence tracking across cycles.
//!
//! Presence is a property of the account's current story set, not of any one
//! story: a user may be on story 2 of 3 but not story 1. The tracker is
//! therefore fed exactly once per cycle with the union of viewers observed
//! across every story opened in that cycle.

use crate::Username;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Presence state for a single tracked username.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Presence {
    /// No observation yet this process lifetime.
    #[default]
    Unknown,
    Viewing,
    NotViewing,
}

/// A presence transition detected at the end of a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceChange {
    /// The user is now in the cycle viewer union and was not before.
    /// Feeds hourly-digest bookkeeping; does not itself send a notification.
    Appeared(Username),

    /// The user was viewing and has dropped out of the union entirely,
    /// which is the "possible block/restriction" signal. Emitted at most
    /// once per uninterrupted absence streak.
    Disappeared(Username),
}

/// Tracks per-username presence across full cycles.
///
/// State lives only in process memory; every start begins at `Unknown`, so a
/// restart never fires a spurious disappearance.
#[derive(Debug)]
pub struct SpecialTracker {
    states: BTreeMap<Username, Presence>,
}

impl SpecialTracker {
    /// Creates a tracker for the configured special usernames.
    pub fn new(special_users: impl IntoIterator<Item = Username>) -> Self {
        let states = special_users
            .into_iter()
            .map(|u| (u, Presence::Unknown))
            .collect();
        Self { states }
    }

    /// Folds one cycle's viewer union into the tracker, returning the
    /// transitions that occurred.
    ///
    /// `Viewing -> Viewing` and `NotViewing -> NotViewing` are no-ops;
    /// `Unknown -> NotViewing` is also silent (absence at startup is not a
    /// disappearance).
    pub fn observe_cycle(&mut self, cycle_union: &BTreeSet<Username>) -> Vec<PresenceChange> {
        let mut changes = Vec::new();

        for (user, state) in &mut self.states {
            let viewing_now = cycle_union.contains(user);
            match (*state, viewing_now) {
                (Presence::Viewing, false) => {
                    debug!(user = %user, "special user dropped out of viewer union");
                    *state = Presence::NotViewing;
                    changes.push(PresenceChange::Disappeared(user.clone()));
                }
                (Presence::NotViewing | Presence::Unknown, true) => {
                    debug!(user = %user, "special user present in viewer union");
                    *state = Presence::Viewing;
                    changes.push(PresenceChange::Appeared(user.clone()));
                }
                (Presence::Unknown, false) => {
                    *state = Presence::NotViewing;
                }
                _ => {}
            }
        }

        changes
    }

    /// Returns true if the user is currently considered viewing.
    #[must_use]
    pub fn is_viewing(&self, user: &Username) -> bool {
        matches!(self.states.get(user), Some(Presence::Viewing))
    }

    /// The usernames this tracker follows.
    pub fn tracked(&self) -> impl Iterator<Item = &Username> {
        self.states.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn union(names: &[&str]) -> BTreeSet<Username> {
        names.iter().map(|n| Username::new(n)).collect()
    }

    fn tracker(names: &[&str]) -> SpecialTracker {
        SpecialTracker::new(names.iter().map(|n| Username::new(n)))
    }

    #[test]
    fn test_first_sighting_is_appearance() {
        let mut t = tracker(&["carol"]);
        let changes = t.observe_cycle(&union(&["alice", "carol"]));
        assert_eq!(changes, vec![PresenceChange::Appeared(Username::new("carol"))]);
        assert!(t.is_viewing(&Username::new("carol")));
    }

    #[test]
    fn test_absence_at_startup_is_silent() {
        let mut t = tracker(&["carol"]);
        let changes = t.observe_cycle(&union(&["alice"]));
        assert!(changes.is_empty());
        assert!(!t.is_viewing(&Username::new("carol")));
    }

    #[test]
    fn test_disappearance_fires_once_per_streak() {
        let mut t = tracker(&["carol"]);
        t.observe_cycle(&union(&["carol"]));

        // Presence sequence [true, false, false, false]: one event.
        let mut disappearances = 0;
        for _ in 0..3 {
            let changes = t.observe_cycle(&union(&[]));
            disappearances += changes
                .iter()
                .filter(|c| matches!(c, PresenceChange::Disappeared(_)))
                .count();
        }
        assert_eq!(disappearances, 1);
        assert!(!t.is_viewing(&Username::new("carol")));
    }

    #[test]
    fn test_reappearance_after_absence() {
        let mut t = tracker(&["carol"]);
        t.observe_cycle(&union(&["carol"]));
        t.observe_cycle(&union(&[]));

        let changes = t.observe_cycle(&union(&["carol"]));
        assert_eq!(changes, vec![PresenceChange::Appeared(Username::new("carol"))]);
    }

    #[test]
    fn test_steady_presence_is_noop() {
        let mut t = tracker(&["carol"]);
        t.observe_cycle(&union(&["carol"]));
        let changes = t.observe_cycle(&union(&["carol"]));
        assert!(changes.is_empty());
    }

    #[test]
    fn test_case_insensitive_union_lookup() {
        let mut t = tracker(&["Carol"]);
        let changes = t.observe_cycle(&union(&["CAROL"]));
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn test_untracked_users_ignored() {
        let mut t = tracker(&["carol"]);
        let changes = t.observe_cycle(&union(&["alice", "bob"]));
        assert!(changes.is_empty());
    }
}
