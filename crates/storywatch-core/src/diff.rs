//! Viewer diff engine.
//!
//! Pure set arithmetic, deliberately free of side effects: the caller is
//! responsible for folding the result back into the seen store, which keeps
//! this independently testable.

use crate::Username;
use std::collections::BTreeSet;

/// Returns the viewers present in `current` that are not yet in `seen`.
///
/// An empty `current` snapshot (extraction failed, or nobody has viewed yet)
/// always yields an empty diff; it never means "everyone unviewed".
pub fn new_viewers(
    current: &BTreeSet<Username>,
    seen: &BTreeSet<Username>,
) -> BTreeSet<Username> {
    current.difference(seen).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<Username> {
        names.iter().map(|n| Username::new(n)).collect()
    }

    #[test]
    fn test_first_sighting_all_new() {
        let diff = new_viewers(&set(&["alice", "bob"]), &set(&[]));
        assert_eq!(diff, set(&["alice", "bob"]));
    }

    #[test]
    fn test_only_unreported_viewers_returned() {
        let diff = new_viewers(&set(&["alice", "bob", "carol"]), &set(&["alice", "bob"]));
        assert_eq!(diff, set(&["carol"]));
    }

    #[test]
    fn test_empty_snapshot_yields_empty_diff() {
        // Extraction miss must not look like everyone unviewed.
        let diff = new_viewers(&set(&[]), &set(&["alice", "bob"]));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_idempotent_after_store_update() {
        let current = set(&["alice", "bob", "carol"]);
        let mut seen = set(&["alice"]);

        let first = new_viewers(&current, &seen);
        assert_eq!(first, set(&["bob", "carol"]));

        // Caller unions the snapshot into the store, then diffs again.
        seen.extend(current.iter().cloned());
        let second = new_viewers(&current, &seen);
        assert!(second.is_empty());
    }

    #[test]
    fn test_case_insensitive_membership() {
        let diff = new_viewers(&set(&["Alice"]), &set(&["alice"]));
        assert!(diff.is_empty());
    }
}
