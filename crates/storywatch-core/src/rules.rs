//! Notification rules engine.
//!
//! Decides *what* to communicate about a batch of new viewers and returns a
//! structured intent; rendering and transport live elsewhere so these rules
//! stay pure and independently testable.

use crate::{StoryInfo, Username};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How loudly a new-viewer notification should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Only ordinary viewers in the batch.
    Routine,
    /// At least one configured special user is in the batch.
    Special,
    /// The designated priority user is in the batch.
    Priority,
}

/// A fully-decided notification, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationIntent {
    pub urgency: Urgency,

    /// Every viewer new to this story, special or not.
    pub new_viewers: BTreeSet<Username>,

    /// The subset of `new_viewers` that is in the special set.
    pub special_new: BTreeSet<Username>,

    /// Human-readable story age, carried through for the recipient.
    pub relative_age: String,

    /// True when the story is about to expire (content disappearing soon).
    pub near_expiry: bool,
}

/// Classifies a batch of new viewers into a notification intent.
///
/// Returns `None` for an empty batch: no new viewers, nothing to say.
pub fn classify(
    new_viewers: &BTreeSet<Username>,
    special_set: &BTreeSet<Username>,
    priority_user: Option<&Username>,
    story: &StoryInfo,
) -> Option<NotificationIntent> {
    if new_viewers.is_empty() {
        return None;
    }

    let special_new: BTreeSet<Username> =
        new_viewers.intersection(special_set).cloned().collect();

    let urgency = match priority_user {
        Some(p) if special_new.contains(p) => Urgency::Priority,
        _ if !special_new.is_empty() => Urgency::Special,
        _ => Urgency::Routine,
    };

    Some(NotificationIntent {
        urgency,
        new_viewers: new_viewers.clone(),
        special_new,
        relative_age: story.relative_age.clone(),
        near_expiry: story.near_expiry(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoryId;

    fn set(names: &[&str]) -> BTreeSet<Username> {
        names.iter().map(|n| Username::new(n)).collect()
    }

    fn story(age_hours: Option<i64>) -> StoryInfo {
        StoryInfo {
            id: Some(StoryId::new("abc123")),
            relative_age: "3 hours".to_string(),
            age_hours,
        }
    }

    #[test]
    fn test_empty_batch_yields_nothing() {
        let intent = classify(&set(&[]), &set(&["carol"]), None, &story(Some(3)));
        assert!(intent.is_none());
    }

    #[test]
    fn test_routine_when_no_specials() {
        let intent =
            classify(&set(&["dave"]), &set(&["carol"]), None, &story(Some(3))).unwrap();
        assert_eq!(intent.urgency, Urgency::Routine);
        assert!(intent.special_new.is_empty());
        assert_eq!(intent.new_viewers, set(&["dave"]));
    }

    #[test]
    fn test_special_escalation_scenario() {
        // Stored seen-set {alice,bob}, snapshot adds carol (special).
        let new = set(&["carol"]);
        let intent = classify(&new, &set(&["carol", "erin"]), None, &story(Some(3))).unwrap();
        assert_eq!(intent.urgency, Urgency::Special);
        assert_eq!(intent.special_new, set(&["carol"]));
    }

    #[test]
    fn test_priority_user_outranks_special() {
        let special = set(&["carol", "brenda"]);
        let priority = Username::new("brenda");
        let intent = classify(
            &set(&["brenda", "carol", "dave"]),
            &special,
            Some(&priority),
            &story(Some(3)),
        )
        .unwrap();
        assert_eq!(intent.urgency, Urgency::Priority);
        assert_eq!(intent.special_new, set(&["brenda", "carol"]));
        assert_eq!(intent.new_viewers.len(), 3);
    }

    #[test]
    fn test_priority_user_absent_falls_back_to_special() {
        let special = set(&["carol", "brenda"]);
        let priority = Username::new("brenda");
        let intent = classify(
            &set(&["carol"]),
            &special,
            Some(&priority),
            &story(Some(3)),
        )
        .unwrap();
        assert_eq!(intent.urgency, Urgency::Special);
    }

    #[test]
    fn test_near_expiry_flag_carried() {
        let intent =
            classify(&set(&["dave"]), &set(&[]), None, &story(Some(23))).unwrap();
        assert!(intent.near_expiry);

        let intent = classify(&set(&["dave"]), &set(&[]), None, &story(Some(5))).unwrap();
        assert!(!intent.near_expiry);
    }
}
