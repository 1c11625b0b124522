//! Notification rendering.
//!
//! Turns structured intents and digests into subject/body pairs for the
//! notifier. Pure string assembly, kept apart from the decision logic in
//! `storywatch_core::rules` so the rules stay testable on their own.

use storywatch_core::{DigestPayload, NotificationIntent, Urgency, Username};

/// Renders a new-viewers notification.
///
/// Returns `(subject, body_html)`.
pub fn render_intent(
    intent: &NotificationIntent,
    priority_user: Option<&Username>,
) -> (String, String) {
    let subject = match intent.urgency {
        Urgency::Priority => match priority_user {
            Some(user) => format!("🚨 THEY'RE BACK: {user} just viewed your story!"),
            None => "🚨 Priority viewer on your story!".to_string(),
        },
        Urgency::Special => {
            let names = join_names(intent.special_new.iter());
            format!("🚨 USER ALERT: {names} just viewed your story!")
        }
        Urgency::Routine => "New story viewers".to_string(),
    };

    let mut body = String::new();
    body.push_str("<h2>🚀 New story viewers</h2>\n");
    body.push_str(&format!(
        "<p>This story was published {} ago.</p>\n",
        intent.relative_age
    ));

    if intent.near_expiry {
        body.push_str("<p><strong>⚠️ This story is about to expire!</strong></p>\n");
    }

    if !intent.special_new.is_empty() {
        body.push_str("<h3>Watched users</h3>\n<ul>\n");
        for user in &intent.special_new {
            body.push_str(&format!("<li><strong>🚨 {user}</strong></li>\n"));
        }
        body.push_str("</ul>\n");
    }

    body.push_str("<h3>All new viewers</h3>\n<ul>\n");
    for viewer in &intent.new_viewers {
        body.push_str(&format!("<li>{viewer}</li>\n"));
    }
    body.push_str("</ul>\n");

    (subject, body)
}

/// Renders the hourly digest.
pub fn render_digest(digest: &DigestPayload) -> (String, String) {
    let subject = if digest.is_quiet() {
        "Hourly digest: a quiet hour".to_string()
    } else {
        format!(
            "Hourly digest: {} new viewer(s)",
            digest.new_viewers.len()
        )
    };

    let mut body = String::new();
    if digest.is_quiet() {
        body.push_str("<p>No new viewers this hour.</p>\n");
    } else {
        body.push_str("<h3>New viewers this hour</h3>\n<ul>\n");
        for viewer in &digest.new_viewers {
            body.push_str(&format!("<li>{viewer}</li>\n"));
        }
        body.push_str("</ul>\n");
    }

    if !digest.special_sightings.is_empty() {
        body.push_str(&format!(
            "<p>Watched users sighted: {}</p>\n",
            join_names(digest.special_sightings.iter())
        ));
    }

    if let Some(total) = digest.total_viewers {
        body.push_str(&format!("<p>Current total viewers: {total}</p>\n"));
    }
    if let Some(story_id) = &digest.story_id {
        let age = digest.relative_age.as_deref().unwrap_or("unknown age");
        body.push_str(&format!("<p>Latest story: {story_id} ({age})</p>\n"));
    }

    (subject, body)
}

/// Renders the disappearance ("possible block") alert for one user.
pub fn render_disappearance(user: &Username) -> (String, String) {
    let subject = format!("⚠️ {user} no longer appears among your story viewers");
    let body = format!(
        "<p><strong>{user}</strong> was viewing your stories and has \
         disappeared from every currently open story.</p>\n\
         <p>This can mean a block or restriction, or simply that the \
         stories they viewed have expired.</p>\n"
    );
    (subject, body)
}

fn join_names<'a>(names: impl Iterator<Item = &'a Username>) -> String {
    names
        .map(Username::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn set(names: &[&str]) -> BTreeSet<Username> {
        names.iter().map(|n| Username::new(n)).collect()
    }

    fn intent(urgency: Urgency, new: &[&str], special: &[&str]) -> NotificationIntent {
        NotificationIntent {
            urgency,
            new_viewers: set(new),
            special_new: set(special),
            relative_age: "3 hours".to_string(),
            near_expiry: false,
        }
    }

    #[test]
    fn test_priority_subject_names_user() {
        let priority = Username::new("brenda");
        let (subject, _) = render_intent(
            &intent(Urgency::Priority, &["brenda"], &["brenda"]),
            Some(&priority),
        );
        assert!(subject.contains("brenda"));
        assert!(subject.contains("THEY'RE BACK"));
    }

    #[test]
    fn test_special_subject_names_users() {
        let (subject, _) = render_intent(
            &intent(Urgency::Special, &["carol", "dave"], &["carol"]),
            None,
        );
        assert!(subject.contains("USER ALERT"));
        assert!(subject.contains("carol"));
    }

    #[test]
    fn test_routine_subject_is_plain() {
        let (subject, body) = render_intent(&intent(Urgency::Routine, &["dave"], &[]), None);
        assert_eq!(subject, "New story viewers");
        assert!(body.contains("<li>dave</li>"));
    }

    #[test]
    fn test_near_expiry_warning_in_body() {
        let mut i = intent(Urgency::Routine, &["dave"], &[]);
        i.near_expiry = true;
        let (_, body) = render_intent(&i, None);
        assert!(body.contains("about to expire"));
    }

    #[test]
    fn test_body_lists_full_viewer_set() {
        let (_, body) = render_intent(
            &intent(Urgency::Special, &["carol", "dave", "erin"], &["carol"]),
            None,
        );
        for name in ["carol", "dave", "erin"] {
            assert!(body.contains(&format!("<li>{name}</li>")), "missing {name}");
        }
    }

    #[test]
    fn test_quiet_digest_tone() {
        let digest = DigestPayload {
            new_viewers: BTreeSet::new(),
            special_sightings: BTreeSet::new(),
            window_start: chrono::Utc::now(),
            total_viewers: Some(12),
            story_id: Some(storywatch_core::StoryId::new("s1")),
            relative_age: Some("5 hours".to_string()),
        };
        let (subject, body) = render_digest(&digest);
        assert!(subject.contains("quiet"));
        assert!(body.contains("No new viewers"));
        assert!(body.contains("12"));
    }

    #[test]
    fn test_busy_digest_counts_viewers() {
        let digest = DigestPayload {
            new_viewers: set(&["alice", "bob"]),
            special_sightings: set(&["carol"]),
            window_start: chrono::Utc::now(),
            total_viewers: None,
            story_id: None,
            relative_age: None,
        };
        let (subject, body) = render_digest(&digest);
        assert!(subject.contains("2 new viewer"));
        assert!(body.contains("carol"));
    }

    #[test]
    fn test_disappearance_alert() {
        let (subject, body) = render_disappearance(&Username::new("carol"));
        assert!(subject.contains("carol"));
        assert!(body.contains("block or restriction"));
    }
}
