//! storywatch core - domain types and engines for story viewer monitoring.
//!
//! This crate holds the pure parts of the system: viewer diffing, special-
//! user presence tracking, notification classification, the hourly reporting
//! aggregate and the active-window gate. Nothing here does I/O or touches an
//! async runtime; the daemon crate (`storywatchd`) wires these engines into
//! the run loop.

pub mod config;
pub mod diff;
pub mod error;
pub mod report;
pub mod rules;
pub mod story;
pub mod tracker;
pub mod username;
pub mod window;

// Re-exports for convenience
pub use config::RunConfig;
pub use error::{WatchError, WatchResult};
pub use report::{DigestPayload, HourlyAggregate};
pub use rules::{classify, NotificationIntent, Urgency};
pub use story::{relative_age_label, StoryId, StoryInfo, NEAR_EXPIRY_HOURS};
pub use tracker::{PresenceChange, SpecialTracker};
pub use username::Username;
pub use window::ActiveWindow;
