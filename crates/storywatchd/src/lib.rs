//! storywatch daemon - the monitoring loop and its plumbing.
//!
//! This crate wires the pure engines from `storywatch-core` into a
//! long-running daemon:
//! - `watcher` - the cycle scheduler / run loop
//! - `store` - durable seen-state (story id -> reported usernames)
//! - `source` - the story source seam the browser-automation layer implements
//! - `notify` / `render` - notification seam and templating
//! - `audit` - optional audit store seam
//! - `progress` - fire-and-forget progress events for host applications
//! - `config` - TOML + environment configuration
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     storywatchd                          │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  ┌───────────┐   stories/viewers   ┌──────────────────┐  │
//! │  │  Watcher  │◀───────────────────▶│   StorySource    │  │
//! │  │ (run loop)│                     │ (external seam)  │  │
//! │  └─────┬─────┘                     └──────────────────┘  │
//! │        │ intents/digests                                 │
//! │        ▼                                                 │
//! │  ┌───────────┐    ┌───────────┐    ┌──────────────────┐  │
//! │  │ Notifier  │    │ SeenStore │    │ ProgressSender   │  │
//! │  │  (seam)   │    │  (JSON)   │    │  (broadcast)     │  │
//! │  └───────────┘    └───────────┘    └──────────────────┘  │
//! │                                                          │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod audit;
pub mod config;
pub mod notify;
pub mod progress;
pub mod render;
pub mod source;
pub mod store;
pub mod watcher;
