//! Error taxonomy for the monitoring loop.
//!
//! The loop distinguishes failures by what the caller does next:
//! - `Session`: transient navigation/session hiccup, retried with backoff
//! - `Extraction`: a field or element could not be read, story yields
//!   nothing this cycle and the loop advances
//! - `Configuration`: fatal at startup, before the loop is entered
//! - `Persistence`: store read/write failure; reads fall back to an empty
//!   store, writes keep in-memory state and retry on the next mutation
//! - `Notification`: transport failure, logged and never retried inline

use thiserror::Error;

/// Errors that can occur while monitoring.
#[derive(Error, Debug)]
pub enum WatchError {
    /// Transient session or navigation failure (retryable).
    #[error("session error: {reason}")]
    Session { reason: String },

    /// A selector or field could not be extracted (not retried).
    #[error("extraction miss: {what}")]
    Extraction { what: String },

    /// Invalid or missing configuration (fatal at startup).
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// Seen-state store read/write failure.
    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// Seen-state store contents could not be decoded.
    #[error("persistence decode error: {0}")]
    PersistenceDecode(#[from] serde_json::Error),

    /// Notification transport failure (best-effort, logged only).
    #[error("notification error: {reason}")]
    Notification { reason: String },
}

impl WatchError {
    pub fn session(reason: impl Into<String>) -> Self {
        Self::Session {
            reason: reason.into(),
        }
    }

    pub fn extraction(what: impl Into<String>) -> Self {
        Self::Extraction { what: what.into() }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn notification(reason: impl Into<String>) -> Self {
        Self::Notification {
            reason: reason.into(),
        }
    }
}

/// Result type for monitoring operations.
pub type WatchResult<T> = Result<T, WatchError>;
