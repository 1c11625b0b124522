//! Notification transport seam.
//!
//! Delivery is best-effort: the loop logs a failed send and moves on, it
//! never retries inline and never blocks on the transport.

use async_trait::async_trait;
use storywatch_core::WatchResult;
use tracing::info;

/// Pluggable notification backend.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one notification. `structured` marks an HTML body.
    async fn send(&self, subject: &str, body: &str, structured: bool) -> WatchResult<()>;
}

/// Default backend: writes notifications to the log stream.
///
/// Stands in wherever a real transport (SMTP relay, webhook) is not
/// configured, so the loop always has somewhere to hand intents.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, subject: &str, body: &str, structured: bool) -> WatchResult<()> {
        info!(
            subject = subject,
            structured = structured,
            body_len = body.len(),
            "notification"
        );
        Ok(())
    }
}

/// No-op backend for tests.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, _subject: &str, _body: &str, _structured: bool) -> WatchResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let n = LogNotifier;
        assert!(n.send("subject", "body", false).await.is_ok());
    }

    #[tokio::test]
    async fn test_noop_notifier() {
        let n = NoopNotifier;
        assert!(n.send("s", "<p>b</p>", true).await.is_ok());
    }
}
