//! Cycle scheduler and run loop.
//!
//! One logical worker drives everything: window gate, profile navigation
//! with bounded backoff, traversal of every open story, end-of-cycle
//! presence reconciliation, then a jittered sleep with keep-alive probes.
//! Cancellation is cooperative and polled at the window check, cycle start,
//! after each story, and at every sleep slice, so stop latency is bounded by
//! one story step or one keep-alive tick.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Timelike};
use rand::Rng;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use storywatch_core::{
    classify, diff, DigestPayload, HourlyAggregate, PresenceChange, RunConfig, SpecialTracker,
    StoryId, Username, WatchError, WatchResult,
};

use crate::audit::AuditStore;
use crate::notify::Notifier;
use crate::progress::{ProgressEvent, ProgressSender};
use crate::render;
use crate::source::StorySource;
use crate::store::SeenStore;

/// How often the hourly digest fires.
pub const DIGEST_INTERVAL: Duration = Duration::from_secs(3600);

/// Consecutive navigation-failed cycles before the session is considered
/// lost and the process ends (after persisting state).
pub const MAX_FAILED_CYCLES: u32 = 3;

/// Ceiling for the navigation backoff. The retry limit is operator-settable,
/// so the exponential curve must stay in seconds no matter how high it goes.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Outcome of one cycle.
#[derive(Debug, PartialEq, Eq)]
enum CycleOutcome {
    /// Full traversal completed (possibly zero stories with usable ids).
    Completed,
    /// No story could be opened this cycle.
    NoStory,
    /// Profile navigation retries were exhausted; the cycle was given up.
    NavFailed,
    /// Stop signal observed mid-cycle.
    Cancelled,
}

/// The monitoring loop. Owns every mutable piece of state: the seen store,
/// the presence tracker and the hourly aggregate have no other writers.
pub struct Watcher<S: StorySource> {
    config: RunConfig,
    source: S,
    store: SeenStore,
    notifier: Arc<dyn Notifier>,
    audit: Option<Arc<dyn AuditStore>>,
    tracker: SpecialTracker,
    aggregate: HourlyAggregate,
    progress: ProgressSender,
    last_digest: Instant,
    last_total_viewers: Option<usize>,
    last_story: Option<(StoryId, String)>,
}

impl<S: StorySource> Watcher<S> {
    pub fn new(config: RunConfig, source: S, store: SeenStore, notifier: Arc<dyn Notifier>) -> Self {
        let tracker = SpecialTracker::new(config.special_users.iter().cloned());
        Self {
            config,
            source,
            store,
            notifier,
            audit: None,
            tracker,
            aggregate: HourlyAggregate::new(),
            progress: ProgressSender::new(),
            last_digest: Instant::now(),
            last_total_viewers: None,
            last_story: None,
        }
    }

    /// Attaches an optional audit backend.
    pub fn with_audit(mut self, audit: Arc<dyn AuditStore>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Handle for subscribing to progress events.
    pub fn progress(&self) -> ProgressSender {
        self.progress.clone()
    }

    /// Runs until the stop signal is set or the session is lost for good.
    ///
    /// On every exit path the seen store is flushed and the source session
    /// released exactly once.
    pub async fn run(mut self, cancel: CancellationToken) -> WatchResult<()> {
        info!(
            account = %self.config.target_account,
            window_start = self.config.window.start_hour,
            window_end = self.config.window.end_hour,
            special_users = self.config.special_users.len(),
            "watcher starting"
        );

        let result = self.run_inner(&cancel).await;

        if self.store.is_dirty() {
            if let Err(e) = self.store.save() {
                error!(error = %e, "final seen store flush failed");
            }
        }
        self.source.close().await;
        info!("watcher stopped");

        result
    }

    async fn run_inner(&mut self, cancel: &CancellationToken) -> WatchResult<()> {
        let mut failed_cycles: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            if !self.await_window(cancel).await {
                return Ok(());
            }

            if cancel.is_cancelled() {
                return Ok(());
            }

            if self.last_digest.elapsed() >= DIGEST_INTERVAL {
                self.send_digest().await;
                self.last_digest = Instant::now();
            }

            match self.run_cycle(cancel).await {
                CycleOutcome::Cancelled => return Ok(()),
                CycleOutcome::Completed | CycleOutcome::NoStory => {
                    failed_cycles = 0;
                }
                CycleOutcome::NavFailed => {
                    failed_cycles += 1;
                    if failed_cycles >= MAX_FAILED_CYCLES {
                        error!(
                            failed_cycles,
                            "session appears lost, ending the process"
                        );
                        return Err(WatchError::session(
                            "profile navigation failed across consecutive cycles",
                        ));
                    }
                }
            }

            if !self.sleep_between_cycles(cancel).await {
                return Ok(());
            }
        }
    }

    /// Blocks until the active window is open. Returns false on cancellation.
    async fn await_window(&self, cancel: &CancellationToken) -> bool {
        let now = Local::now();
        let wait = self
            .config
            .window
            .seconds_until_open(now.hour(), now.minute(), now.second());
        if wait == 0 {
            return true;
        }

        info!(wait_secs = wait, "outside active window, sleeping until it opens");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = sleep(Duration::from_secs(wait)) => true,
        }
    }

    /// One full traversal of all open stories.
    ///
    /// Errors during viewer or story-info extraction mean "this story
    /// yielded nothing useful" and the traversal advances; only repeated
    /// profile-navigation failure escalates out of the loop.
    async fn run_cycle(&mut self, cancel: &CancellationToken) -> CycleOutcome {
        // OPEN_PROFILE with bounded exponential backoff.
        let mut attempt: u32 = 0;
        while !self.source.open_profile().await {
            attempt += 1;
            if attempt >= self.config.nav_retry_limit {
                warn!(
                    attempts = attempt,
                    "profile navigation retries exhausted, giving up this cycle"
                );
                self.progress.emit(ProgressEvent::unavailable());
                return CycleOutcome::NavFailed;
            }
            let backoff = nav_backoff(attempt);
            warn!(attempt, backoff_secs = backoff.as_secs(), "profile navigation failed, backing off");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return CycleOutcome::Cancelled,
                _ = sleep(backoff) => {}
            }
        }

        // OPEN_STORY
        if !self.source.open_latest_story().await {
            info!("no story available this cycle");
            self.progress.emit(ProgressEvent::unavailable());
            return CycleOutcome::NoStory;
        }

        // TRAVERSE_STORY
        let mut cycle_union: BTreeSet<Username> = BTreeSet::new();
        loop {
            self.process_story(&mut cycle_union).await;

            if cancel.is_cancelled() {
                return CycleOutcome::Cancelled;
            }
            if !self.source.advance_to_next().await {
                break;
            }
        }

        // CYCLE_END: presence is reconciled against the union across all
        // stories, never per story.
        self.reconcile_presence(&cycle_union).await;

        CycleOutcome::Completed
    }

    /// Processes the currently open story: diff, notify, persist, report.
    async fn process_story(&mut self, cycle_union: &mut BTreeSet<Username>) {
        let story = self.source.story_info().await;
        let Some(story_id) = story.id.clone() else {
            warn!("story identity unavailable, skipping story");
            // The sink still gets its per-story snapshot, with sentinels.
            self.progress.emit(ProgressEvent::unavailable());
            return;
        };

        let viewers = self.source.fetch_viewers().await;
        cycle_union.extend(viewers.iter().cloned());

        self.last_total_viewers = Some(viewers.len());
        self.last_story = Some((story_id.clone(), story.relative_age.clone()));

        let seen = self.store.seen_for(&story_id);
        let new = diff::new_viewers(&viewers, &seen);

        if new.is_empty() {
            debug!(story_id = %story_id, viewers = viewers.len(), "no new viewers");
        } else {
            info!(
                story_id = %story_id,
                new_viewers = new.len(),
                total = viewers.len(),
                "new viewers detected"
            );

            if let Some(intent) = classify(
                &new,
                &self.config.special_users,
                self.config.priority_user.as_ref(),
                &story,
            ) {
                let (subject, body) = render::render_intent(&intent, self.config.priority_user.as_ref());
                if let Err(e) = self.notifier.send(&subject, &body, true).await {
                    warn!(error = %e, "new-viewer notification failed");
                }
                self.aggregate.record(new.iter().cloned(), std::iter::empty());
            }

            // Seen set is unioned with the full snapshot, never shrunk.
            self.store.record(&story_id, &viewers);

            if let Some(audit) = &self.audit {
                if let Err(e) = audit.record_views(&new, &story_id, viewers.len()).await {
                    warn!(error = %e, "audit record failed");
                }
            }
        }

        self.progress.emit(ProgressEvent {
            last_check: Local::now(),
            total_viewers: Some(viewers.len()),
            story_age: Some(story.relative_age),
        });
    }

    /// Applies the cycle-wide viewer union to the presence tracker and acts
    /// on the resulting transitions.
    async fn reconcile_presence(&mut self, cycle_union: &BTreeSet<Username>) {
        for change in self.tracker.observe_cycle(cycle_union) {
            match change {
                PresenceChange::Disappeared(user) => {
                    info!(user = %user, "special user disappeared, possible block");
                    let (subject, body) = render::render_disappearance(&user);
                    if let Err(e) = self.notifier.send(&subject, &body, true).await {
                        warn!(error = %e, "disappearance notification failed");
                    }
                }
                PresenceChange::Appeared(user) => {
                    debug!(user = %user, "special user sighted this cycle");
                    self.aggregate.record(std::iter::empty(), [user]);
                }
            }
        }
    }

    /// Flushes and sends the hourly digest, quiet hours included.
    async fn send_digest(&mut self) {
        let (story_id, relative_age) = match &self.last_story {
            Some((id, age)) => (Some(id.clone()), Some(age.clone())),
            None => (None, None),
        };
        let digest: DigestPayload =
            self.aggregate
                .flush(self.last_total_viewers, story_id, relative_age);

        info!(
            new_viewers = digest.new_viewers.len(),
            quiet = digest.is_quiet(),
            "sending hourly digest"
        );

        let (subject, body) = render::render_digest(&digest);
        if let Err(e) = self.notifier.send(&subject, &body, true).await {
            warn!(error = %e, "digest notification failed");
        }
    }

    /// Jittered inter-cycle sleep, sliced at the keep-alive interval so the
    /// session stays warm. Returns false on cancellation.
    async fn sleep_between_cycles(&mut self, cancel: &CancellationToken) -> bool {
        let total = self.config.base_interval + sample_jitter(self.config.jitter);
        debug!(sleep_secs = total.as_secs(), "sleeping until next cycle");

        let mut remaining = total;
        while !remaining.is_zero() {
            let slice = remaining.min(self.config.keep_alive_interval);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return false,
                _ = sleep(slice) => {}
            }
            remaining = remaining.saturating_sub(slice);

            if !remaining.is_zero() && !self.source.keep_alive().await {
                // Probe failure never aborts the sleep.
                warn!("keep-alive probe failed");
            }
        }
        true
    }
}

/// Exponential navigation backoff, capped at `MAX_BACKOFF`.
fn nav_backoff(attempt: u32) -> Duration {
    let secs = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_secs(secs).min(MAX_BACKOFF)
}

/// Uniform jitter in `[0, jitter]`.
fn sample_jitter(jitter: Duration) -> Duration {
    if jitter.is_zero() {
        return Duration::ZERO;
    }
    let millis = rand::thread_rng().gen_range(0..=jitter.as_millis() as u64);
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_jitter_within_bounds() {
        let jitter = Duration::from_secs(10);
        for _ in 0..100 {
            let sampled = sample_jitter(jitter);
            assert!(sampled <= jitter);
        }
    }

    #[test]
    fn test_sample_jitter_zero() {
        assert_eq!(sample_jitter(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_digest_interval_is_one_hour() {
        assert_eq!(DIGEST_INTERVAL, Duration::from_secs(3600));
    }

    #[test]
    fn test_nav_backoff_doubles_then_caps() {
        assert_eq!(nav_backoff(1), Duration::from_secs(2));
        assert_eq!(nav_backoff(2), Duration::from_secs(4));
        assert_eq!(nav_backoff(4), Duration::from_secs(16));
        assert_eq!(nav_backoff(5), MAX_BACKOFF);
        assert_eq!(nav_backoff(20), MAX_BACKOFF);
    }

    #[test]
    fn test_nav_backoff_survives_huge_attempt_counts() {
        // Shift widths past 63 must not overflow; they just hit the cap.
        assert_eq!(nav_backoff(63), MAX_BACKOFF);
        assert_eq!(nav_backoff(64), MAX_BACKOFF);
        assert_eq!(nav_backoff(200), MAX_BACKOFF);
    }
}
