//! Immutable run configuration.
//!
//! Built once at process start and passed by reference into the scheduler;
//! there is no ambient global state and no hot reload.

use crate::{ActiveWindow, Username, WatchError, WatchResult};
use std::collections::BTreeSet;
use std::time::Duration;

/// Default keep-alive probe interval during sleeps.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);

/// Default bounded retry count for profile navigation.
pub const DEFAULT_NAV_RETRIES: u32 = 3;

/// Everything the scheduler needs, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Account whose stories are monitored.
    pub target_account: String,

    /// Daily hours during which cycles may run.
    pub window: ActiveWindow,

    /// Base sleep between cycles.
    pub base_interval: Duration,

    /// Upper bound of the uniform jitter added to each sleep.
    pub jitter: Duration,

    /// Interval between keep-alive probes while sleeping.
    pub keep_alive_interval: Duration,

    /// Attempts before profile navigation is given up for the cycle.
    pub nav_retry_limit: u32,

    /// Usernames whose activity is tracked and escalated (case-folded).
    pub special_users: BTreeSet<Username>,

    /// Single distinguished member of the special set, if any.
    pub priority_user: Option<Username>,
}

impl RunConfig {
    /// Checks invariants that would otherwise surface mid-loop.
    ///
    /// Fatal at startup: the loop is never entered with a bad config.
    pub fn validate(&self) -> WatchResult<()> {
        if self.target_account.trim().is_empty() {
            return Err(WatchError::configuration("target account is required"));
        }
        if self.window.start_hour >= 24 || self.window.end_hour >= 24 {
            return Err(WatchError::configuration(format!(
                "window hours must be 0-23, got {}..{}",
                self.window.start_hour, self.window.end_hour
            )));
        }
        if self.base_interval.is_zero() {
            return Err(WatchError::configuration("base interval must be non-zero"));
        }
        if self.keep_alive_interval.is_zero() {
            return Err(WatchError::configuration(
                "keep-alive interval must be non-zero",
            ));
        }
        if let Some(priority) = &self.priority_user {
            if !self.special_users.contains(priority) {
                return Err(WatchError::configuration(format!(
                    "priority user '{priority}' is not in the special user set"
                )));
            }
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_account: String::new(),
            window: ActiveWindow::default(),
            base_interval: Duration::from_secs(300),
            jitter: Duration::from_secs(300),
            keep_alive_interval: DEFAULT_KEEP_ALIVE,
            nav_retry_limit: DEFAULT_NAV_RETRIES,
            special_users: BTreeSet::new(),
            priority_user: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RunConfig {
        RunConfig {
            target_account: "someaccount".to_string(),
            special_users: [Username::new("carol")].into_iter().collect(),
            priority_user: Some(Username::new("carol")),
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_missing_account_rejected() {
        let cfg = RunConfig {
            target_account: "  ".to_string(),
            ..valid()
        };
        assert!(matches!(
            cfg.validate(),
            Err(WatchError::Configuration { .. })
        ));
    }

    #[test]
    fn test_out_of_range_hours_rejected() {
        let cfg = RunConfig {
            window: ActiveWindow::new(8, 24),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let cfg = RunConfig {
            base_interval: Duration::ZERO,
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_priority_outside_special_set_rejected() {
        let cfg = RunConfig {
            priority_user: Some(Username::new("stranger")),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_no_priority_user_is_fine() {
        let cfg = RunConfig {
            priority_user: None,
            ..valid()
        };
        assert!(cfg.validate().is_ok());
    }
}
