//! Configuration loading.
//!
//! Settings come from a TOML file (`--config` flag, else
//! `~/.config/storywatch/config.toml`) with a couple of environment
//! overrides for deployment convenience. Everything is resolved once at
//! startup into an immutable `RunConfig`; there is no hot reload.

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use storywatch_core::{ActiveWindow, RunConfig, Username, WatchError, WatchResult};
use tracing::debug;

/// Environment override for the monitored account.
pub const ENV_ACCOUNT: &str = "STORYWATCH_ACCOUNT";

/// Environment override for the seen-state file path.
pub const ENV_STATE_PATH: &str = "STORYWATCH_STATE";

/// Raw TOML shape; every field optional so a partial file works.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub target_account: Option<String>,
    pub window_start_hour: Option<u32>,
    pub window_end_hour: Option<u32>,
    pub base_interval_secs: Option<u64>,
    pub jitter_secs: Option<u64>,
    pub keep_alive_secs: Option<u64>,
    pub nav_retry_limit: Option<u32>,
    pub special_users: Option<Vec<String>>,
    pub priority_user: Option<String>,
    pub seen_state_path: Option<PathBuf>,
}

/// Fully resolved settings: the validated run config plus daemon paths.
#[derive(Debug, Clone)]
pub struct Settings {
    pub run: RunConfig,
    pub seen_state_path: PathBuf,
}

/// Default config file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join("storywatch")
        .join("config.toml")
}

/// Default seen-state file location.
pub fn default_state_path() -> PathBuf {
    dirs::state_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("storywatch")
        .join("seen.json")
}

impl ConfigFile {
    /// Reads and parses the file at `path`. A missing file yields defaults;
    /// a present-but-invalid file is a configuration error (fatal).
    pub fn read(path: &Path) -> WatchResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file absent, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| {
            WatchError::configuration(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// Resolves the file plus environment overrides into settings.
    pub fn resolve(self) -> WatchResult<Settings> {
        let target_account = env::var(ENV_ACCOUNT)
            .ok()
            .or(self.target_account)
            .unwrap_or_default();

        let defaults = RunConfig::default();
        let run = RunConfig {
            target_account,
            window: ActiveWindow::new(
                self.window_start_hour.unwrap_or(0),
                self.window_end_hour.unwrap_or(0),
            ),
            base_interval: self
                .base_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.base_interval),
            jitter: self
                .jitter_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.jitter),
            keep_alive_interval: self
                .keep_alive_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.keep_alive_interval),
            nav_retry_limit: self.nav_retry_limit.unwrap_or(defaults.nav_retry_limit),
            special_users: self
                .special_users
                .unwrap_or_default()
                .iter()
                .filter(|s| !s.trim().is_empty())
                .map(Username::new)
                .collect::<BTreeSet<_>>(),
            priority_user: self.priority_user.as_deref().map(Username::new),
        };

        run.validate()?;

        let seen_state_path = env::var(ENV_STATE_PATH)
            .ok()
            .map(PathBuf::from)
            .or(self.seen_state_path)
            .unwrap_or_else(default_state_path);

        Ok(Settings {
            run,
            seen_state_path,
        })
    }
}

/// Convenience: read + resolve in one step.
pub fn load(path: Option<&Path>) -> WatchResult<Settings> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    ConfigFile::read(&path)?.resolve()
}
