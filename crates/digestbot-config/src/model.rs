// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for digestbot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Top-level digestbot configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DigestConfig {
    /// Bot identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Scheduler, recovery and timer command settings.
    #[serde(default)]
    pub timers: TimersConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot, used in help text.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "digestbot".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("digestbot").join("digestbot.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("digestbot.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Timer scheduling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TimersConfig {
    /// Age in minutes past which a missed timer belongs to the recovery worker.
    #[serde(default = "default_overdue_minutes")]
    pub overdue_minutes: u64,

    /// Scheduler sleep when nothing is due, and the cap on any single wait.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// A timer this close to its start is fired instead of waited for.
    #[serde(default = "default_wait_slack_secs")]
    pub wait_slack_secs: u64,

    /// How early the scheduler wakes before a far-off timer.
    #[serde(default = "default_wake_buffer_secs")]
    pub wake_buffer_secs: u64,

    /// Period of the recovery worker.
    #[serde(default = "default_recovery_interval_secs")]
    pub recovery_interval_secs: u64,

    /// Timeout applied to every store, executor and channel call from the loops.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of timers one user may own.
    #[serde(default = "default_max_timers_per_user")]
    pub max_timers_per_user: u32,

    /// Timers that recur faster than this are refused.
    #[serde(default = "default_min_frequency_secs")]
    pub min_frequency_secs: u64,
}

impl Default for TimersConfig {
    fn default() -> Self {
        Self {
            overdue_minutes: default_overdue_minutes(),
            poll_interval_secs: default_poll_interval_secs(),
            wait_slack_secs: default_wait_slack_secs(),
            wake_buffer_secs: default_wake_buffer_secs(),
            recovery_interval_secs: default_recovery_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_timers_per_user: default_max_timers_per_user(),
            min_frequency_secs: default_min_frequency_secs(),
        }
    }
}

impl TimersConfig {
    pub fn overdue_threshold(&self) -> TimeDelta {
        i64::try_from(self.overdue_minutes)
            .ok()
            .and_then(TimeDelta::try_minutes)
            .unwrap_or(TimeDelta::MAX)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn wait_slack(&self) -> Duration {
        Duration::from_secs(self.wait_slack_secs)
    }

    pub fn wake_buffer(&self) -> Duration {
        Duration::from_secs(self.wake_buffer_secs)
    }

    pub fn recovery_interval(&self) -> Duration {
        Duration::from_secs(self.recovery_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn min_frequency(&self) -> TimeDelta {
        i64::try_from(self.min_frequency_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

fn default_overdue_minutes() -> u64 {
    10
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_wait_slack_secs() -> u64 {
    5
}

fn default_wake_buffer_secs() -> u64 {
    3
}

fn default_recovery_interval_secs() -> u64 {
    600
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_timers_per_user() -> u32 {
    5
}

fn default_min_frequency_secs() -> u64 {
    3600
}
