// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths and interval lower bounds.

use crate::diagnostic::ConfigError;
use crate::model::DigestConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &DigestConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(format!(
            "agent.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.agent.log_level
        ));
    }

    let timers = &config.timers;
    for (key, value) in [
        ("overdue_minutes", timers.overdue_minutes),
        ("poll_interval_secs", timers.poll_interval_secs),
        ("request_timeout_secs", timers.request_timeout_secs),
        ("recovery_interval_secs", timers.recovery_interval_secs),
    ] {
        if value < 1 {
            fail(format!("timers.{key} must be at least 1, got {value}"));
        }
    }

    // A timer further away than the slack always gets a non-zero sleep.
    if timers.wake_buffer_secs >= timers.wait_slack_secs {
        fail(format!(
            "timers.wake_buffer_secs ({}) must be less than timers.wait_slack_secs ({})",
            timers.wake_buffer_secs, timers.wait_slack_secs
        ));
    }

    if timers.max_timers_per_user < 1 {
        fail("timers.max_timers_per_user must be at least 1".to_string());
    }

    if timers.min_frequency_secs < 60 {
        fail(format!(
            "timers.min_frequency_secs must be at least 60, got {}",
            timers.min_frequency_secs
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
