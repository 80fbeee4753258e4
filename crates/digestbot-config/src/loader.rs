// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./digestbot.toml` > `~/.config/digestbot/digestbot.toml`
//! > `/etc/digestbot/digestbot.toml` with environment variable overrides via the
//! `DIGESTBOT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DigestConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/digestbot/digestbot.toml";
pub(crate) const LOCAL_CONFIG: &str = "digestbot.toml";

pub(crate) fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("digestbot/digestbot.toml"))
        .unwrap_or_default()
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/digestbot/digestbot.toml` (system-wide)
/// 3. `~/.config/digestbot/digestbot.toml` (user XDG config)
/// 4. `./digestbot.toml` (local directory)
/// 5. `DIGESTBOT_*` environment variables
pub fn load_config() -> Result<DigestConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<DigestConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DigestConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DigestConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DigestConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DigestConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `DIGESTBOT_TIMERS_MAX_TIMERS_PER_USER` must map to
/// `timers.max_timers_per_user`.
fn env_provider() -> Env {
    Env::prefixed("DIGESTBOT_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("timers_", "timers.", 1);
        mapped.into()
    })
}
