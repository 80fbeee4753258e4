// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the adapters, the command layer and the timer loops.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier assigned to a delivered message by the channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
}

/// A reply to be delivered to a chat channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub channel_id: String,
    pub text: String,
}

impl OutboundMessage {
    pub fn new(channel_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            text: text.into(),
        }
    }
}

/// Who asked for a command, where, and with what text.
///
/// Live chat messages and fired timers both produce one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub channel_id: String,
    pub username: String,
    pub text: String,
}

impl CommandRequest {
    pub fn new(
        channel_id: impl Into<String>,
        username: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            username: username.into(),
            text: text.into(),
        }
    }
}

/// A recurring request to run a stored command for its owner.
///
/// `(username, timer_name)` identifies a timer. `next_start` is kept at
/// millisecond precision so it survives a round trip through storage
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    pub channel_id: String,
    pub username: String,
    pub timer_name: String,
    pub delta: TimeDelta,
    pub next_start: DateTime<Utc>,
    pub top_command: String,
}

impl Timer {
    pub fn new(
        channel_id: impl Into<String>,
        username: impl Into<String>,
        timer_name: impl Into<String>,
        delta: TimeDelta,
        next_start: DateTime<Utc>,
        top_command: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            username: username.into(),
            timer_name: timer_name.into(),
            delta,
            next_start: next_start.trunc_subsecs(3),
            top_command: top_command.into(),
        }
    }

    /// The tick after `next_start`, or `None` if it falls outside the
    /// [`schedulable`] range.
    pub fn following_start(&self) -> Option<DateTime<Utc>> {
        self.next_start
            .checked_add_signed(self.delta)
            .and_then(schedulable)
    }
}

/// 0000-01-01T00:00:00.000Z in epoch milliseconds.
pub const EARLIEST_START_MILLIS: i64 = -62_167_219_200_000;

/// 9999-12-31T23:59:59.999Z in epoch milliseconds.
pub const LATEST_START_MILLIS: i64 = 253_402_300_799_999;

/// `ts` if a timer may be scheduled at it.
///
/// Stored timestamps are compared as text, which only orders correctly while
/// the year has exactly four digits.
pub fn schedulable(ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
    (EARLIEST_START_MILLIS..=LATEST_START_MILLIS)
        .contains(&ts.timestamp_millis())
        .then_some(ts)
}

/// Render a timestamp the way replies show it, e.g. `2026-03-01 10:00:00`.
///
/// Callers append the ` UTC` suffix.
pub fn display_utc(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}
