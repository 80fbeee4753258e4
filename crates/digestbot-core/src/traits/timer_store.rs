// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence contract for timers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DigestError;
use crate::types::Timer;

/// Durable timer storage shared by the scheduler, the recovery worker and
/// the `timers` commands.
///
/// Implementations are the only mutual exclusion between loops and between
/// replicas: `create` must check the per-user cap and insert in one atomic
/// step, and `advance_next_start` must report whether a row was touched.
#[async_trait]
pub trait TimerStore: Send + Sync {
    /// The timer with the smallest `next_start` strictly after `after`.
    async fn find_nearest_due(&self, after: DateTime<Utc>) -> Result<Option<Timer>, DigestError>;

    /// Every timer whose `next_start` is strictly before `before`.
    async fn find_overdue(&self, before: DateTime<Utc>) -> Result<Vec<Timer>, DigestError>;

    /// Move a timer's `next_start` forward. `Ok(false)` when no row was
    /// affected, which means the timer was deleted or already moved past
    /// `new_next_start`.
    async fn advance_next_start(
        &self,
        username: &str,
        timer_name: &str,
        new_next_start: DateTime<Utc>,
    ) -> Result<bool, DigestError>;

    /// Insert `timer` unless its owner already has `max_per_user` timers or
    /// one with the same name. `Ok(false)` when the insert was refused.
    async fn create(&self, timer: &Timer, max_per_user: u32) -> Result<bool, DigestError>;

    /// `Ok(false)` when no such timer existed.
    async fn delete(&self, username: &str, timer_name: &str) -> Result<bool, DigestError>;

    async fn exists(&self, username: &str, timer_name: &str) -> Result<bool, DigestError>;

    async fn count_for_user(&self, username: &str) -> Result<u32, DigestError>;

    /// The user's timers ordered by `next_start`.
    async fn list_for_user(&self, username: &str) -> Result<Vec<Timer>, DigestError>;
}
