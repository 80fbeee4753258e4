// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A wall clock driven by tokio's clock.

use chrono::{DateTime, TimeDelta, Utc};
use digestbot_core::Clock;
use tokio::time::Instant;

/// Reports `base` plus the tokio time elapsed since construction.
///
/// Under `#[tokio::test(start_paused = true)]` tokio auto-advances its clock
/// whenever every task is asleep, so loops that sleep on tokio timers and
/// read wall time from this clock see both move together.
#[derive(Debug, Clone, Copy)]
pub struct PausedClock {
    base: DateTime<Utc>,
    started: Instant,
}

impl PausedClock {
    pub fn starting_at(base: DateTime<Utc>) -> Self {
        Self {
            base,
            started: Instant::now(),
        }
    }
}

impl Clock for PausedClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.started.elapsed()).unwrap_or(TimeDelta::MAX);
        self.base + elapsed
    }
}
