// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timer loops for digestbot.
//!
//! Two cooperative loops share one [`TimerStore`](digestbot_core::TimerStore):
//!
//! - [`Scheduler`] waits for the nearest due timer, re-parses and executes its
//!   stored command, delivers the reply and advances `next_start` by `delta`.
//! - [`RecoveryWorker`] periodically fast-forwards timers that fell more than
//!   the overdue threshold behind, sending one "missed tick" notice each.
//!
//! Neither loop holds a lock. The store's conditional `advance_next_start`
//! update is the only coordination between loops and between replicas.

pub mod recovery;
pub mod scheduler;

use std::future::Future;
use std::time::Duration;

use digestbot_core::DigestError;

pub use recovery::{RecoveryReport, RecoveryWorker, catch_up};
pub use scheduler::{Delivery, FireReport, Poll, Reschedule, Scheduler};

/// Run `fut` with a deadline. An elapsed deadline becomes [`DigestError::Timeout`].
pub(crate) async fn with_deadline<T, F>(limit: Duration, fut: F) -> Result<T, DigestError>
where
    F: Future<Output = Result<T, DigestError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| DigestError::Timeout { duration: limit })?
}
