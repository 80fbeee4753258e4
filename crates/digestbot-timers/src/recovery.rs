// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Missed-tick recovery.
//!
//! Timers whose `next_start` is older than the overdue threshold are skipped
//! by the [`Scheduler`](crate::Scheduler). This worker moves each of them to
//! its first tick at or after now, in one step, and tells the owner once.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use digestbot_config::model::TimersConfig;
use digestbot_core::{
    ChannelAdapter, Clock, DigestError, OutboundMessage, Timer, TimerStore, display_utc,
    schedulable,
};

use crate::scheduler::overdue_border;
use crate::with_deadline;

/// The first tick `next_start + k * delta` (k >= 0) that is not before `now`.
///
/// Returns `None` for a non-positive `delta` or when the result falls outside
/// the [`schedulable`] range.
pub fn catch_up(
    next_start: DateTime<Utc>,
    delta: TimeDelta,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let step = delta.num_milliseconds();
    if step <= 0 {
        return None;
    }
    if next_start >= now {
        return Some(next_start);
    }

    let behind = now - next_start;
    let mut behind_ms = behind.num_milliseconds();
    if TimeDelta::try_milliseconds(behind_ms).is_some_and(|whole| whole < behind) {
        behind_ms += 1;
    }

    let ticks = behind_ms / step + i64::from(behind_ms % step != 0);
    let offset = ticks.checked_mul(step).and_then(TimeDelta::try_milliseconds)?;
    next_start.checked_add_signed(offset).and_then(schedulable)
}

/// Counters for one recovery cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub examined: usize,
    pub advanced: usize,
    /// Timers deleted by their owner before they could be advanced.
    pub vanished: usize,
    pub failed: usize,
}

pub struct RecoveryWorker {
    config: TimersConfig,
    store: Arc<dyn TimerStore>,
    channel: Arc<dyn ChannelAdapter>,
    clock: Arc<dyn Clock>,
}

impl RecoveryWorker {
    pub fn new(
        config: TimersConfig,
        store: Arc<dyn TimerStore>,
        channel: Arc<dyn ChannelAdapter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            channel,
            clock,
        }
    }

    /// Run a cycle now, then one every `recovery_interval_secs`, until
    /// `cancel` fires. A failed cycle is logged and the next one still runs.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.recovery_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            recovery_interval_secs = self.config.recovery_interval_secs,
            "recovery worker started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.run_once().await {
                        Ok(report) if report.examined > 0 => {
                            info!(
                                examined = report.examined,
                                advanced = report.advanced,
                                vanished = report.vanished,
                                failed = report.failed,
                                "recovery cycle complete"
                            );
                        }
                        Ok(_) => debug!("no overdue timers"),
                        Err(e) => warn!(error = %e, "recovery cycle failed"),
                    }
                }
                _ = cancel.cancelled() => {
                    info!("recovery worker shutting down");
                    break;
                }
            }
        }
    }

    /// One recovery cycle. Only the overdue query itself can fail the cycle;
    /// per-timer failures are counted and skipped.
    pub async fn run_once(&self) -> Result<RecoveryReport, DigestError> {
        let now = self.clock.now();
        let border = overdue_border(now, &self.config);
        let overdue = with_deadline(
            self.config.request_timeout(),
            self.store.find_overdue(border),
        )
        .await?;

        let mut report = RecoveryReport::default();
        for timer in overdue {
            report.examined += 1;

            let Some(target) = catch_up(timer.next_start, timer.delta, now) else {
                warn!(
                    timer = %timer.timer_name,
                    username = %timer.username,
                    delta_secs = timer.delta.num_seconds(),
                    "cannot compute catch-up tick, skipping"
                );
                report.failed += 1;
                continue;
            };

            let update = with_deadline(
                self.config.request_timeout(),
                self.store
                    .advance_next_start(&timer.username, &timer.timer_name, target),
            )
            .await;

            match update {
                Ok(true) => {
                    report.advanced += 1;
                    info!(
                        timer = %timer.timer_name,
                        username = %timer.username,
                        missed_since = %timer.next_start,
                        next_start = %target,
                        "overdue timer caught up"
                    );
                    self.notify(&timer, target).await;
                }
                Ok(false) => {
                    report.vanished += 1;
                    debug!(timer = %timer.timer_name, "overdue timer was deleted or already advanced");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        timer = %timer.timer_name,
                        username = %timer.username,
                        error = %e,
                        "failed to advance overdue timer"
                    );
                }
            }
        }

        Ok(report)
    }

    async fn notify(&self, timer: &Timer, target: DateTime<Utc>) {
        let message = OutboundMessage::new(timer.channel_id.as_str(), missed_tick_text(timer, target));
        if let Err(e) = with_deadline(self.config.request_timeout(), self.channel.send(message)).await
        {
            warn!(
                timer = %timer.timer_name,
                username = %timer.username,
                error = %e,
                "missed tick notice not delivered"
            );
        }
    }
}

fn missed_tick_text(timer: &Timer, target: DateTime<Utc>) -> String {
    format!(
        "Due to bot being offline or other reasons timer {} of user <@{}> missed its tick. \
         Timer's new next start is: {} UTC",
        timer.timer_name,
        timer.username,
        display_utc(target)
    )
}
