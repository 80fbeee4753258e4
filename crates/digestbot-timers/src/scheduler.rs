// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The timer fire loop.
//!
//! Each step queries the nearest timer that is not yet overdue and either
//! sleeps (bounded by the poll interval, so a newly created earlier timer is
//! noticed) or fires it. Firing re-parses the stored command, runs it through
//! the [`CommandExecutor`], delivers the reply and advances `next_start` by
//! exactly one `delta`.
//!
//! A reschedule write that times out leaves the timer where it was. The
//! scheduler remembers that tick as delivered, backs off a full poll
//! interval and on the next pass only retries the write.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use digestbot_config::model::TimersConfig;
use digestbot_core::{
    ChannelAdapter, Clock, CommandExecutor, CommandRequest, DigestError, OutboundMessage, Timer,
    TimerStore, display_utc,
};
use digestbot_parser::CommandParser;

use crate::with_deadline;

/// Outcome of one [`Scheduler::poll_once`] step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    /// No timer is pending; the caller sleeps the poll interval.
    Idle,
    /// The nearest timer is not due yet; sleep this long and query again.
    Waiting(Duration),
    /// A timer was fired (or skipped as malformed) and rescheduled.
    Fired(FireReport),
}

/// What happened to the fired timer's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    ExecutorFailed,
    ChannelFailed,
    /// The stored command no longer parses; nothing was executed.
    Malformed,
    /// This tick went out on an earlier pass whose reschedule write timed
    /// out; only the write was retried.
    AlreadySent,
}

/// What happened to the reschedule write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reschedule {
    Advanced,
    /// Zero rows affected: the owner deleted the timer mid-fire.
    Vanished,
    /// The write timed out and will be retried on a later pass without
    /// delivering again.
    TimedOut,
}

/// A tick that was handled but whose reschedule write did not land.
#[derive(Debug, Clone, PartialEq, Eq)]
struct UnsettledTick {
    username: String,
    timer_name: String,
    next_start: DateTime<Utc>,
}

impl UnsettledTick {
    fn of(timer: &Timer) -> Self {
        Self {
            username: timer.username.clone(),
            timer_name: timer.timer_name.clone(),
            next_start: timer.next_start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireReport {
    pub username: String,
    pub timer_name: String,
    pub fired_at: DateTime<Utc>,
    pub next_start: DateTime<Utc>,
    pub delivery: Delivery,
    pub reschedule: Reschedule,
}

/// Fires due timers one at a time.
pub struct Scheduler {
    config: TimersConfig,
    store: Arc<dyn TimerStore>,
    parser: Arc<CommandParser>,
    executor: Arc<dyn CommandExecutor>,
    channel: Arc<dyn ChannelAdapter>,
    clock: Arc<dyn Clock>,
    unsettled: Mutex<Option<UnsettledTick>>,
}

impl Scheduler {
    pub fn new(
        config: TimersConfig,
        store: Arc<dyn TimerStore>,
        parser: Arc<CommandParser>,
        executor: Arc<dyn CommandExecutor>,
        channel: Arc<dyn ChannelAdapter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            parser,
            executor,
            channel,
            clock,
            unsettled: Mutex::new(None),
        }
    }

    /// Run until `cancel` fires or the store fails in a way that makes
    /// continuing unsafe.
    ///
    /// Cancellation is only observed while sleeping, so a fire that has
    /// started always reaches its reschedule write.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), DigestError> {
        info!(
            poll_interval_secs = self.config.poll_interval_secs,
            overdue_minutes = self.config.overdue_minutes,
            "timer scheduler started"
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let pause = match self.poll_once().await {
                Ok(Poll::Idle) => self.config.poll_interval(),
                Ok(Poll::Waiting(pause)) => pause,
                Ok(Poll::Fired(report)) if report.reschedule == Reschedule::TimedOut => {
                    self.config.poll_interval()
                }
                Ok(Poll::Fired(_)) => continue,
                Err(e) => {
                    error!(error = %e, "timer scheduler halted on store failure");
                    return Err(e);
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = cancel.cancelled() => break,
            }
        }

        info!("timer scheduler shutting down");
        Ok(())
    }

    /// One IDLE/WAITING/FIRING step.
    pub async fn poll_once(&self) -> Result<Poll, DigestError> {
        let now = self.clock.now();
        let border = overdue_border(now, &self.config);

        let nearest = match with_deadline(
            self.config.request_timeout(),
            self.store.find_nearest_due(border),
        )
        .await
        {
            Ok(nearest) => nearest,
            Err(e) if e.is_timeout() => {
                warn!(error = %e, "nearest timer query timed out, retrying later");
                return Ok(Poll::Idle);
            }
            Err(e) => return Err(e),
        };

        let Some(timer) = nearest else {
            debug!("no pending timers");
            return Ok(Poll::Idle);
        };

        let wait = (timer.next_start - now).to_std().unwrap_or(Duration::ZERO);
        if wait > self.config.wait_slack() {
            // Validated config keeps the buffer below the slack, so this is never zero.
            let pause = wait
                .saturating_sub(self.config.wake_buffer())
                .min(self.config.poll_interval());
            debug!(
                timer = %timer.timer_name,
                username = %timer.username,
                wait_secs = wait.as_secs(),
                pause_secs = pause.as_secs(),
                "waiting for next timer"
            );
            return Ok(Poll::Waiting(pause));
        }

        self.fire(timer, now).await.map(Poll::Fired)
    }

    async fn fire(&self, timer: Timer, now: DateTime<Utc>) -> Result<FireReport, DigestError> {
        let Some(next_start) = timer.following_start() else {
            return Err(DigestError::Internal(format!(
                "timer {} of {} cannot be advanced past {}",
                timer.timer_name, timer.username, timer.next_start
            )));
        };

        let tick = UnsettledTick::of(&timer);
        let already_sent = self.unsettled.lock().await.as_ref() == Some(&tick);
        let delivery = if already_sent {
            info!(
                timer = %timer.timer_name,
                username = %timer.username,
                "retrying reschedule of a delivered tick"
            );
            Delivery::AlreadySent
        } else {
            self.deliver(&timer, next_start).await
        };

        let reschedule = self.reschedule(&timer, next_start).await?;
        *self.unsettled.lock().await = match reschedule {
            Reschedule::TimedOut => Some(tick),
            Reschedule::Advanced | Reschedule::Vanished => None,
        };

        Ok(FireReport {
            username: timer.username,
            timer_name: timer.timer_name,
            fired_at: now,
            next_start,
            delivery,
            reschedule,
        })
    }

    async fn deliver(&self, timer: &Timer, next_start: DateTime<Utc>) -> Delivery {
        let parsed = match self.parser.parse(&timer.top_command) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => {
                error!(
                    timer = %timer.timer_name,
                    username = %timer.username,
                    command = %timer.top_command,
                    "stored command is not recognized, skipping this tick"
                );
                return Delivery::Malformed;
            }
            Err(e) => {
                error!(
                    timer = %timer.timer_name,
                    username = %timer.username,
                    command = %timer.top_command,
                    error = %e,
                    "stored command does not parse, skipping this tick"
                );
                return Delivery::Malformed;
            }
        };

        let request = CommandRequest::new(
            timer.channel_id.as_str(),
            timer.username.as_str(),
            timer.top_command.as_str(),
        );
        let reply = match with_deadline(
            self.config.request_timeout(),
            self.executor.execute(&request, &parsed),
        )
        .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    timer = %timer.timer_name,
                    username = %timer.username,
                    error = %e,
                    "timer command failed"
                );
                return Delivery::ExecutorFailed;
            }
        };

        let text = format!("{reply}\nNext start: {} UTC", display_utc(next_start));
        let message = OutboundMessage::new(timer.channel_id.as_str(), text);
        match with_deadline(self.config.request_timeout(), self.channel.send(message)).await {
            Ok(_) => {
                info!(
                    timer = %timer.timer_name,
                    username = %timer.username,
                    channel = %timer.channel_id,
                    "timer fired"
                );
                Delivery::Sent
            }
            Err(e) => {
                warn!(
                    timer = %timer.timer_name,
                    username = %timer.username,
                    error = %e,
                    "timer reply delivery failed"
                );
                Delivery::ChannelFailed
            }
        }
    }

    async fn reschedule(
        &self,
        timer: &Timer,
        next_start: DateTime<Utc>,
    ) -> Result<Reschedule, DigestError> {
        let update = with_deadline(
            self.config.request_timeout(),
            self.store
                .advance_next_start(&timer.username, &timer.timer_name, next_start),
        )
        .await;

        match update {
            Ok(true) => {
                debug!(timer = %timer.timer_name, next_start = %next_start, "timer rescheduled");
                Ok(Reschedule::Advanced)
            }
            Ok(false) => {
                debug!(timer = %timer.timer_name, "timer deleted while firing");
                Ok(Reschedule::Vanished)
            }
            Err(e) if e.is_timeout() => {
                warn!(timer = %timer.timer_name, error = %e, "reschedule timed out");
                Ok(Reschedule::TimedOut)
            }
            Err(e) => Err(e),
        }
    }
}

/// `now - overdue_threshold`, clamped to the earliest representable time.
pub(crate) fn overdue_border(now: DateTime<Utc>, config: &TimersConfig) -> DateTime<Utc> {
    now.checked_sub_signed(config.overdue_threshold())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
