// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire loop behaviour on tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio_util::sync::CancellationToken;

use digestbot_config::model::TimersConfig;
use digestbot_core::{Clock, DigestError, Timer};
use digestbot_parser::{Argument, CommandBuilder, CommandParser};
use digestbot_test_utils::{Failure, MockChannel, MockExecutor, MockTimerStore, Op, PausedClock};
use digestbot_timers::{Delivery, Poll, Reschedule, Scheduler};

fn base() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn grammar() -> Arc<CommandParser> {
    let top = CommandBuilder::new("top")
        .add_argument(Argument::int("N", 5))
        .add_argument(Argument::string("channel"))
        .build();
    Arc::new(CommandParser::builder().command(top).build())
}

fn timer(name: &str, next_start: DateTime<Utc>, command: &str) -> Timer {
    Timer::new("C1", "alice", name, TimeDelta::hours(1), next_start, command)
}

struct Harness {
    store: Arc<MockTimerStore>,
    executor: Arc<MockExecutor>,
    channel: Arc<MockChannel>,
    clock: PausedClock,
    scheduler: Arc<Scheduler>,
}

fn harness_with(config: TimersConfig, executor: MockExecutor) -> Harness {
    let store = Arc::new(MockTimerStore::new());
    let executor = Arc::new(executor);
    let channel = Arc::new(MockChannel::new());
    let clock = PausedClock::starting_at(base());
    let scheduler = Arc::new(Scheduler::new(
        config,
        store.clone(),
        grammar(),
        executor.clone(),
        channel.clone(),
        Arc::new(clock),
    ));
    Harness {
        store,
        executor,
        channel,
        clock,
        scheduler,
    }
}

fn harness() -> Harness {
    harness_with(TimersConfig::default(), MockExecutor::new())
}

fn fired(poll: Poll) -> digestbot_timers::FireReport {
    match poll {
        Poll::Fired(report) => report,
        other => panic!("expected a fire, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn empty_store_is_idle() {
    let h = harness();
    assert_eq!(h.scheduler.poll_once().await.unwrap(), Poll::Idle);
}

#[tokio::test(start_paused = true)]
async fn stale_timer_is_left_for_recovery() {
    let h = harness();
    h.store
        .insert(timer("old1", base() - TimeDelta::minutes(11), "top"))
        .await;

    assert_eq!(h.scheduler.poll_once().await.unwrap(), Poll::Idle);
    assert_eq!(h.executor.call_count().await, 0);
    assert!(h.store.advances().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn far_timer_is_rechecked_within_poll_interval() {
    let h = harness();
    h.store
        .insert(timer("later", base() + TimeDelta::hours(1), "top"))
        .await;
    assert_eq!(
        h.scheduler.poll_once().await.unwrap(),
        Poll::Waiting(Duration::from_secs(300))
    );
}

#[tokio::test(start_paused = true)]
async fn near_timer_wakes_a_buffer_early() {
    let h = harness();
    h.store
        .insert(timer("soon", base() + TimeDelta::seconds(60), "top"))
        .await;
    assert_eq!(
        h.scheduler.poll_once().await.unwrap(),
        Poll::Waiting(Duration::from_secs(57))
    );
}

#[tokio::test(start_paused = true)]
async fn due_timer_fires_and_advances_by_delta() {
    let h = harness();
    let start = base() + TimeDelta::seconds(2);
    h.store.insert(timer("abcd", start, "top 10")).await;

    let report = fired(h.scheduler.poll_once().await.unwrap());
    assert_eq!(report.timer_name, "abcd");
    assert_eq!(report.delivery, Delivery::Sent);
    assert_eq!(report.reschedule, Reschedule::Advanced);
    assert_eq!(report.next_start, start + TimeDelta::hours(1));

    let requests = h.executor.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].channel_id, "C1");
    assert_eq!(requests[0].username, "alice");
    assert_eq!(requests[0].text, "top 10");
    let parsed = h.executor.parsed().await;
    assert_eq!(parsed[0].command, "top");
    assert_eq!(parsed[0].args.int("N"), Some(10));

    let sent = h.channel.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].channel_id, "C1");
    assert_eq!(
        sent[0].text,
        "digest for top 10\nNext start: 2026-03-01 11:00:02 UTC"
    );

    let stored = h.store.get("alice", "abcd").await.unwrap();
    assert_eq!(stored.next_start, start + TimeDelta::hours(1));
}

#[tokio::test(start_paused = true)]
async fn slow_command_does_not_shift_the_schedule() {
    let config = TimersConfig {
        request_timeout_secs: 120,
        ..TimersConfig::default()
    };
    let h = harness_with(config, MockExecutor::new().with_delay(Duration::from_secs(40)));
    h.store.insert(timer("slow", base(), "top")).await;

    let report = fired(h.scheduler.poll_once().await.unwrap());
    assert_eq!(report.delivery, Delivery::Sent);
    assert!(h.clock.now() >= base() + TimeDelta::seconds(40));
    assert_eq!(
        h.store.get("alice", "slow").await.unwrap().next_start,
        base() + TimeDelta::hours(1)
    );
}

#[tokio::test(start_paused = true)]
async fn slightly_late_timer_fires_at_once_and_keeps_its_phase() {
    let h = harness();
    let start = base() - TimeDelta::minutes(2);
    h.store.insert(timer("late", start, "top")).await;

    let report = fired(h.scheduler.poll_once().await.unwrap());
    assert_eq!(report.next_start, start + TimeDelta::hours(1));
}

#[tokio::test(start_paused = true)]
async fn executor_failure_still_reschedules() {
    let h = harness();
    h.executor.set_failing(true);
    h.store.insert(timer("fail", base(), "top")).await;

    let report = fired(h.scheduler.poll_once().await.unwrap());
    assert_eq!(report.delivery, Delivery::ExecutorFailed);
    assert_eq!(report.reschedule, Reschedule::Advanced);
    assert_eq!(h.channel.sent_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn executor_timeout_still_reschedules() {
    let h = harness_with(
        TimersConfig::default(),
        MockExecutor::new().with_delay(Duration::from_secs(30)),
    );
    h.store.insert(timer("hang", base(), "top")).await;

    let report = fired(h.scheduler.poll_once().await.unwrap());
    assert_eq!(report.delivery, Delivery::ExecutorFailed);
    assert_eq!(report.reschedule, Reschedule::Advanced);
}

#[tokio::test(start_paused = true)]
async fn channel_failure_still_reschedules() {
    let h = harness();
    h.channel.set_failing(true);
    h.store.insert(timer("mute", base(), "top")).await;

    let report = fired(h.scheduler.poll_once().await.unwrap());
    assert_eq!(report.delivery, Delivery::ChannelFailed);
    assert_eq!(report.reschedule, Reschedule::Advanced);
    assert_eq!(h.executor.call_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn malformed_commands_are_skipped_but_kept() {
    let h = harness();
    h.store.insert(timer("bad1", base(), "bogus 1")).await;
    h.store
        .insert(timer("bad2", base() + TimeDelta::seconds(1), "top a a"))
        .await;

    for _ in 0..2 {
        let report = fired(h.scheduler.poll_once().await.unwrap());
        assert_eq!(report.delivery, Delivery::Malformed);
        assert_eq!(report.reschedule, Reschedule::Advanced);
    }

    assert_eq!(h.executor.call_count().await, 0);
    assert_eq!(h.channel.sent_count().await, 0);
    assert_eq!(h.store.all().await.len(), 2);
    assert_eq!(
        h.store.get("alice", "bad1").await.unwrap().next_start,
        base() + TimeDelta::hours(1)
    );
}

#[tokio::test(start_paused = true)]
async fn timer_deleted_mid_fire_is_dropped_silently() {
    let h = harness();
    h.store.insert(timer("gone", base(), "top")).await;
    h.store.vanish_after_read("gone").await;

    let report = fired(h.scheduler.poll_once().await.unwrap());
    assert_eq!(report.reschedule, Reschedule::Vanished);
    assert!(h.store.all().await.is_empty());
    assert!(h.store.advances().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn store_outage_on_reschedule_is_an_error() {
    let h = harness();
    h.store.insert(timer("abcd", base(), "top")).await;
    h.store.fail(Op::Advance, Failure::Unavailable).await;

    let err = h.scheduler.poll_once().await.unwrap_err();
    assert!(matches!(err, DigestError::Storage { .. }));
}

#[tokio::test(start_paused = true)]
async fn reschedule_timeouts_are_retryable() {
    for failure in [Failure::Timeout, Failure::Hang] {
        let h = harness();
        h.store.insert(timer("abcd", base(), "top")).await;
        h.store.fail(Op::Advance, failure).await;

        let report = fired(h.scheduler.poll_once().await.unwrap());
        assert_eq!(report.reschedule, Reschedule::TimedOut, "{failure:?}");
        assert_eq!(h.store.get("alice", "abcd").await.unwrap().next_start, base());
    }
}

#[tokio::test(start_paused = true)]
async fn timed_out_reschedule_is_retried_without_redelivery() {
    let h = harness();
    h.store.insert(timer("abcd", base(), "top 3")).await;
    h.store.fail(Op::Advance, Failure::Timeout).await;

    let first = fired(h.scheduler.poll_once().await.unwrap());
    assert_eq!(first.delivery, Delivery::Sent);
    assert_eq!(first.reschedule, Reschedule::TimedOut);

    h.store.clear_failures().await;
    let retry = fired(h.scheduler.poll_once().await.unwrap());
    assert_eq!(retry.delivery, Delivery::AlreadySent);
    assert_eq!(retry.reschedule, Reschedule::Advanced);

    assert_eq!(h.executor.call_count().await, 1);
    assert_eq!(h.channel.sent_count().await, 1);
    assert_eq!(
        h.store.get("alice", "abcd").await.unwrap().next_start,
        base() + TimeDelta::hours(1)
    );
}

#[tokio::test(start_paused = true)]
async fn run_does_not_spam_while_reschedule_writes_hang() {
    let h = harness();
    h.store.insert(timer("abcd", base(), "top 3")).await;
    h.store.fail(Op::Advance, Failure::Hang).await;

    let cancel = CancellationToken::new();
    let scheduler = h.scheduler.clone();
    let task = tokio::spawn({
        let cancel = cancel.clone();
        async move { scheduler.run(cancel).await }
    });

    tokio::time::sleep(Duration::from_secs(20 * 60)).await;
    assert_eq!(h.executor.call_count().await, 1);
    assert_eq!(h.channel.sent_count().await, 1);
    assert_eq!(h.store.get("alice", "abcd").await.unwrap().next_start, base());

    cancel.cancel();
    task.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn hung_nearest_query_backs_off_to_idle() {
    let h = harness();
    h.store.fail(Op::FindNearestDue, Failure::Hang).await;
    assert_eq!(h.scheduler.poll_once().await.unwrap(), Poll::Idle);
}

#[tokio::test(start_paused = true)]
async fn run_halts_when_store_is_unavailable() {
    let h = harness();
    h.store.fail(Op::FindNearestDue, Failure::Unavailable).await;

    let result = h.scheduler.run(CancellationToken::new()).await;
    assert!(matches!(result, Err(DigestError::Storage { .. })));
}

#[tokio::test(start_paused = true)]
async fn run_fires_on_schedule_and_stops_on_cancel() {
    let h = harness();
    h.store
        .insert(timer("abcd", base() + TimeDelta::minutes(10), "top 3"))
        .await;

    let cancel = CancellationToken::new();
    let scheduler = h.scheduler.clone();
    let task = tokio::spawn({
        let cancel = cancel.clone();
        async move { scheduler.run(cancel).await }
    });

    tokio::time::sleep(Duration::from_secs(9 * 60)).await;
    assert_eq!(h.channel.sent_count().await, 0);

    tokio::time::sleep(Duration::from_secs(2 * 60)).await;
    assert_eq!(h.channel.sent_count().await, 1);
    assert_eq!(
        h.store.get("alice", "abcd").await.unwrap().next_start,
        base() + TimeDelta::minutes(70)
    );

    cancel.cancel();
    task.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn earlier_timer_created_while_waiting_is_noticed() {
    let h = harness();
    h.store
        .insert(timer("far1", base() + TimeDelta::hours(1), "top 1"))
        .await;

    let cancel = CancellationToken::new();
    let scheduler = h.scheduler.clone();
    let task = tokio::spawn({
        let cancel = cancel.clone();
        async move { scheduler.run(cancel).await }
    });

    tokio::time::sleep(Duration::from_secs(60)).await;
    h.store
        .insert(timer("near", base() + TimeDelta::seconds(200), "top 2"))
        .await;
    tokio::time::sleep(Duration::from_secs(340)).await;

    let sent = h.channel.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.starts_with("digest for top 2"));
    assert_eq!(
        h.store.get("alice", "far1").await.unwrap().next_start,
        base() + TimeDelta::hours(1)
    );

    cancel.cancel();
    task.await.unwrap().unwrap();
}
