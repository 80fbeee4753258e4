// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `timers add|ls|rm`.

use chrono::TimeDelta;
use rand::Rng;
use tracing::{debug, info};

use digestbot_config::model::TimersConfig;
use digestbot_core::{
    Clock, CommandRequest, DigestError, Timer, TimerStore, display_utc, schedulable,
};

use crate::args::{TimersAddArgs, TimersRmArgs};

const NAME_LEN: usize = 4;
const NAME_ATTEMPTS: usize = 16;

pub(crate) async fn add(
    store: &dyn TimerStore,
    clock: &dyn Clock,
    config: &TimersConfig,
    request: &CommandRequest,
    args: TimersAddArgs,
) -> Result<String, DigestError> {
    let Some(top_command) = args.top_command else {
        return Ok("Top command should be explicitly presented. \
                   Please, see `help timers` for syntax and arguments."
            .into());
    };

    let min_frequency = config.min_frequency();
    if args.frequency < min_frequency {
        return Ok(format!(
            "Timers with frequencies less than {} are not allowed. \
             Please, specify timer with greater frequency.",
            describe_delta(min_frequency)
        ));
    }
    if args.top.count <= 0 {
        return Ok("Number of messages should be positive.".into());
    }

    let Some(next_start) = clock
        .now()
        .checked_add_signed(args.frequency)
        .and_then(schedulable)
    else {
        return Ok("Timer frequency is too large. \
                   Please, specify timer with smaller frequency."
            .into());
    };

    for _ in 0..NAME_ATTEMPTS {
        let name = random_timer_name();
        if store.exists(&request.username, &name).await? {
            continue;
        }

        let timer = Timer::new(
            request.channel_id.as_str(),
            request.username.as_str(),
            name,
            args.frequency,
            next_start,
            top_command.as_str(),
        );
        if store.create(&timer, config.max_timers_per_user).await? {
            info!(
                username = %timer.username,
                timer = %timer.timer_name,
                delta_secs = timer.delta.num_seconds(),
                "timer created"
            );
            return Ok(format!(
                "Timer {} successfully created. Next start time: {} UTC",
                timer.timer_name,
                display_utc(timer.next_start)
            ));
        }

        // Either the cap was hit or the name was taken in the meantime.
        if store.count_for_user(&request.username).await? >= config.max_timers_per_user {
            return Ok(format!(
                "You can't have more than {} timers.",
                config.max_timers_per_user
            ));
        }
        debug!(username = %request.username, "timer name taken concurrently, retrying");
    }

    Err(DigestError::Internal(format!(
        "no free timer name for {} after {NAME_ATTEMPTS} attempts",
        request.username
    )))
}

pub(crate) async fn list(store: &dyn TimerStore, username: &str) -> Result<String, DigestError> {
    let timers = store.list_for_user(username).await?;
    if timers.is_empty() {
        return Ok("No timers to list. Let's create one!".into());
    }

    let entries: Vec<String> = timers
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                "{}. Timer name: {}, top command: {}\nDelta: {}, next start: {} UTC",
                i + 1,
                t.timer_name,
                t.top_command,
                describe_delta(t.delta),
                display_utc(t.next_start)
            )
        })
        .collect();
    Ok(entries.join("\n\n"))
}

pub(crate) async fn remove(
    store: &dyn TimerStore,
    username: &str,
    args: TimersRmArgs,
) -> Result<String, DigestError> {
    let Some(name) = args.timer_name else {
        return Ok("Timer name to delete should be explicitly specified. \
                   Please specify timer name or type `help timers` to get additional information."
            .into());
    };

    if store.delete(username, &name).await? {
        info!(username, timer = %name, "timer deleted");
        Ok(format!("Timer {name} successfully deleted."))
    } else {
        Ok("Couldn't find timer with such name. \
            If you are sure that it's a bug, please contact bot developer team. Thanks."
            .into())
    }
}

fn random_timer_name() -> String {
    let mut rng = rand::thread_rng();
    (0..NAME_LEN)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

/// `1 day 6 hours`, `2 weeks`, `45 minutes`.
pub fn describe_delta(delta: TimeDelta) -> String {
    const UNITS: [(&str, i64); 5] = [
        ("week", 604_800),
        ("day", 86_400),
        ("hour", 3_600),
        ("minute", 60),
        ("second", 1),
    ];

    let mut rest = delta.num_seconds();
    if rest <= 0 {
        return format!("{rest} seconds");
    }

    let mut parts = Vec::new();
    for (unit, secs) in UNITS {
        let n = rest / secs;
        if n > 0 {
            parts.push(format!("{n} {unit}{}", if n == 1 { "" } else { "s" }));
            rest %= secs;
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_four_lowercase_letters() {
        for _ in 0..100 {
            let name = random_timer_name();
            assert_eq!(name.len(), NAME_LEN);
            assert!(name.chars().all(|c| c.is_ascii_lowercase()), "{name}");
        }
    }

    #[test]
    fn deltas_read_naturally() {
        assert_eq!(describe_delta(TimeDelta::hours(1)), "1 hour");
        assert_eq!(describe_delta(TimeDelta::hours(30)), "1 day 6 hours");
        assert_eq!(describe_delta(TimeDelta::weeks(2)), "2 weeks");
        assert_eq!(describe_delta(TimeDelta::seconds(90)), "1 minute 30 seconds");
        assert_eq!(describe_delta(TimeDelta::zero()), "0 seconds");
    }
}
