// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory timer store with failure injection.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use digestbot_core::{DigestError, Timer, TimerStore};

/// Store operations that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FindNearestDue,
    FindOverdue,
    Advance,
    Create,
    Delete,
    Exists,
    Count,
    List,
}

/// How an injected failure shows itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// `DigestError::Storage`, as from a lost connection.
    Unavailable,
    /// `DigestError::Timeout`, as from a timed-out driver call.
    Timeout,
    /// Never completes; exercises the caller's own timeout.
    Hang,
}

#[derive(Default)]
struct Inner {
    timers: BTreeMap<(String, String), Timer>,
    failures: HashMap<Op, Failure>,
    advance_failures: HashMap<String, Failure>,
    vanish_after_read: Vec<String>,
    advances: Vec<(String, String, DateTime<Utc>)>,
}

/// A [`TimerStore`] over a `BTreeMap`, with the same conditional update and
/// cap semantics as the SQLite store.
#[derive(Default)]
pub struct MockTimerStore {
    inner: Mutex<Inner>,
}

impl MockTimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a timer directly, bypassing the cap.
    pub async fn insert(&self, timer: Timer) {
        let key = (timer.username.clone(), timer.timer_name.clone());
        self.inner.lock().await.timers.insert(key, timer);
    }

    pub async fn get(&self, username: &str, timer_name: &str) -> Option<Timer> {
        self.inner
            .lock()
            .await
            .timers
            .get(&(username.to_string(), timer_name.to_string()))
            .cloned()
    }

    pub async fn all(&self) -> Vec<Timer> {
        self.inner.lock().await.timers.values().cloned().collect()
    }

    /// Make every call to `op` fail until [`MockTimerStore::clear_failures`].
    pub async fn fail(&self, op: Op, failure: Failure) {
        self.inner.lock().await.failures.insert(op, failure);
    }

    /// Make `advance_next_start` fail only for the named timer.
    pub async fn fail_advance_of(&self, timer_name: &str, failure: Failure) {
        self.inner
            .lock()
            .await
            .advance_failures
            .insert(timer_name.to_string(), failure);
    }

    /// Delete the named timer right after the next find query returns it,
    /// as if its owner removed it while a loop was working on it.
    pub async fn vanish_after_read(&self, timer_name: &str) {
        self.inner
            .lock()
            .await
            .vanish_after_read
            .push(timer_name.to_string());
    }

    pub async fn clear_failures(&self) {
        let mut inner = self.inner.lock().await;
        inner.failures.clear();
        inner.advance_failures.clear();
    }

    /// Every successful `advance_next_start` call, in order.
    pub async fn advances(&self) -> Vec<(String, String, DateTime<Utc>)> {
        self.inner.lock().await.advances.clone()
    }

    async fn check(&self, op: Op) -> Result<(), DigestError> {
        let failure = self.inner.lock().await.failures.get(&op).copied();
        inject(failure).await
    }
}

impl Inner {
    fn vanish<'a>(&mut self, read: impl Iterator<Item = &'a Timer>) {
        for timer in read {
            if let Some(pos) = self.vanish_after_read.iter().position(|n| *n == timer.timer_name) {
                self.vanish_after_read.remove(pos);
                self.timers
                    .remove(&(timer.username.clone(), timer.timer_name.clone()));
            }
        }
    }
}

async fn inject(failure: Option<Failure>) -> Result<(), DigestError> {
    match failure {
        None => Ok(()),
        Some(Failure::Unavailable) => Err(DigestError::storage_msg("mock store unavailable")),
        Some(Failure::Timeout) => Err(DigestError::Timeout {
            duration: std::time::Duration::from_secs(10),
        }),
        Some(Failure::Hang) => std::future::pending().await,
    }
}

#[async_trait]
impl TimerStore for MockTimerStore {
    async fn find_nearest_due(&self, after: DateTime<Utc>) -> Result<Option<Timer>, DigestError> {
        self.check(Op::FindNearestDue).await?;
        let mut inner = self.inner.lock().await;
        let found = inner
            .timers
            .values()
            .filter(|t| t.next_start > after)
            .min_by_key(|t| t.next_start)
            .cloned();
        inner.vanish(found.iter());
        Ok(found)
    }

    async fn find_overdue(&self, before: DateTime<Utc>) -> Result<Vec<Timer>, DigestError> {
        self.check(Op::FindOverdue).await?;
        let mut inner = self.inner.lock().await;
        let mut overdue: Vec<Timer> = inner
            .timers
            .values()
            .filter(|t| t.next_start < before)
            .cloned()
            .collect();
        overdue.sort_by_key(|t| t.next_start);
        inner.vanish(overdue.iter());
        Ok(overdue)
    }

    async fn advance_next_start(
        &self,
        username: &str,
        timer_name: &str,
        new_next_start: DateTime<Utc>,
    ) -> Result<bool, DigestError> {
        self.check(Op::Advance).await?;
        let targeted = self
            .inner
            .lock()
            .await
            .advance_failures
            .get(timer_name)
            .copied();
        inject(targeted).await?;

        let mut inner = self.inner.lock().await;
        let key = (username.to_string(), timer_name.to_string());
        let Some(timer) = inner.timers.get_mut(&key) else {
            return Ok(false);
        };
        if timer.next_start > new_next_start {
            return Ok(false);
        }
        timer.next_start = new_next_start;
        inner
            .advances
            .push((username.to_string(), timer_name.to_string(), new_next_start));
        Ok(true)
    }

    async fn create(&self, timer: &Timer, max_per_user: u32) -> Result<bool, DigestError> {
        self.check(Op::Create).await?;
        let mut inner = self.inner.lock().await;
        let owned = inner
            .timers
            .keys()
            .filter(|(user, _)| *user == timer.username)
            .count();
        let key = (timer.username.clone(), timer.timer_name.clone());
        if owned >= max_per_user as usize || inner.timers.contains_key(&key) {
            return Ok(false);
        }
        inner.timers.insert(key, timer.clone());
        Ok(true)
    }

    async fn delete(&self, username: &str, timer_name: &str) -> Result<bool, DigestError> {
        self.check(Op::Delete).await?;
        let key = (username.to_string(), timer_name.to_string());
        Ok(self.inner.lock().await.timers.remove(&key).is_some())
    }

    async fn exists(&self, username: &str, timer_name: &str) -> Result<bool, DigestError> {
        self.check(Op::Exists).await?;
        let key = (username.to_string(), timer_name.to_string());
        Ok(self.inner.lock().await.timers.contains_key(&key))
    }

    async fn count_for_user(&self, username: &str) -> Result<u32, DigestError> {
        self.check(Op::Count).await?;
        let inner = self.inner.lock().await;
        let count = inner.timers.keys().filter(|(user, _)| user == username).count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn list_for_user(&self, username: &str) -> Result<Vec<Timer>, DigestError> {
        self.check(Op::List).await?;
        let inner = self.inner.lock().await;
        let mut timers: Vec<Timer> = inner
            .timers
            .values()
            .filter(|t| t.username == username)
            .cloned()
            .collect();
        timers.sort_by(|a, b| {
            a.next_start
                .cmp(&b.next_start)
                .then_with(|| a.timer_name.cmp(&b.timer_name))
        });
        Ok(timers)
    }
}
