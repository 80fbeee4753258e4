// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TimerStore behaviour through the public adapter, including races between
//! independent connections to the same database file.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use digestbot_config::model::StorageConfig;
use digestbot_core::{StorageAdapter, Timer, TimerStore};
use digestbot_storage::SqliteStorage;
use futures::future::join_all;
use tempfile::tempdir;

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn timer(user: &str, name: &str) -> Timer {
    Timer::new(
        "C42",
        user,
        name,
        TimeDelta::hours(1),
        ts("2026-03-01T10:00:00Z"),
        "top",
    )
}

async fn storage_at(path: &std::path::Path) -> Arc<SqliteStorage> {
    let storage = SqliteStorage::new(StorageConfig {
        database_path: path.to_str().unwrap().to_string(),
        wal_mode: true,
    });
    storage.initialize().await.unwrap();
    Arc::new(storage)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_never_exceed_cap() {
    const CAP: u32 = 5;
    let dir = tempdir().unwrap();
    let path = dir.path().join("race.db");

    // One handle per creator so the inserts really contend inside SQLite.
    let mut handles = Vec::new();
    for _ in 0..=CAP {
        handles.push(storage_at(&path).await);
    }

    let attempts = handles.iter().enumerate().map(|(i, store)| {
        let store = Arc::clone(store);
        tokio::spawn(async move { store.create(&timer("alice", &format!("t{i:03}")), CAP).await })
    });
    let results: Vec<bool> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(results.iter().filter(|ok| **ok).count(), CAP as usize);
    assert_eq!(handles[0].count_for_user("alice").await.unwrap(), CAP);
}

#[tokio::test]
async fn deleted_timer_cannot_be_rescheduled_by_another_handle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("delete.db");
    let scheduler_view = storage_at(&path).await;
    let owner_view = storage_at(&path).await;

    assert!(owner_view.create(&timer("alice", "abcd"), 5).await.unwrap());
    let due = scheduler_view
        .find_nearest_due(ts("2026-03-01T09:00:00Z"))
        .await
        .unwrap()
        .unwrap();

    assert!(owner_view.delete("alice", "abcd").await.unwrap());
    let next = due.following_start().unwrap();
    assert!(!scheduler_view
        .advance_next_start(&due.username, &due.timer_name, next)
        .await
        .unwrap());
}

#[tokio::test]
async fn two_schedulers_reading_the_same_tick_both_succeed() {
    // Read-then-write is not transactional: both replicas see the same
    // next_start and both conditional updates pass.
    let dir = tempdir().unwrap();
    let path = dir.path().join("double.db");
    let a = storage_at(&path).await;
    let b = storage_at(&path).await;
    a.create(&timer("alice", "abcd"), 5).await.unwrap();

    let seen_a = a.find_nearest_due(ts("2026-03-01T09:00:00Z")).await.unwrap().unwrap();
    let seen_b = b.find_nearest_due(ts("2026-03-01T09:00:00Z")).await.unwrap().unwrap();
    let target = seen_a.following_start().unwrap();

    assert!(a.advance_next_start("alice", "abcd", target).await.unwrap());
    assert!(b
        .advance_next_start("alice", "abcd", seen_b.following_start().unwrap())
        .await
        .unwrap());
    assert_eq!(a.list_for_user("alice").await.unwrap()[0].next_start, target);
}
