// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timer queries.
//!
//! Timestamps are written with [`format_ts`] so that text comparison in SQL
//! matches chronological order.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use digestbot_core::{DigestError, Timer};
use rusqlite::{Row, params};
use tracing::warn;

use crate::database::{Database, map_tr_err};

const TIMER_COLUMNS: &str =
    "channel_id, username, timer_name, delta_secs, next_start, top_command";

/// RFC 3339, UTC, millisecond precision, `Z` suffix.
pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A row as stored, before its columns are turned into a [`Timer`].
///
/// Only decoding failures are skipped. A failing read still fails the query.
struct StoredTimer {
    channel_id: String,
    username: String,
    timer_name: String,
    delta_secs: i64,
    next_start: String,
    top_command: String,
}

impl StoredTimer {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            channel_id: row.get(0)?,
            username: row.get(1)?,
            timer_name: row.get(2)?,
            delta_secs: row.get(3)?,
            next_start: row.get(4)?,
            top_command: row.get(5)?,
        })
    }

    fn decode(self) -> Result<Timer, String> {
        let delta = TimeDelta::try_seconds(self.delta_secs)
            .ok_or_else(|| format!("delta_secs {} out of range", self.delta_secs))?;
        let next_start = DateTime::parse_from_rfc3339(&self.next_start)
            .map_err(|e| format!("next_start {:?}: {e}", self.next_start))?
            .with_timezone(&Utc);
        Ok(Timer::new(
            self.channel_id,
            self.username,
            self.timer_name,
            delta,
            next_start,
            self.top_command,
        ))
    }

    /// Decode, or log and drop the row.
    fn decode_or_skip(self) -> Option<Timer> {
        let username = self.username.clone();
        let timer_name = self.timer_name.clone();
        match self.decode() {
            Ok(timer) => Some(timer),
            Err(error) => {
                warn!(%username, timer = %timer_name, %error, "skipping undecodable timer row");
                None
            }
        }
    }
}

/// The timer with the smallest `next_start` strictly after `after`.
pub async fn find_nearest_due(
    db: &Database,
    after: DateTime<Utc>,
) -> Result<Option<Timer>, DigestError> {
    let after = format_ts(after);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TIMER_COLUMNS} FROM timers
                 WHERE next_start > ?1
                 ORDER BY next_start ASC"
            ))?;
            for row in stmt.query_map(params![after], StoredTimer::from_row)? {
                if let Some(timer) = row?.decode_or_skip() {
                    return Ok(Some(timer));
                }
            }
            Ok(None)
        })
        .await
        .map_err(map_tr_err)
}

/// Every timer whose `next_start` is strictly before `before`, oldest first.
pub async fn find_overdue(db: &Database, before: DateTime<Utc>) -> Result<Vec<Timer>, DigestError> {
    let before = format_ts(before);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TIMER_COLUMNS} FROM timers
                 WHERE next_start < ?1
                 ORDER BY next_start ASC"
            ))?;
            let rows = stmt.query_map(params![before], StoredTimer::from_row)?;
            decode_rows(rows)
        })
        .await
        .map_err(map_tr_err)
}

fn decode_rows(
    rows: impl Iterator<Item = Result<StoredTimer, rusqlite::Error>>,
) -> Result<Vec<Timer>, rusqlite::Error> {
    let mut timers = Vec::new();
    for row in rows {
        timers.extend(row?.decode_or_skip());
    }
    Ok(timers)
}

/// Conditional forward-only update of `next_start`.
///
/// Returns `false` when the timer no longer exists or already sits past
/// `new_next_start`.
pub async fn advance_next_start(
    db: &Database,
    username: &str,
    timer_name: &str,
    new_next_start: DateTime<Utc>,
) -> Result<bool, DigestError> {
    let username = username.to_string();
    let timer_name = timer_name.to_string();
    let new_next_start = format_ts(new_next_start);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE timers SET next_start = ?3
                 WHERE username = ?1 AND timer_name = ?2 AND next_start <= ?3",
                params![username, timer_name, new_next_start],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Cap-checked insert in a single statement.
///
/// The count and the insert run as one statement under SQLite's write lock,
/// so concurrent creators cannot both slip under the cap. A duplicate
/// `(username, timer_name)` is refused the same way.
pub async fn create(db: &Database, timer: &Timer, max_per_user: u32) -> Result<bool, DigestError> {
    let timer = timer.clone();
    let delta_secs = timer.delta.num_seconds();
    let next_start = format_ts(timer.next_start);
    let created_at = format_ts(Utc::now());
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "INSERT INTO timers
                     (channel_id, username, timer_name, delta_secs, next_start, top_command, created_at)
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7
                 WHERE (SELECT COUNT(*) FROM timers WHERE username = ?2) < ?8
                 ON CONFLICT (username, timer_name) DO NOTHING",
                params![
                    timer.channel_id,
                    timer.username,
                    timer.timer_name,
                    delta_secs,
                    next_start,
                    timer.top_command,
                    created_at,
                    max_per_user,
                ],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete(db: &Database, username: &str, timer_name: &str) -> Result<bool, DigestError> {
    let username = username.to_string();
    let timer_name = timer_name.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "DELETE FROM timers WHERE username = ?1 AND timer_name = ?2",
                params![username, timer_name],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn exists(db: &Database, username: &str, timer_name: &str) -> Result<bool, DigestError> {
    let username = username.to_string();
    let timer_name = timer_name.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT EXISTS (SELECT 1 FROM timers WHERE username = ?1 AND timer_name = ?2)",
                params![username, timer_name],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

pub async fn count_for_user(db: &Database, username: &str) -> Result<u32, DigestError> {
    let username = username.to_string();
    let count: i64 = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM timers WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

/// The user's timers, soonest first.
pub async fn list_for_user(db: &Database, username: &str) -> Result<Vec<Timer>, DigestError> {
    let username = username.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TIMER_COLUMNS} FROM timers
                 WHERE username = ?1
                 ORDER BY next_start ASC, timer_name ASC"
            ))?;
            let rows = stmt.query_map(params![username], StoredTimer::from_row)?;
            decode_rows(rows)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn timer(user: &str, name: &str, next: &str) -> Timer {
        Timer::new(
            "C42",
            user,
            name,
            TimeDelta::hours(1),
            ts(next),
            "top 10 1d replies general",
        )
    }

    async fn open() -> (tempfile::TempDir, Database) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("timers.db").to_str().unwrap())
            .await
            .unwrap();
        (dir, db)
    }

    #[test]
    fn format_ts_is_fixed_width_utc() {
        assert_eq!(
            format_ts(ts("2026-03-01T09:05:00+02:00")),
            "2026-03-01T07:05:00.000Z"
        );
    }

    #[tokio::test]
    async fn create_and_read_back() {
        let (_dir, db) = open().await;
        let t = timer("alice", "abcd", "2026-03-01T10:00:00.250Z");
        assert!(create(&db, &t, 5).await.unwrap());

        let listed = list_for_user(&db, "alice").await.unwrap();
        assert_eq!(listed, vec![t]);
        assert!(exists(&db, "alice", "abcd").await.unwrap());
        assert!(!exists(&db, "bob", "abcd").await.unwrap());
        assert_eq!(count_for_user(&db, "alice").await.unwrap(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn create_refuses_duplicate_name_and_respects_cap() {
        let (_dir, db) = open().await;
        assert!(create(&db, &timer("alice", "aaaa", "2026-03-01T10:00:00Z"), 2).await.unwrap());
        assert!(!create(&db, &timer("alice", "aaaa", "2026-03-02T10:00:00Z"), 2).await.unwrap());
        assert!(create(&db, &timer("alice", "bbbb", "2026-03-01T11:00:00Z"), 2).await.unwrap());
        assert!(!create(&db, &timer("alice", "cccc", "2026-03-01T12:00:00Z"), 2).await.unwrap());
        // The cap is per user.
        assert!(create(&db, &timer("bob", "cccc", "2026-03-01T12:00:00Z"), 2).await.unwrap());
        assert_eq!(count_for_user(&db, "alice").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn nearest_due_is_strictly_after_cutoff() {
        let (_dir, db) = open().await;
        create(&db, &timer("alice", "old1", "2026-03-01T09:00:00Z"), 5).await.unwrap();
        create(&db, &timer("alice", "soon", "2026-03-01T10:30:00Z"), 5).await.unwrap();
        create(&db, &timer("bob", "late", "2026-03-01T12:00:00Z"), 5).await.unwrap();

        let nearest = find_nearest_due(&db, ts("2026-03-01T10:00:00Z")).await.unwrap();
        assert_eq!(nearest.map(|t| t.timer_name), Some("soon".to_string()));

        let exact = find_nearest_due(&db, ts("2026-03-01T10:30:00Z")).await.unwrap();
        assert_eq!(exact.map(|t| t.timer_name), Some("late".to_string()));

        assert!(find_nearest_due(&db, ts("2026-03-01T12:00:00Z")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn overdue_is_strictly_before_cutoff() {
        let (_dir, db) = open().await;
        create(&db, &timer("alice", "old1", "2026-03-01T08:00:00Z"), 5).await.unwrap();
        create(&db, &timer("bob", "old2", "2026-03-01T09:00:00Z"), 5).await.unwrap();
        create(&db, &timer("bob", "new1", "2026-03-01T11:00:00Z"), 5).await.unwrap();

        let overdue = find_overdue(&db, ts("2026-03-01T09:00:00Z")).await.unwrap();
        let names: Vec<_> = overdue.iter().map(|t| t.timer_name.as_str()).collect();
        assert_eq!(names, vec!["old1"]);
    }

    #[tokio::test]
    async fn advance_only_moves_forward() {
        let (_dir, db) = open().await;
        create(&db, &timer("alice", "abcd", "2026-03-01T10:00:00Z"), 5).await.unwrap();

        assert!(advance_next_start(&db, "alice", "abcd", ts("2026-03-01T11:00:00Z")).await.unwrap());
        assert!(!advance_next_start(&db, "alice", "abcd", ts("2026-03-01T10:30:00Z")).await.unwrap());
        let stored = list_for_user(&db, "alice").await.unwrap();
        assert_eq!(stored[0].next_start, ts("2026-03-01T11:00:00Z"));
    }

    #[tokio::test]
    async fn advance_on_deleted_timer_affects_nothing() {
        let (_dir, db) = open().await;
        create(&db, &timer("alice", "abcd", "2026-03-01T10:00:00Z"), 5).await.unwrap();
        assert!(delete(&db, "alice", "abcd").await.unwrap());
        assert!(!delete(&db, "alice", "abcd").await.unwrap());
        assert!(!advance_next_start(&db, "alice", "abcd", ts("2026-03-01T11:00:00Z")).await.unwrap());
    }

    async fn insert_raw(db: &Database, sql: &'static str) {
        db.connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(sql, [])?;
                Ok(())
            })
            .await
            .unwrap();
    }

    #[test]
    fn five_digit_years_break_text_order() {
        let far = ts("9999-12-31T00:00:00Z") + TimeDelta::days(400);
        assert!(format_ts(far) < format_ts(ts("2026-03-01T10:00:00Z")));
    }

    #[tokio::test]
    async fn undecodable_rows_are_skipped_in_listings() {
        let (_dir, db) = open().await;
        create(&db, &timer("alice", "good", "2026-03-01T10:00:00Z"), 5).await.unwrap();
        insert_raw(
            &db,
            "INSERT INTO timers VALUES ('C', 'alice', 'bad1', 60, 'yesterday', 'top', 'x')",
        )
        .await;

        let listed = list_for_user(&db, "alice").await.unwrap();
        let names: Vec<_> = listed.iter().map(|t| t.timer_name.as_str()).collect();
        assert_eq!(names, vec!["good"]);
        assert_eq!(count_for_user(&db, "alice").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn one_bad_overdue_row_does_not_hide_the_others() {
        let (_dir, db) = open().await;
        create(&db, &timer("bob", "old1", "2026-03-01T08:00:00Z"), 5).await.unwrap();
        // Sorts before every four-digit year, then fails to parse.
        insert_raw(
            &db,
            "INSERT INTO timers VALUES \
             ('C', 'alice', 'huge', 3600, '+11608-11-02T10:00:00.000Z', 'top', 'x')",
        )
        .await;

        let overdue = find_overdue(&db, ts("2026-03-01T09:00:00Z")).await.unwrap();
        let names: Vec<_> = overdue.iter().map(|t| t.timer_name.as_str()).collect();
        assert_eq!(names, vec!["old1"]);
    }

    #[tokio::test]
    async fn nearest_due_steps_past_an_undecodable_row() {
        let (_dir, db) = open().await;
        insert_raw(
            &db,
            "INSERT INTO timers VALUES \
             ('C', 'alice', 'wide', 9223372036854775807, '2026-03-01T10:30:00.000Z', 'top', 'x')",
        )
        .await;
        create(&db, &timer("bob", "next", "2026-03-01T11:00:00Z"), 5).await.unwrap();

        let nearest = find_nearest_due(&db, ts("2026-03-01T10:00:00Z")).await.unwrap();
        assert_eq!(nearest.map(|t| t.timer_name), Some("next".to_string()));
    }
}
