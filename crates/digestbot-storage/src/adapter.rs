// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage and timer store traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use digestbot_config::model::StorageConfig;
use digestbot_core::{
    AdapterType, DigestError, HealthStatus, PluginAdapter, StorageAdapter, Timer, TimerStore,
};

use crate::database::{Database, checkpoint, map_tr_err};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened on the first call to
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, DigestError> {
        self.db
            .get()
            .ok_or_else(|| DigestError::storage_msg("storage not initialized -- call initialize() first"))
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, DigestError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT 1", [], |row| row.get(0))
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DigestError> {
        if let Some(db) = self.db.get() {
            checkpoint(db.connection()).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), DigestError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| DigestError::storage_msg("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), DigestError> {
        checkpoint(self.db()?.connection()).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl TimerStore for SqliteStorage {
    async fn find_nearest_due(&self, after: DateTime<Utc>) -> Result<Option<Timer>, DigestError> {
        queries::timers::find_nearest_due(self.db()?, after).await
    }

    async fn find_overdue(&self, before: DateTime<Utc>) -> Result<Vec<Timer>, DigestError> {
        queries::timers::find_overdue(self.db()?, before).await
    }

    async fn advance_next_start(
        &self,
        username: &str,
        timer_name: &str,
        new_next_start: DateTime<Utc>,
    ) -> Result<bool, DigestError> {
        queries::timers::advance_next_start(self.db()?, username, timer_name, new_next_start).await
    }

    async fn create(&self, timer: &Timer, max_per_user: u32) -> Result<bool, DigestError> {
        queries::timers::create(self.db()?, timer, max_per_user).await
    }

    async fn delete(&self, username: &str, timer_name: &str) -> Result<bool, DigestError> {
        queries::timers::delete(self.db()?, username, timer_name).await
    }

    async fn exists(&self, username: &str, timer_name: &str) -> Result<bool, DigestError> {
        queries::timers::exists(self.db()?, username, timer_name).await
    }

    async fn count_for_user(&self, username: &str) -> Result<u32, DigestError> {
        queries::timers::count_for_user(self.db()?, username).await
    }

    async fn list_for_user(&self, username: &str) -> Result<Vec<Timer>, DigestError> {
        queries::timers::list_for_user(self.db()?, username).await
    }
}
