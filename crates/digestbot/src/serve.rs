// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `digestbot serve` command implementation.
//!
//! Opens the timer store, then runs the fire loop and the recovery worker
//! until SIGINT/SIGTERM or until the fire loop halts on a store failure.

use std::sync::Arc;

use digestbot_commands::{CommandDispatcher, root_parser};
use digestbot_config::model::DigestConfig;
use digestbot_core::{
    ChannelAdapter, Clock, DigestError, PluginAdapter, StorageAdapter, SystemClock,
};
use digestbot_parser::CommandParser;
use digestbot_storage::SqliteStorage;
use digestbot_timers::{RecoveryWorker, Scheduler};
use tracing::{error, info};

use crate::console::{ConsoleChannel, DescribedDigest};
use crate::shutdown;

/// Opens and migrates the configured SQLite database.
pub async fn open_storage(config: &DigestConfig) -> Result<Arc<SqliteStorage>, DigestError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

pub fn build_dispatcher(
    config: &DigestConfig,
    parser: Arc<CommandParser>,
    storage: Arc<SqliteStorage>,
    clock: Arc<dyn Clock>,
) -> Arc<CommandDispatcher> {
    Arc::new(CommandDispatcher::new(
        config,
        parser,
        storage,
        Arc::new(DescribedDigest),
        clock,
    ))
}

/// Runs the `digestbot serve` command.
pub async fn run_serve(config: DigestConfig) -> Result<(), DigestError> {
    info!(name = %config.agent.name, "starting digestbot serve");

    let storage = open_storage(&config).await?;
    let parser = Arc::new(root_parser());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let channel: Arc<dyn ChannelAdapter> = Arc::new(ConsoleChannel);
    let dispatcher = build_dispatcher(&config, parser.clone(), storage.clone(), clock.clone());

    let scheduler = Scheduler::new(
        config.timers.clone(),
        storage.clone(),
        parser,
        dispatcher,
        channel.clone(),
        clock.clone(),
    );
    let recovery = RecoveryWorker::new(config.timers.clone(), storage.clone(), channel, clock);

    let cancel = shutdown::install_signal_handler();

    let recovery_task = tokio::spawn({
        let cancel = cancel.clone();
        async move { recovery.run(cancel).await }
    });

    let result = scheduler.run(cancel.clone()).await;

    // The recovery worker never outlives the fire loop.
    cancel.cancel();
    if let Err(e) = recovery_task.await {
        error!(error = %e, "recovery task did not shut down cleanly");
    }

    storage.shutdown().await?;
    info!("digestbot stopped");
    result
}
