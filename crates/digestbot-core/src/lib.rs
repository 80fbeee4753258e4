// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for digestbot.
//!
//! This crate provides the error type, the timer model and the trait
//! contracts shared by storage, the command layer and the timer loops.

pub mod clock;
pub mod error;
pub mod traits;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use error::DigestError;
pub use types::{
    AdapterType, CommandRequest, EARLIEST_START_MILLIS, HealthStatus, LATEST_START_MILLIS,
    MessageId, OutboundMessage, Timer, display_utc, schedulable,
};

pub use traits::{
    ChannelAdapter, CommandExecutor, PluginAdapter, StorageAdapter, TimerStore,
};
