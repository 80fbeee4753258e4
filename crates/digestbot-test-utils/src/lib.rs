// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for digestbot.
//!
//! Provides mock collaborators for fast, deterministic tests of the timer
//! loops and the command layer without a database or a chat platform.
//!
//! # Components
//!
//! - [`MockChannel`] - captures deliveries, can be told to fail
//! - [`MockExecutor`] - canned replies, records every request
//! - [`MockTimerStore`] - in-memory [`TimerStore`](digestbot_core::TimerStore) with failure injection
//! - [`PausedClock`] - wall clock that follows tokio's paused time

pub mod clock;
pub mod mock_channel;
pub mod mock_executor;
pub mod mock_store;

pub use clock::PausedClock;
pub use mock_channel::MockChannel;
pub use mock_executor::MockExecutor;
pub use mock_store::{Failure, MockTimerStore, Op};
