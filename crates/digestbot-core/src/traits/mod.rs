// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter and collaborator traits.
//!
//! Channel and storage adapters extend the [`PluginAdapter`] base trait.
//! [`TimerStore`] and [`CommandExecutor`] are the narrow contracts the timer
//! loops consume. All traits use `#[async_trait]` for dynamic dispatch.

pub mod adapter;
pub mod channel;
pub mod executor;
pub mod storage;
pub mod timer_store;

pub use adapter::PluginAdapter;
pub use channel::ChannelAdapter;
pub use executor::CommandExecutor;
pub use storage::StorageAdapter;
pub use timer_store::TimerStore;
