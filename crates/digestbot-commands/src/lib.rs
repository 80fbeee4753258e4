// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The digestbot command layer.
//!
//! - [`grammar`] builds the `top` / `help` / `timers` parser tree.
//! - [`args`] turns parsed argument maps into typed structs.
//! - [`CommandDispatcher`] answers parsed commands, managing timers through
//!   the [`TimerStore`](digestbot_core::TimerStore) and delegating `top` to a
//!   [`DigestSource`].

pub mod args;
pub mod dispatcher;
pub mod grammar;
pub mod help;
pub mod source;
pub mod timers;

pub use args::{HelpArgs, SortingMethod, Source, TimersAddArgs, TimersRmArgs, TopArgs};
pub use dispatcher::{CommandDispatcher, UNKNOWN_COMMAND};
pub use grammar::root_parser;
pub use source::DigestSource;
pub use timers::describe_delta;
