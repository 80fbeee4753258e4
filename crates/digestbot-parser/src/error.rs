// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grammar errors reported to the requester.

use thiserror::Error;

/// Errors raised while matching input against a grammar.
///
/// The message text is shown verbatim to the user who sent the command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// More tokens were supplied than the command's arguments could absorb.
    #[error("Too many arguments provided for command `{command}`")]
    TooManyArguments { command: String },
}
