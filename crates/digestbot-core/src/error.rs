// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for digestbot.

use digestbot_parser::ParseError;
use thiserror::Error;

/// The primary error type used across adapter traits and the timer loops.
#[derive(Debug, Error)]
pub enum DigestError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Timer store errors (database connection, query failure, bad row data).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Delivery failures from a channel adapter.
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The command executor could not produce a reply.
    #[error("executor error: {message}")]
    Executor {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Grammar errors. The display text is meant for the requester.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DigestError {
    /// Shorthand for a storage error that carries only a message.
    pub fn storage_msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        DigestError::Storage {
            source: message.into(),
        }
    }

    /// True for [`DigestError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, DigestError::Timeout { .. })
    }
}
