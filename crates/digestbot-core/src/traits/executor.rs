// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The command executor contract.

use async_trait::async_trait;
use digestbot_parser::CommandParseResult;

use crate::error::DigestError;
use crate::types::CommandRequest;

/// Turns a parsed command into reply text.
///
/// The scheduler hands it the request synthesized from a timer; the chat
/// front end hands it live requests. An `Err` means no reply could be
/// produced at all. Problems the user should read (bad arguments, missing
/// timers) are returned as `Ok` reply text.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(
        &self,
        request: &CommandRequest,
        parsed: &CommandParseResult,
    ) -> Result<String, DigestError>;
}
