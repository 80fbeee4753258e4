// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Where `top` replies come from.

use async_trait::async_trait;

use digestbot_core::{CommandRequest, DigestError};

use crate::args::TopArgs;

/// Produces the text of a `top` digest.
///
/// Ranking messages is outside this crate; implementations wrap whatever
/// message archive the deployment has.
#[async_trait]
pub trait DigestSource: Send + Sync {
    async fn top(&self, request: &CommandRequest, args: &TopArgs) -> Result<String, DigestError>;
}
