// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for delivering replies to a chat platform.

use async_trait::async_trait;

use crate::error::DigestError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MessageId, OutboundMessage};

/// Delivers reply text to a channel.
///
/// A failed delivery is reported as [`DigestError::Channel`]. The timer loops
/// log it and carry on; it never blocks rescheduling.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, DigestError>;
}
