// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` and captures outbound messages
//! for assertion in tests. It can be switched into a failing mode to exercise
//! delivery error paths.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use digestbot_core::traits::adapter::PluginAdapter;
use digestbot_core::traits::channel::ChannelAdapter;
use digestbot_core::types::{AdapterType, HealthStatus, MessageId, OutboundMessage};
use digestbot_core::DigestError;

/// A mock messaging channel for testing.
pub struct MockChannel {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    failing: AtomicBool,
    notify: Arc<Notify>,
}

impl MockChannel {
    /// Create a new mock channel that accepts every message.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failing: AtomicBool::new(false),
            notify: Arc::new(Notify::new()),
        }
    }

    /// While set, `send()` fails and records nothing.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get all messages that were sent through `send()`.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Get the count of sent messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Clear all sent messages.
    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// Wait until at least `n` messages have been sent.
    pub async fn wait_for_sent(&self, n: usize) {
        loop {
            let notified = self.notify.notified();
            if self.sent_count().await >= n {
                return;
            }
            notified.await;
        }
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, DigestError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DigestError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, DigestError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DigestError::Channel {
                message: format!("mock delivery to {} refused", msg.channel_id),
                source: None,
            });
        }
        let id = format!("mock-msg-{}", uuid::Uuid::new_v4());
        self.sent.lock().await.push(msg);
        self.notify.notify_waiters();
        Ok(MessageId(id))
    }
}
