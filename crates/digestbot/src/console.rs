// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal stand-ins for the chat platform and the message archive.

use async_trait::async_trait;
use tracing::info;

use digestbot_commands::{DigestSource, Source, TopArgs, describe_delta};
use digestbot_core::{
    AdapterType, ChannelAdapter, CommandRequest, DigestError, HealthStatus, MessageId,
    OutboundMessage, PluginAdapter,
};

/// Delivers messages by printing them to stdout.
pub struct ConsoleChannel;

#[async_trait]
impl PluginAdapter for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
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
impl ChannelAdapter for ConsoleChannel {
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, DigestError> {
        let id = MessageId(uuid::Uuid::new_v4().to_string());
        info!(channel = %msg.channel_id, message_id = %id.0, "message delivered");
        println!("[{}] {}", msg.channel_id, msg.text);
        Ok(id)
    }
}

/// Describes the digest that was asked for instead of ranking real messages.
pub struct DescribedDigest;

#[async_trait]
impl DigestSource for DescribedDigest {
    async fn top(&self, request: &CommandRequest, args: &TopArgs) -> Result<String, DigestError> {
        let scope = match &args.source {
            None => "all channels".to_string(),
            Some(Source::Channel(id)) => format!("<#{id}>"),
            Some(Source::Preset(name)) => format!("preset `{name}`"),
        };
        Ok(format!(
            "<@{}>, top {} messages from {} over the last {}, sorted by {}.",
            request.username,
            args.count,
            scope,
            describe_delta(args.period),
            args.sorting
        ))
    }
}
