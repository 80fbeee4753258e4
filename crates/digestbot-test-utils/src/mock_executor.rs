// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock command executor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use digestbot_core::{CommandExecutor, CommandRequest, DigestError};
use digestbot_parser::CommandParseResult;

/// Replies `digest for <request text>` and records every call.
#[derive(Default)]
pub struct MockExecutor {
    calls: Mutex<Vec<(CommandRequest, CommandParseResult)>>,
    failing: AtomicBool,
    delay: Option<Duration>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long (on the tokio clock) before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// While set, `execute()` returns [`DigestError::Executor`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn requests(&self) -> Vec<CommandRequest> {
        self.calls.lock().await.iter().map(|(r, _)| r.clone()).collect()
    }

    pub async fn parsed(&self) -> Vec<CommandParseResult> {
        self.calls.lock().await.iter().map(|(_, p)| p.clone()).collect()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(
        &self,
        request: &CommandRequest,
        parsed: &CommandParseResult,
    ) -> Result<String, DigestError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().await.push((request.clone(), parsed.clone()));
        if self.failing.load(Ordering::SeqCst) {
            return Err(DigestError::Executor {
                message: "mock executor failure".into(),
                source: None,
            });
        }
        Ok(format!("digest for {}", request.text))
    }
}
