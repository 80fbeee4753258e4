// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routes parsed commands to their handlers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use digestbot_config::model::{DigestConfig, TimersConfig};
use digestbot_core::{Clock, CommandExecutor, CommandRequest, DigestError, TimerStore};
use digestbot_parser::{CommandParseResult, CommandParser};

use crate::args::{HelpArgs, TimersAddArgs, TimersRmArgs, TopArgs};
use crate::grammar::{ADD, HELP, LS, RM, TIMERS, TOP};
use crate::help;
use crate::source::DigestSource;
use crate::timers;

pub const UNKNOWN_COMMAND: &str =
    "Sorry, I couldn't understand your request. Type `help` for available commands.";

const INTERNAL_ERROR: &str = "Sorry, some error occurred during request handling. \
                              Please, try again later or contact bot developers. Thanks.";

/// Answers chat commands and fired timers.
///
/// Live lines go through [`CommandDispatcher::handle`], which parses them
/// first. The timer scheduler parses stored commands itself and calls
/// [`CommandExecutor::execute`] directly.
pub struct CommandDispatcher {
    bot_name: String,
    timers_config: TimersConfig,
    parser: Arc<CommandParser>,
    store: Arc<dyn TimerStore>,
    source: Arc<dyn DigestSource>,
    clock: Arc<dyn Clock>,
}

impl CommandDispatcher {
    pub fn new(
        config: &DigestConfig,
        parser: Arc<CommandParser>,
        store: Arc<dyn TimerStore>,
        source: Arc<dyn DigestSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bot_name: config.agent.name.clone(),
            timers_config: config.timers.clone(),
            parser,
            store,
            source,
            clock,
        }
    }

    /// Parse a chat line and produce the reply text.
    ///
    /// Grammar errors come back verbatim. Infrastructure failures are
    /// logged and answered with a generic apology.
    pub async fn handle(&self, request: &CommandRequest) -> String {
        let parsed = match self.parser.parse(&request.text) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return UNKNOWN_COMMAND.to_string(),
            Err(e) => return e.to_string(),
        };

        match self.execute(request, &parsed).await {
            Ok(reply) => reply,
            Err(DigestError::Parse(e)) => e.to_string(),
            Err(e) => {
                error!(
                    username = %request.username,
                    command = %parsed.command,
                    error = %e,
                    "command failed"
                );
                INTERNAL_ERROR.to_string()
            }
        }
    }

    async fn timers(
        &self,
        request: &CommandRequest,
        parsed: &CommandParseResult,
    ) -> Result<String, DigestError> {
        let Some(sub) = parsed.sub() else {
            return Ok("Couldn't parse the request. \
                       Please, check the syntax and type `help timers` for additional information."
                .into());
        };

        match sub.command.as_str() {
            ADD => {
                timers::add(
                    self.store.as_ref(),
                    self.clock.as_ref(),
                    &self.timers_config,
                    request,
                    TimersAddArgs::try_from(sub)?,
                )
                .await
            }
            LS => timers::list(self.store.as_ref(), &request.username).await,
            RM => {
                timers::remove(
                    self.store.as_ref(),
                    &request.username,
                    TimersRmArgs::from(&sub.args),
                )
                .await
            }
            _ => Ok(
                "Sub-command not found. Please check syntax or read `help timers` and try again."
                    .into(),
            ),
        }
    }

    async fn top(
        &self,
        request: &CommandRequest,
        parsed: &CommandParseResult,
    ) -> Result<String, DigestError> {
        let args = TopArgs::try_from(&parsed.args)?;
        if args.count <= 0 {
            return Ok("Number of messages should be positive.".into());
        }
        self.source.top(request, &args).await
    }
}

#[async_trait]
impl CommandExecutor for CommandDispatcher {
    async fn execute(
        &self,
        request: &CommandRequest,
        parsed: &CommandParseResult,
    ) -> Result<String, DigestError> {
        debug!(username = %request.username, command = %parsed.command, "dispatching command");
        match parsed.command.as_str() {
            TOP => self.top(request, parsed).await,
            HELP => {
                let args = HelpArgs::from(&parsed.args);
                Ok(help::render(&self.bot_name, args.topic.as_deref()))
            }
            TIMERS => self.timers(request, parsed).await,
            _ => Ok(UNKNOWN_COMMAND.to_string()),
        }
    }
}
