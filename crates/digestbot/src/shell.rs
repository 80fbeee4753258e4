// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `digestbot shell` command implementation.
//!
//! Launches an interactive REPL with colored prompt and readline history.
//! Every line is handled exactly like a chat message from `--user` in
//! `--channel`, so timers created here are stored for `serve` to fire.

use std::sync::Arc;

use colored::Colorize;
use digestbot_commands::{CommandDispatcher, root_parser};
use digestbot_config::model::DigestConfig;
use digestbot_core::{Clock, CommandRequest, DigestError, StorageAdapter, SystemClock};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::serve::{build_dispatcher, open_storage};

/// Runs the `digestbot shell` interactive REPL.
pub async fn run_shell(config: DigestConfig, user: String, channel: String) -> Result<(), DigestError> {
    let storage = open_storage(&config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let dispatcher = build_dispatcher(&config, Arc::new(root_parser()), storage.clone(), clock);

    let mut rl = DefaultEditor::new()
        .map_err(|e| DigestError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", config.agent.name).bold().green());
    println!(
        "Talking as {} in {}. Type {} to exit.\n",
        user.cyan(),
        channel.cyan(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", config.agent.name.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);
                let reply = dispatch(&dispatcher, &channel, &user, trimmed).await;
                println!("{reply}\n");
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    storage.close().await
}

/// Prints a user's timers, as `timers ls` would in chat.
pub async fn list_timers(config: DigestConfig, user: &str) -> Result<(), DigestError> {
    let storage = open_storage(&config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let dispatcher = build_dispatcher(&config, Arc::new(root_parser()), storage.clone(), clock);

    println!("{}", dispatch(&dispatcher, "cli", user, "timers ls").await);
    storage.close().await
}

async fn dispatch(dispatcher: &CommandDispatcher, channel: &str, user: &str, text: &str) -> String {
    debug!(user, channel, text, "shell command");
    dispatcher
        .handle(&CommandRequest::new(channel, user, text))
        .await
}
