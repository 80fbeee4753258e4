// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Digestbot - scheduled top-message digests for chat channels.
//!
//! This is the binary entry point.

mod console;
mod serve;
mod shell;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use digestbot_config::model::DigestConfig;

/// Digestbot - scheduled top-message digests for chat channels.
#[derive(Parser, Debug)]
#[command(name = "digestbot", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the timer scheduler and the missed-tick recovery worker.
    Serve,
    /// Talk to the bot from the terminal as a chat user.
    Shell {
        /// Username the typed lines are sent as.
        #[arg(long, default_value = "local")]
        user: String,
        /// Channel id replies and timers are bound to.
        #[arg(long, default_value = "shell")]
        channel: String,
    },
    /// Inspect stored timers.
    Timers {
        #[command(subcommand)]
        action: TimersAction,
    },
}

#[derive(Subcommand, Debug)]
enum TimersAction {
    /// List a user's timers.
    Ls {
        #[arg(long)]
        user: String,
    },
}

fn load_config(path: Option<&PathBuf>) -> DigestConfig {
    let loaded = match path {
        Some(path) => digestbot_config::load_and_validate_path(path),
        None => digestbot_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            digestbot_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` overrides the configured level when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("digestbot={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Shell { user, channel }) => shell::run_shell(config, user, channel).await,
        Some(Commands::Timers {
            action: TimersAction::Ls { user },
        }) => shell::list_timers(config, &user).await,
        None => {
            println!("digestbot: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn shell_flags_have_defaults() {
        let cli = Cli::try_parse_from(["digestbot", "shell"]).unwrap();
        match cli.command {
            Some(Commands::Shell { user, channel }) => {
                assert_eq!(user, "local");
                assert_eq!(channel, "shell");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn timers_ls_requires_user() {
        assert!(Cli::try_parse_from(["digestbot", "timers", "ls"]).is_err());
        let cli = Cli::try_parse_from(["digestbot", "--config", "x.toml", "timers", "ls", "--user", "U1"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }
}
