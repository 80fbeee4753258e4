// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The bot's command grammar.
//!
//! ```text
//! top [N=5] [time=1d] [sorting_method=replies] [channel]
//! help [command]
//! timers add [cyclicity=every] [timer_freq=1d] top <top arguments>
//! timers ls
//! timers rm <timer_name>
//! ```

use chrono::TimeDelta;
use digestbot_parser::{Argument, Command, CommandBuilder, CommandParser};

pub const TOP: &str = "top";
pub const HELP: &str = "help";
pub const TIMERS: &str = "timers";
pub const ADD: &str = "add";
pub const LS: &str = "ls";
pub const RM: &str = "rm";

/// Argument names, shared with the typed views in [`crate::args`].
pub mod arg {
    pub const COUNT: &str = "N";
    pub const PERIOD: &str = "time";
    pub const SORTING: &str = "sorting_method";
    pub const CHANNEL: &str = "channel";
    pub const TOPIC: &str = "command";
    pub const CYCLICITY: &str = "cyclicity";
    pub const FREQUENCY: &str = "timer_freq";
    pub const TOP_KEYWORD: &str = "top_placeholder";
    pub const TIMER_NAME: &str = "timer_name";
}

pub const SORTING_CHOICES: [&str; 3] = ["replies", "length", "reactions"];

fn top_arguments() -> Vec<Argument> {
    vec![
        Argument::int(arg::COUNT, 5),
        Argument::time_delta(arg::PERIOD, TimeDelta::days(1)),
        Argument::choice(arg::SORTING, SORTING_CHOICES, "replies"),
        Argument::string(arg::CHANNEL),
    ]
}

pub fn top_command() -> Command {
    CommandBuilder::new(TOP)
        .extend_with_arguments(top_arguments())
        .build()
}

pub fn help_command() -> Command {
    CommandBuilder::new(HELP)
        .add_argument(Argument::string(arg::TOPIC))
        .build()
}

/// `timers add|ls|rm`.
///
/// `add` embeds the full `top` argument list behind a literal `top` keyword,
/// so the text from that keyword onward is itself a valid `top` line.
pub fn timers_parser() -> CommandParser {
    let add = CommandBuilder::new(ADD)
        .add_argument(Argument::choice(arg::CYCLICITY, ["every"], "every"))
        .add_argument(Argument::time_delta(arg::FREQUENCY, TimeDelta::days(1)))
        .add_argument(Argument::exact(arg::TOP_KEYWORD, TOP))
        .extend_with_arguments(top_arguments())
        .build();
    let ls = CommandBuilder::new(LS).build();
    let rm = CommandBuilder::new(RM)
        .add_argument(Argument::string(arg::TIMER_NAME))
        .build();

    CommandParser::builder()
        .name(TIMERS)
        .command(add)
        .command(ls)
        .command(rm)
        .build()
}

/// Root parser: `top` and `help` commands plus the `timers` sub-parser.
pub fn root_parser() -> CommandParser {
    CommandParser::builder()
        .command(top_command())
        .command(help_command())
        .sub_parser(timers_parser())
        .build()
}
