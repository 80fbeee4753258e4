// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Help replies.

use crate::grammar::{TIMERS, TOP};

pub fn render(bot_name: &str, topic: Option<&str>) -> String {
    match topic {
        None => general(bot_name),
        Some(TOP) => top().to_string(),
        Some(TIMERS) => timers().to_string(),
        Some(_) => "Help for this command not found. Type `help` for general help message.".into(),
    }
}

fn general(bot_name: &str) -> String {
    format!(
        "Hi! I'm {bot_name}, a bot who can send you top messages from given channels.\n\
         For help on any command type: `help command_name`\n\n\
         Available commands:\n\
         `top`\n\
         `timers`"
    )
}

fn top() -> &'static str {
    "Returns top messages from asked channels.\n\n\
     Syntax: `top [N=5] [time=1d] [sorting_method=replies] [channel=#_top|preset_name]`\n\n\
     All arguments are positional only.\n\
     `N`: amount of messages, int\n\
     `time`: delta between desired oldest message and now. Possible values: (int)(m|h|d|w), \
     where m - minutes, h - hours, d - days, w - weeks\n\
     `sorting_method`: messages sorting method, one of: replies, length, reactions\n\
     `channel`: channel link (with #) or preset name\n\n\
     Examples:\n\n\
     Get top messages over all channels:\n\
     `top`\n\n\
     Get top messages over all channels for last 12 hours:\n\
     `top 12h`\n\n\
     Get 10 top messages from #general for last 3 days:\n\
     `top 10 3d #general`\n\n\
     Get top 3 messages from #general for last 24 hours sorted by reactions rate:\n\
     `top 3 1d reactions #general`"
}

fn timers() -> &'static str {
    "Allows you to add, remove or list timers which send you top results on schedule.\n\n\
     *timers add* - schedule a new timer with given top command and frequency\n\
     Syntax: `timers add [cyclicity=every] [time=1d] top <top_command_arguments>`\n\
     All arguments are positional only.\n\
     Arguments:\n\
     `cyclicity`: only `every` is available (send results every N)\n\
     `time`: how often to send you top results, possible values: (int)(h|d|w), \
     where h - hours, d - days, w - weeks\n\
     `top`: mandatory keyword to explicitly state top command\n\
     `<top_command_arguments>`: arguments of top command in corresponding order, \
     see `help top` for more details\n\
     Examples:\n\n\
     Create timer with default frequency and default top command\n\
     `timers add top`\n\n\
     Create timer for every 3h with messages from kek preset\n\
     `timers add every 3h top kek`\n\n\n\
     *timers ls* - lists all your timers\n\
     Syntax: `timers ls`\n\n\n\
     *timers rm* - removes one of your timers\n\
     Syntax: `timers rm <timer_name>`\n\
     `timer_name`: name of timer (created automatically)\n\
     Example:\n\
     `timers rm oncx`"
}
