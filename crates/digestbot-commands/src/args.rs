// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed views over parsed argument maps.
//!
//! The grammar guarantees each argument is present with its declared type,
//! so a conversion failure here means the grammar and these structs drifted
//! apart; it is reported as [`DigestError::Internal`].

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::TimeDelta;
use regex::Regex;
use strum::{Display, EnumString};

use digestbot_core::DigestError;
use digestbot_parser::{ArgMap, CommandParseResult};

use crate::grammar::arg;

/// Matches a chat channel link such as `<#C6JKNA63|#general>`.
#[allow(clippy::expect_used)]
static CHANNEL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<#(?P<id>[A-Z\d]+)\|.+>$").expect("constant regex pattern is valid")
});

/// How `top` orders candidate messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SortingMethod {
    Replies,
    Length,
    Reactions,
}

/// Where `top` looks for messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A channel link, reduced to the channel id.
    Channel(String),
    /// Anything else names a preset.
    Preset(String),
}

impl Source {
    pub fn from_token(token: &str) -> Self {
        match CHANNEL_LINK.captures(token).and_then(|c| c.name("id")) {
            Some(id) => Source::Channel(id.as_str().to_string()),
            None => Source::Preset(token.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopArgs {
    pub count: i64,
    pub period: TimeDelta,
    pub sorting: SortingMethod,
    /// `None` means every channel.
    pub source: Option<Source>,
}

impl TryFrom<&ArgMap> for TopArgs {
    type Error = DigestError;

    fn try_from(args: &ArgMap) -> Result<Self, Self::Error> {
        let sorting = required_str(args, arg::SORTING)?;
        Ok(Self {
            count: args.int(arg::COUNT).ok_or_else(|| missing(arg::COUNT))?,
            period: args.duration(arg::PERIOD).ok_or_else(|| missing(arg::PERIOD))?,
            sorting: SortingMethod::from_str(sorting)
                .map_err(|_| DigestError::Internal(format!("unknown sorting method `{sorting}`")))?,
            source: args.str(arg::CHANNEL).map(Source::from_token),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpArgs {
    pub topic: Option<String>,
}

impl From<&ArgMap> for HelpArgs {
    fn from(args: &ArgMap) -> Self {
        Self {
            topic: args.str(arg::TOPIC).map(str::to_lowercase),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimersAddArgs {
    pub frequency: TimeDelta,
    /// The stored command, from the `top` keyword to the end of the line.
    /// `None` when the keyword was left out.
    pub top_command: Option<String>,
    pub top: TopArgs,
}

impl TryFrom<&CommandParseResult> for TimersAddArgs {
    type Error = DigestError;

    fn try_from(parsed: &CommandParseResult) -> Result<Self, Self::Error> {
        Ok(Self {
            frequency: parsed
                .args
                .duration(arg::FREQUENCY)
                .ok_or_else(|| missing(arg::FREQUENCY))?,
            top_command: parsed.tail_from(arg::TOP_KEYWORD),
            top: TopArgs::try_from(&parsed.args)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimersRmArgs {
    pub timer_name: Option<String>,
}

impl From<&ArgMap> for TimersRmArgs {
    fn from(args: &ArgMap) -> Self {
        Self {
            timer_name: args.str(arg::TIMER_NAME).map(str::to_string),
        }
    }
}

fn required_str<'a>(args: &'a ArgMap, name: &str) -> Result<&'a str, DigestError> {
    args.str(name).ok_or_else(|| missing(name))
}

fn missing(name: &str) -> DigestError {
    DigestError::Internal(format!("argument `{name}` missing from parse result"))
}
