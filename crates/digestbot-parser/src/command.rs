// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Commands: an ordered list of arguments behind a selector word.

use std::collections::BTreeMap;

use tracing::warn;

use crate::argument::Argument;
use crate::error::ParseError;
use crate::result::{ArgMap, ParseResult};

/// A named, immutable argument list.
///
/// Arguments are tried in declaration order and each one gets first refusal
/// on the current token. A token that an argument rejects is kept for the
/// next argument, which lets users omit any optional argument whose grammar
/// the following token does not satisfy (`top 3w general` skips `N`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    arguments: Vec<Argument>,
}

/// Arguments and the token index each matched argument consumed.
pub(crate) struct Walk {
    pub args: ArgMap,
    pub positions: BTreeMap<String, usize>,
}

impl Command {
    pub fn new(name: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Parse the tokens that followed the selector.
    ///
    /// Every declared argument appears in the result, parsed or defaulted.
    /// Fails with [`ParseError::TooManyArguments`] when tokens remain after
    /// all arguments had their turn.
    pub fn parse(&self, tokens: &[String]) -> Result<ArgMap, ParseError> {
        self.walk(tokens).map(|walk| walk.args)
    }

    pub(crate) fn walk(&self, tokens: &[String]) -> Result<Walk, ParseError> {
        let mut args: ArgMap = self
            .arguments
            .iter()
            .map(|a| (a.name(), a.default_value().clone()))
            .collect();
        let mut positions = BTreeMap::new();
        let mut cursor = 0;

        for arg in &self.arguments {
            if arg.is_multi() {
                let rest = tokens.get(cursor..).unwrap_or_default();
                if let ParseResult::Parsed(value) = arg.parse_many(rest) {
                    args.insert(arg.name(), value);
                    positions.insert(arg.name().to_string(), cursor);
                    cursor = tokens.len();
                }
                break;
            }

            let Some(token) = tokens.get(cursor) else {
                continue;
            };
            match arg.parse(token) {
                ParseResult::Parsed(value) => {
                    args.insert(arg.name(), value);
                    positions.insert(arg.name().to_string(), cursor);
                    cursor += 1;
                }
                ParseResult::NotParsed(value) => args.insert(arg.name(), value),
            }
        }

        if cursor < tokens.len() {
            return Err(ParseError::TooManyArguments {
                command: self.name.clone(),
            });
        }
        Ok(Walk { args, positions })
    }
}

/// Fluent construction of a [`Command`].
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    name: String,
    arguments: Vec<Argument>,
}

impl CommandBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn add_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn extend_with_arguments(mut self, arguments: impl IntoIterator<Item = Argument>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    pub fn build(self) -> Command {
        if let Some(pos) = self.arguments.iter().position(Argument::is_multi)
            && pos + 1 < self.arguments.len()
        {
            warn!(
                command = %self.name,
                argument = self.arguments[pos].name(),
                "multi-string argument is not last; later arguments always take their defaults"
            );
        }
        Command::new(self.name, self.arguments)
    }
}
