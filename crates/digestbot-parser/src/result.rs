// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parse outcomes at the argument and command level.

use std::collections::BTreeMap;

use chrono::TimeDelta;

use crate::value::Value;

/// Outcome of offering one token (or token slice) to an [`Argument`](crate::Argument).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult {
    /// The token matched the argument's grammar and was consumed.
    Parsed(Value),
    /// The token did not match; the argument falls back to this value and
    /// the token stays available for the next argument.
    NotParsed(Value),
}

impl ParseResult {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseResult::Parsed(_))
    }

    pub fn value(&self) -> &Value {
        match self {
            ParseResult::Parsed(v) | ParseResult::NotParsed(v) => v,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            ParseResult::Parsed(v) | ParseResult::NotParsed(v) => v,
        }
    }
}

/// Name to value mapping produced by one command parse.
///
/// Every declared argument has an entry, parsed or defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgMap(BTreeMap<String, Value>);

impl ArgMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn duration(&self, name: &str) -> Option<TimeDelta> {
        self.get(name).and_then(Value::as_duration)
    }

    pub fn list(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(Value::as_list)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ArgMap {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// One parse of one input line.
///
/// For a sub-parser selector (`timers ls`) the outer result carries the
/// selector and empty `args`, and `sub_parser_result` holds the nested parse.
/// A leaf result keeps the tokens handed to its command and the position at
/// which each argument consumed a token, so callers can recover the original
/// text of any suffix without searching the raw string again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandParseResult {
    pub command: String,
    pub args: ArgMap,
    pub sub_parser_result: Option<Box<CommandParseResult>>,
    tokens: Vec<String>,
    positions: BTreeMap<String, usize>,
}

impl CommandParseResult {
    /// Result for a leaf command.
    pub fn leaf(
        command: impl Into<String>,
        args: ArgMap,
        tokens: Vec<String>,
        positions: BTreeMap<String, usize>,
    ) -> Self {
        Self {
            command: command.into(),
            args,
            sub_parser_result: None,
            tokens,
            positions,
        }
    }

    /// Result for a sub-parser selector. `sub` is `None` when the words
    /// after the selector matched nothing in the sub-parser.
    pub fn nested(command: impl Into<String>, sub: Option<CommandParseResult>) -> Self {
        Self {
            command: command.into(),
            args: ArgMap::new(),
            sub_parser_result: sub.map(Box::new),
            tokens: Vec::new(),
            positions: BTreeMap::new(),
        }
    }

    /// The nested result, if this line was dispatched to a sub-parser.
    pub fn sub(&self) -> Option<&CommandParseResult> {
        self.sub_parser_result.as_deref()
    }

    /// True when this result came from the sub-parser named `name`.
    pub fn is_sub_parser(&self, name: &str) -> bool {
        self.sub_parser_result.is_some() && self.command == name
    }

    /// The tokens that followed the selector.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether `arg` matched a token (as opposed to taking its default).
    pub fn was_parsed(&self, arg: &str) -> bool {
        self.positions.contains_key(arg)
    }

    /// Text from the token consumed by `arg` to the end of the line,
    /// re-joined with single spaces. `None` if `arg` did not consume a token.
    pub fn tail_from(&self, arg: &str) -> Option<String> {
        let start = *self.positions.get(arg)?;
        self.tokens.get(start..).map(|rest| rest.join(" "))
    }
}
