// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed, named argument definitions.
//!
//! An [`Argument`] never fails loudly: a token that does not fit its grammar
//! yields [`ParseResult::NotParsed`] carrying the default, and the enclosing
//! [`Command`](crate::Command) offers the same token to the next argument.

use chrono::TimeDelta;

use crate::result::ParseResult;
use crate::value::Value;

/// The grammar an argument accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentKind {
    /// Base-10 signed integer.
    Int,
    /// Any non-empty token.
    String,
    /// One of a fixed set of words.
    Choice(Vec<String>),
    /// `<int><unit>` with unit in `m`, `h`, `d`, `w`; the integer may be negative.
    TimeDelta,
    /// Exactly this literal. Used for mandatory keywords inside composite commands.
    Exact(String),
    /// Every remaining token. Must be declared last.
    MultiString,
}

/// A named parsing unit with a default value.
///
/// Arguments are immutable once built and are shared by every parse of the
/// command that declares them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    name: String,
    default: Value,
    kind: ArgumentKind,
}

impl Argument {
    pub fn new(name: impl Into<String>, kind: ArgumentKind, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
            kind,
        }
    }

    pub fn int(name: impl Into<String>, default: i64) -> Self {
        Self::new(name, ArgumentKind::Int, default)
    }

    /// A free-form word; omitted means [`Value::Null`].
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentKind::String, Value::Null)
    }

    pub fn choice<I, S>(name: impl Into<String>, choices: I, default: impl Into<Value>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices = choices.into_iter().map(Into::into).collect();
        Self::new(name, ArgumentKind::Choice(choices), default)
    }

    pub fn time_delta(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self::new(name, ArgumentKind::TimeDelta, default)
    }

    /// A fixed keyword. The literal doubles as the default value.
    pub fn exact(name: impl Into<String>, literal: impl Into<String>) -> Self {
        let literal = literal.into();
        Self::new(name, ArgumentKind::Exact(literal.clone()), literal)
    }

    pub fn multi_string(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentKind::MultiString, Value::Null)
    }

    /// Replace the default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn kind(&self) -> &ArgumentKind {
        &self.kind
    }

    pub fn is_multi(&self) -> bool {
        matches!(self.kind, ArgumentKind::MultiString)
    }

    /// Offer a single token to this argument.
    ///
    /// A multi-string argument treats the token as a one-element slice.
    pub fn parse(&self, token: &str) -> ParseResult {
        let parsed = match &self.kind {
            ArgumentKind::Int => token.parse::<i64>().ok().map(Value::Int),
            ArgumentKind::String => (!token.is_empty()).then(|| Value::from(token)),
            ArgumentKind::Choice(choices) => choices
                .iter()
                .any(|c| c == token)
                .then(|| Value::from(token)),
            ArgumentKind::TimeDelta => parse_time_delta(token).map(Value::Duration),
            ArgumentKind::Exact(literal) => (token == literal).then(|| Value::from(token)),
            ArgumentKind::MultiString => {
                return self.parse_many(&[token.to_string()]);
            }
        };
        self.finish(parsed)
    }

    /// Offer the whole remaining token slice to a multi-string argument.
    ///
    /// An empty slice leaves the argument at its default. For single-token
    /// kinds only the first token is considered.
    pub fn parse_many(&self, tokens: &[String]) -> ParseResult {
        match &self.kind {
            ArgumentKind::MultiString => {
                let parsed = (!tokens.is_empty()).then(|| Value::List(tokens.to_vec()));
                self.finish(parsed)
            }
            _ => match tokens.first() {
                Some(token) => self.parse(token),
                None => ParseResult::NotParsed(self.default.clone()),
            },
        }
    }

    fn finish(&self, parsed: Option<Value>) -> ParseResult {
        match parsed {
            Some(value) => ParseResult::Parsed(value),
            None => ParseResult::NotParsed(self.default.clone()),
        }
    }
}

/// Parse `<int><unit>` into a duration.
///
/// Returns `None` for tokens shorter than two characters, an unknown unit, a
/// prefix that is not an integer, or a magnitude that overflows.
fn parse_time_delta(token: &str) -> Option<TimeDelta> {
    if token.chars().count() < 2 {
        return None;
    }
    let (split, unit) = token.char_indices().last()?;
    let count: i64 = token[..split].parse().ok()?;
    match unit {
        'm' => TimeDelta::try_minutes(count),
        'h' => TimeDelta::try_hours(count),
        'd' => TimeDelta::try_days(count),
        'w' => TimeDelta::try_weeks(count),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta_arg() -> Argument {
        Argument::time_delta("date", Value::Null)
    }

    #[test]
    fn time_delta_units() {
        let arg = delta_arg();
        assert_eq!(
            arg.parse("3m"),
            ParseResult::Parsed(Value::Duration(TimeDelta::minutes(3)))
        );
        assert_eq!(
            arg.parse("3h"),
            ParseResult::Parsed(Value::Duration(TimeDelta::hours(3)))
        );
        assert_eq!(
            arg.parse("3d"),
            ParseResult::Parsed(Value::Duration(TimeDelta::days(3)))
        );
        assert_eq!(
            arg.parse("3w"),
            ParseResult::Parsed(Value::Duration(TimeDelta::weeks(3)))
        );
    }

    #[test]
    fn time_delta_negative_magnitude_is_accepted() {
        assert_eq!(
            delta_arg().parse("-3w"),
            ParseResult::Parsed(Value::Duration(TimeDelta::weeks(-3)))
        );
    }

    #[test]
    fn time_delta_falls_back_on_bad_input() {
        let arg = delta_arg().with_default(TimeDelta::days(1));
        let fallback = ParseResult::NotParsed(Value::Duration(TimeDelta::days(1)));
        assert_eq!(arg.parse("3p"), fallback);
        assert_eq!(arg.parse("d"), fallback);
        assert_eq!(arg.parse("xd"), fallback);
        assert_eq!(arg.parse(""), fallback);
        assert_eq!(arg.parse("99999999999999999w"), fallback);
    }

    #[test]
    fn int_parses_base_ten_only() {
        let arg = Argument::int("N", 5);
        assert_eq!(arg.parse("25"), ParseResult::Parsed(Value::Int(25)));
        assert_eq!(arg.parse("0"), ParseResult::Parsed(Value::Int(0)));
        assert_eq!(arg.parse("-4"), ParseResult::Parsed(Value::Int(-4)));
        assert_eq!(arg.parse("3w"), ParseResult::NotParsed(Value::Int(5)));
        assert_eq!(arg.parse(""), ParseResult::NotParsed(Value::Int(5)));
    }

    #[test]
    fn string_rejects_empty_token() {
        let arg = Argument::string("channel");
        assert_eq!(arg.parse("general"), ParseResult::Parsed("general".into()));
        assert_eq!(arg.parse(""), ParseResult::NotParsed(Value::Null));
    }

    #[test]
    fn choice_accepts_only_listed_words() {
        let arg = Argument::choice("sorting", ["replies", "length"], "replies");
        assert_eq!(arg.parse("length"), ParseResult::Parsed("length".into()));
        assert_eq!(arg.parse("Length"), ParseResult::NotParsed("replies".into()));
    }

    #[test]
    fn exact_defaults_to_its_literal() {
        let arg = Argument::exact("top_placeholder", "top");
        assert_eq!(arg.parse("top"), ParseResult::Parsed("top".into()));
        assert_eq!(arg.parse("tops"), ParseResult::NotParsed("top".into()));
    }

    #[test]
    fn multi_string_takes_whole_slice() {
        let arg = Argument::multi_string("channels");
        let tokens = vec!["#a".to_string(), "#b".to_string()];
        assert_eq!(arg.parse_many(&tokens), ParseResult::Parsed(Value::List(tokens.clone())));
        assert_eq!(arg.parse_many(&[]), ParseResult::NotParsed(Value::Null));
    }
}
