// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Selector dispatch over commands and nested sub-parsers.

use tracing::trace;

use crate::command::Command;
use crate::error::ParseError;
use crate::result::CommandParseResult;

/// One entry in a parser's grammar: a leaf command or a nested parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarNode {
    Command(Command),
    SubParser(CommandParser),
}

impl GrammarNode {
    /// The selector word this node answers to. Unnamed parsers have none.
    pub fn selector(&self) -> Option<&str> {
        match self {
            GrammarNode::Command(c) => Some(c.name()),
            GrammarNode::SubParser(p) => p.name(),
        }
    }
}

/// Dispatches a line of text to the matching grammar by its first word.
///
/// Built once at start-up and shared (behind an `Arc`) by every component
/// that parses input, including the timer scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandParser {
    name: Option<String>,
    nodes: Vec<GrammarNode>,
}

impl CommandParser {
    pub fn new(
        commands: Vec<Command>,
        name: Option<String>,
        sub_parsers: Vec<CommandParser>,
    ) -> Self {
        let nodes = sub_parsers
            .into_iter()
            .map(GrammarNode::SubParser)
            .chain(commands.into_iter().map(GrammarNode::Command))
            .collect();
        Self { name, nodes }
    }

    pub fn builder() -> CommandParserBuilder {
        CommandParserBuilder::default()
    }

    /// Selector of this parser when nested under another one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn nodes(&self) -> &[GrammarNode] {
        &self.nodes
    }

    /// Selectors known to this parser, in registration order.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(GrammarNode::selector)
    }

    /// Parse a raw line.
    ///
    /// Returns `Ok(None)` for blank input or an unknown selector. A known
    /// sub-parser selector always yields a result, with an empty
    /// `sub_parser_result` when nothing after it matched. The selector is
    /// matched case-insensitively; sub-parsers win over commands with the
    /// same name.
    pub fn parse(&self, text: &str) -> Result<Option<CommandParseResult>, ParseError> {
        let tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        self.parse_tokens(&tokens)
    }

    /// Parse an already tokenized line.
    pub fn parse_tokens(&self, tokens: &[String]) -> Result<Option<CommandParseResult>, ParseError> {
        let Some((first, rest)) = tokens.split_first() else {
            return Ok(None);
        };
        let selector = first.to_lowercase();

        if let Some(sub) = self.find_sub_parser(&selector) {
            trace!(selector = %selector, "dispatching to sub-parser");
            let inner = sub.parse_tokens(rest)?;
            return Ok(Some(CommandParseResult::nested(selector, inner)));
        }

        if let Some(command) = self.find_command(&selector) {
            let walk = command.walk(rest)?;
            return Ok(Some(CommandParseResult::leaf(
                selector,
                walk.args,
                rest.to_vec(),
                walk.positions,
            )));
        }

        trace!(selector = %selector, "no grammar matched");
        Ok(None)
    }

    fn find_sub_parser(&self, selector: &str) -> Option<&CommandParser> {
        self.nodes.iter().find_map(|node| match node {
            GrammarNode::SubParser(p) if p.name() == Some(selector) => Some(p),
            _ => None,
        })
    }

    fn find_command(&self, selector: &str) -> Option<&Command> {
        self.nodes.iter().find_map(|node| match node {
            GrammarNode::Command(c) if c.name() == selector => Some(c),
            _ => None,
        })
    }
}

/// Registers commands and sub-parsers before the parser is frozen.
#[derive(Debug, Default)]
pub struct CommandParserBuilder {
    name: Option<String>,
    nodes: Vec<GrammarNode>,
}

impl CommandParserBuilder {
    /// Name the parser so it can be nested under another one.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn command(mut self, command: Command) -> Self {
        self.nodes.push(GrammarNode::Command(command));
        self
    }

    pub fn sub_parser(mut self, parser: CommandParser) -> Self {
        self.nodes.push(GrammarNode::SubParser(parser));
        self
    }

    pub fn register(mut self, node: GrammarNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn build(self) -> CommandParser {
        CommandParser {
            name: self.name,
            nodes: self.nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::Argument;
    use crate::command::CommandBuilder;

    fn timers() -> CommandParser {
        CommandParser::builder()
            .name("timers")
            .command(CommandBuilder::new("ls").build())
            .command(
                CommandBuilder::new("rm")
                    .add_argument(Argument::string("timer_name"))
                    .build(),
            )
            .build()
    }

    fn root() -> CommandParser {
        CommandParser::new(
            vec![CommandBuilder::new("help")
                .add_argument(Argument::string("command"))
                .build()],
            None,
            vec![timers()],
        )
    }

    #[test]
    fn blank_input_is_not_a_command() {
        assert_eq!(root().parse("").unwrap(), None);
        assert_eq!(root().parse("   \t ").unwrap(), None);
    }

    #[test]
    fn unknown_selector_is_not_a_command() {
        assert_eq!(root().parse("dance now").unwrap(), None);
    }

    #[test]
    fn selector_is_case_insensitive() {
        let result = root().parse("HELP timers").unwrap().unwrap();
        assert_eq!(result.command, "help");
        assert_eq!(result.args.str("command"), Some("timers"));
    }

    #[test]
    fn sub_parser_dispatch_wraps_inner_result() {
        let result = root().parse("timers ls").unwrap().unwrap();
        assert_eq!(result.command, "timers");
        assert!(result.args.is_empty());
        assert_eq!(result.sub().unwrap().command, "ls");
    }

    #[test]
    fn sub_parser_without_sub_command_has_empty_inner_result() {
        for line in ["timers", "timers bogus"] {
            let result = root().parse(line).unwrap().unwrap();
            assert_eq!(result.command, "timers");
            assert!(result.sub().is_none());
        }
    }

    #[test]
    fn nested_too_many_arguments_names_inner_command() {
        let err = root().parse("timers rm a b").unwrap_err();
        assert_eq!(
            err,
            ParseError::TooManyArguments {
                command: "rm".into()
            }
        );
    }

    #[test]
    fn selectors_are_listed_in_order() {
        let parser = root();
        let names: Vec<_> = parser.selectors().collect();
        assert_eq!(names, vec!["timers", "help"]);
    }
}
