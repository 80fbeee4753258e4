// SPDX-FileCopyrightText: 2026 Digestbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command grammar engine for the Digestbot chat assistant.
//!
//! Free-text input is split on whitespace and matched against a tree of
//! grammars:
//!
//! - an [`Argument`] is a typed, named parsing unit with a default value;
//! - a [`Command`] is an ordered list of arguments behind a selector word;
//! - a [`CommandParser`] dispatches a line to a command or, recursively, to a
//!   named sub-parser.
//!
//! The same grammar parses live user input and the command text stored in a
//! scheduled timer, so a timer's payload always round-trips through the rules
//! that produced it.
//!
//! ```
//! use digestbot_parser::{Argument, CommandBuilder, CommandParser};
//!
//! let top = CommandBuilder::new("top")
//!     .add_argument(Argument::int("N", 5))
//!     .build();
//! let parser = CommandParser::builder().command(top).build();
//!
//! let result = parser.parse("top 25").unwrap().unwrap();
//! assert_eq!(result.command, "top");
//! assert_eq!(result.args.int("N"), Some(25));
//! ```

pub mod argument;
pub mod command;
pub mod error;
pub mod parser;
pub mod result;
pub mod value;

pub use argument::{Argument, ArgumentKind};
pub use command::{Command, CommandBuilder};
pub use error::ParseError;
pub use parser::{CommandParser, CommandParserBuilder, GrammarNode};
pub use result::{ArgMap, CommandParseResult, ParseResult};
pub use value::Value;
