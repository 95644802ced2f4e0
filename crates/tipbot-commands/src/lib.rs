//! Chat command grammar, parser and help engine.
//!
//! A [`RegistryBuilder`] compiles the command table into an immutable
//! [`CommandRegistry`] holding the usage grammar. [`parse_command_text`] turns a
//! chat message into a typed [`Command`], and [`render_help`] answers `/help`
//! and unparseable input with usage or "did you mean" suggestions.

pub mod command;
pub mod command_help;
pub mod command_parser;
pub mod command_registry;
pub mod parsed_options;
pub mod usage_grammar;

pub use command::{Command, InvoiceAmount, ParsedCommand, ToggleTarget};
pub use command_help::{display_usage, escape_html, find_similar, render_help, HelpReply};
pub use command_parser::{
    normalize_command_line, parse_command_text, tokenize, CommandLine, CommandParse,
    COMMAND_PREFIX,
};
pub use command_registry::{
    CommandDefinition, CommandRegistry, RegistryBuilder, DEFAULT_COMMANDS, USAGE_PROGRAM,
};
pub use parsed_options::{OptionValue, ParsedOptions};
pub use usage_grammar::{Grammar, GrammarError, ParseError, UsageLine};
