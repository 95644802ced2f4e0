use crate::command::ParsedCommand;
use crate::command_registry::CommandRegistry;
use crate::usage_grammar::ParseError;

pub const COMMAND_PREFIX: char = '/';

#[derive(Debug, Clone, PartialEq)]
/// Outcome of reading one chat message as a command.
pub enum CommandParse {
    /// No command prefix, or a command addressed to another bot.
    NotACommand,
    Parsed(ParsedCommand),
    /// Prefixed text the grammar rejected; `method` is the normalized verb.
    Unparseable { method: String, error: ParseError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Command text with the prefix and this bot's mention removed.
pub struct CommandLine {
    /// Lowercased verb with `_` expanded to spaces.
    pub verb: String,
    pub line: String,
}

/// `/app_microbet_bets@tipbot` becomes `app microbet bets`; `—` becomes `--`.
pub fn normalize_command_line(service_id: &str, text: &str) -> Option<CommandLine> {
    let body = text.trim().strip_prefix(COMMAND_PREFIX)?;
    let body = body.replace('—', "--");
    let (verb, rest) = match body.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (body.as_str(), ""),
    };
    let verb = match verb.split_once('@') {
        Some((verb, mention)) if mention.eq_ignore_ascii_case(service_id) => verb,
        Some(_) => return None,
        None => verb,
    };
    if verb.is_empty() {
        return None;
    }
    let verb = verb.to_lowercase().replace('_', " ");
    let line = if rest.is_empty() {
        verb.clone()
    } else {
        format!("{verb} {rest}")
    };
    Some(CommandLine { verb, line })
}

/// Shell-style split; unbalanced quotes fall back to whitespace splitting.
pub fn tokenize(line: &str) -> Vec<String> {
    match shell_words::split(line) {
        Ok(argv) => argv,
        Err(error) => {
            tracing::debug!(%error, "falling back to whitespace tokenization");
            line.split_whitespace().map(str::to_string).collect()
        }
    }
}

pub fn parse_command_text(registry: &CommandRegistry, text: &str) -> CommandParse {
    let Some(CommandLine { verb: method, line }) =
        normalize_command_line(registry.service_id(), text)
    else {
        return CommandParse::NotACommand;
    };
    let argv = tokenize(&line);
    let parsed = registry
        .grammar()
        .parse(&argv)
        .and_then(ParsedCommand::from_options);
    match parsed {
        Ok(parsed) => CommandParse::Parsed(parsed),
        Err(error) => {
            tracing::debug!(%error, method = %method, "failed to parse command");
            CommandParse::Unparseable { method, error }
        }
    }
}
