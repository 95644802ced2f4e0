//! Compiled docopt-style usage grammar.
//!
//! Each usage line is `<alias words> <argument pattern>`. Patterns support
//! commands (`lnurl`), arguments (`<satoshis>`), long options (`--public`,
//! `--revealers=<n>`), required groups `( )`, optional groups `[ ]` whose
//! children are each optional, alternatives `|` and repetition `...`.
//!
//! Options are pulled out of argv wherever they appear; the remaining
//! positional tokens must be consumed by one usage line in full. Lines are
//! tried in table order and the first complete match wins.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::parsed_options::{OptionValue, ParsedOptions};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Enumerates supported `GrammarError` values.
pub enum GrammarError {
    #[error("command definition has an empty alias")]
    EmptyAlias,
    #[error("alias '{0}' is defined more than once")]
    DuplicateAlias(String),
    #[error("usage for '{alias}': unbalanced '{token}'")]
    Unbalanced { alias: String, token: String },
    #[error("usage for '{alias}': malformed element '{token}'")]
    MalformedElement { alias: String, token: String },
    #[error("option {name} is declared both with and without a value")]
    ConflictingOption { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Enumerates supported `ParseError` values.
pub enum ParseError {
    #[error("unknown option {0}")]
    UnknownOption(String),
    #[error("option {option} is ambiguous, could be {candidates}")]
    AmbiguousOption { option: String, candidates: String },
    #[error("option {0} requires a value")]
    MissingOptionValue(String),
    #[error("option {0} doesn't take a value")]
    UnexpectedOptionValue(String),
    #[error("no usage matches '{0}'")]
    NoMatch(String),
    #[error("missing required argument {0}")]
    MissingArgument(String),
    #[error("input matched no command")]
    NoCommand,
}

/// One `<alias> <argstr>` entry of the usage block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageLine {
    pub alias: String,
    pub argstr: String,
}

impl UsageLine {
    pub fn new(alias: impl Into<String>, argstr: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            argstr: argstr.into(),
        }
    }

    pub fn render(&self, program: &str) -> String {
        format!("{program} {} {}", self.alias, self.argstr)
            .trim_end()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    Command(String),
    Argument(String),
    Option(String),
    Required(Vec<Pattern>),
    Optional(Vec<Pattern>),
    Either(Vec<Pattern>),
    OneOrMore(Box<Pattern>),
}

#[derive(Debug, Clone)]
struct CompiledLine {
    pattern: Pattern,
}

#[derive(Debug, Clone)]
/// Usage grammar compiled once from the command table.
pub struct Grammar {
    lines: Vec<CompiledLine>,
    options: BTreeMap<String, bool>,
    defaults: BTreeMap<String, OptionValue>,
}

impl Grammar {
    pub fn compile(lines: &[UsageLine]) -> Result<Self, GrammarError> {
        let mut options = BTreeMap::new();
        let mut compiled = Vec::with_capacity(lines.len());
        for line in lines {
            let mut sequence = line
                .alias
                .split_whitespace()
                .map(|word| Pattern::Command(word.to_string()))
                .collect::<Vec<_>>();
            if sequence.is_empty() {
                return Err(GrammarError::EmptyAlias);
            }
            if !line.argstr.trim().is_empty() {
                let mut parser = PatternParser {
                    alias: &line.alias,
                    tokens: lex(&line.argstr),
                    position: 0,
                    options: &mut options,
                };
                let expression = parser.expression()?;
                if let Some(token) = parser.peek() {
                    return Err(GrammarError::Unbalanced {
                        alias: line.alias.clone(),
                        token: token.to_string(),
                    });
                }
                sequence.push(expression);
            }
            compiled.push(CompiledLine {
                pattern: Pattern::Required(sequence),
            });
        }

        let mut repeated = BTreeSet::new();
        for line in &compiled {
            collect_repeated(&line.pattern, false, &mut repeated);
        }
        let mut defaults = BTreeMap::new();
        for line in &compiled {
            collect_defaults(&line.pattern, &repeated, &options, &mut defaults);
        }

        Ok(Self {
            lines: compiled,
            options,
            defaults,
        })
    }

    /// Names of every `--option` the grammar declares.
    pub fn option_names(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }

    pub fn parse(&self, argv: &[String]) -> Result<ParsedOptions, ParseError> {
        let (positionals, provided) = self.split_argv(argv)?;
        let repeated = self
            .defaults
            .iter()
            .filter(|(_, value)| matches!(value, OptionValue::List(_)))
            .map(|(key, _)| key.clone())
            .collect::<BTreeSet<_>>();
        let matcher = Matcher {
            positionals: &positionals,
            options: &provided,
            repeated: &repeated,
        };

        for line in &self.lines {
            let complete = matcher
                .outcomes(&line.pattern, MatchState::default())
                .into_iter()
                .find(|state| {
                    state.position == positionals.len() && state.used_options.len() == provided.len()
                });
            if let Some(state) = complete {
                let mut values = self.defaults.clone();
                values.extend(state.values);
                return Ok(ParsedOptions::new(values));
            }
        }
        Err(ParseError::NoMatch(argv.join(" ")))
    }

    fn split_argv(
        &self,
        argv: &[String],
    ) -> Result<(Vec<String>, BTreeMap<String, Option<String>>), ParseError> {
        let mut positionals = Vec::new();
        let mut provided = BTreeMap::new();
        let mut only_positionals = false;
        let mut tokens = argv.iter();
        while let Some(token) = tokens.next() {
            if only_positionals {
                positionals.push(token.clone());
                continue;
            }
            if token == "--" {
                only_positionals = true;
                continue;
            }
            let Some(body) = token.strip_prefix("--") else {
                positionals.push(token.clone());
                continue;
            };
            let (raw_name, inline_value) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };
            let name = self.resolve_option(&format!("--{raw_name}"))?;
            let takes_value = self.options.get(&name).copied().unwrap_or(false);
            let value = match (takes_value, inline_value) {
                (true, Some(value)) => Some(value.to_string()),
                (true, None) => Some(
                    tokens
                        .next()
                        .cloned()
                        .ok_or_else(|| ParseError::MissingOptionValue(name.clone()))?,
                ),
                (false, Some(_)) => return Err(ParseError::UnexpectedOptionValue(name)),
                (false, None) => None,
            };
            provided.insert(name, value);
        }
        Ok((positionals, provided))
    }

    fn resolve_option(&self, option: &str) -> Result<String, ParseError> {
        if self.options.contains_key(option) {
            return Ok(option.to_string());
        }
        let candidates = self
            .options
            .keys()
            .filter(|name| name.starts_with(option))
            .cloned()
            .collect::<Vec<_>>();
        match candidates.as_slice() {
            [] => Err(ParseError::UnknownOption(option.to_string())),
            [single] => Ok(single.clone()),
            _ => Err(ParseError::AmbiguousOption {
                option: option.to_string(),
                candidates: candidates.join(", "),
            }),
        }
    }
}

fn lex(source: &str) -> Vec<String> {
    let mut spaced = String::with_capacity(source.len() * 2);
    for ch in source.replace("...", " ... ").chars() {
        if matches!(ch, '(' | ')' | '[' | ']' | '|') {
            spaced.push(' ');
            spaced.push(ch);
            spaced.push(' ');
        } else {
            spaced.push(ch);
        }
    }
    spaced.split_whitespace().map(str::to_string).collect()
}

struct PatternParser<'a> {
    alias: &'a str,
    tokens: Vec<String>,
    position: usize,
    options: &'a mut BTreeMap<String, bool>,
}

impl PatternParser<'_> {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    fn advance(&mut self) -> Option<String> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn unbalanced(&self, token: &str) -> GrammarError {
        GrammarError::Unbalanced {
            alias: self.alias.to_string(),
            token: token.to_string(),
        }
    }

    fn malformed(&self, token: &str) -> GrammarError {
        GrammarError::MalformedElement {
            alias: self.alias.to_string(),
            token: token.to_string(),
        }
    }

    fn expression(&mut self) -> Result<Pattern, GrammarError> {
        let mut alternatives = vec![self.sequence()?];
        while self.peek() == Some("|") {
            self.advance();
            alternatives.push(self.sequence()?);
        }
        if alternatives.len() == 1 {
            Ok(Pattern::Required(alternatives.remove(0)))
        } else {
            Ok(Pattern::Either(
                alternatives.into_iter().map(Pattern::Required).collect(),
            ))
        }
    }

    fn sequence(&mut self) -> Result<Vec<Pattern>, GrammarError> {
        let mut items = Vec::new();
        while let Some(token) = self.peek() {
            if matches!(token, "|" | ")" | "]") {
                break;
            }
            let atom = self.atom()?;
            if self.peek() == Some("...") {
                self.advance();
                items.push(Pattern::OneOrMore(Box::new(atom)));
            } else {
                items.push(atom);
            }
        }
        Ok(items)
    }

    fn atom(&mut self) -> Result<Pattern, GrammarError> {
        let Some(token) = self.advance() else {
            return Err(self.unbalanced("<end>"));
        };
        match token.as_str() {
            "(" => {
                let inner = self.expression()?;
                self.expect(")")?;
                Ok(Pattern::Required(vec![inner]))
            }
            "[" => {
                let inner = self.expression()?;
                self.expect("]")?;
                Ok(match inner {
                    Pattern::Required(children) => Pattern::Optional(children),
                    other => Pattern::Optional(vec![other]),
                })
            }
            "..." => Err(self.malformed(&token)),
            _ => self.element(&token),
        }
    }

    fn expect(&mut self, closing: &str) -> Result<(), GrammarError> {
        match self.advance() {
            Some(token) if token == closing => Ok(()),
            Some(token) => Err(self.unbalanced(&token)),
            None => Err(self.unbalanced(closing)),
        }
    }

    fn element(&mut self, token: &str) -> Result<Pattern, GrammarError> {
        if let Some(body) = token.strip_prefix("--") {
            let (name, value) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };
            let valid_name =
                !name.is_empty() && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-');
            let valid_value = value.map_or(true, is_argument_name);
            if !valid_name || !valid_value {
                return Err(self.malformed(token));
            }
            let option = format!("--{name}");
            let takes_value = value.is_some();
            match self.options.get(&option) {
                Some(existing) if *existing != takes_value => {
                    return Err(GrammarError::ConflictingOption { name: option });
                }
                _ => {
                    self.options.insert(option.clone(), takes_value);
                }
            }
            return Ok(Pattern::Option(option));
        }
        if is_argument_name(token) {
            return Ok(Pattern::Argument(token.to_string()));
        }
        if token
            .chars()
            .all(|ch| ch.is_alphanumeric() || ch == '-' || ch == '_')
            && !token.starts_with('-')
        {
            return Ok(Pattern::Command(token.to_string()));
        }
        Err(self.malformed(token))
    }
}

fn is_argument_name(token: &str) -> bool {
    token.len() > 2 && token.starts_with('<') && token.ends_with('>')
}

fn collect_repeated(pattern: &Pattern, inside_repeat: bool, repeated: &mut BTreeSet<String>) {
    match pattern {
        Pattern::Argument(name) if inside_repeat => {
            repeated.insert(name.clone());
        }
        Pattern::Command(_) | Pattern::Argument(_) | Pattern::Option(_) => {}
        Pattern::Required(children) | Pattern::Optional(children) | Pattern::Either(children) => {
            for child in children {
                collect_repeated(child, inside_repeat, repeated);
            }
        }
        Pattern::OneOrMore(child) => collect_repeated(child, true, repeated),
    }
}

fn collect_defaults(
    pattern: &Pattern,
    repeated: &BTreeSet<String>,
    options: &BTreeMap<String, bool>,
    defaults: &mut BTreeMap<String, OptionValue>,
) {
    match pattern {
        Pattern::Command(name) => {
            defaults.insert(name.clone(), OptionValue::Flag(false));
        }
        Pattern::Argument(name) => {
            let value = if repeated.contains(name) {
                OptionValue::List(Vec::new())
            } else {
                OptionValue::Text(None)
            };
            defaults.insert(name.clone(), value);
        }
        Pattern::Option(name) => {
            let value = if options.get(name).copied().unwrap_or(false) {
                OptionValue::Text(None)
            } else {
                OptionValue::Flag(false)
            };
            defaults.insert(name.clone(), value);
        }
        Pattern::Required(children) | Pattern::Optional(children) | Pattern::Either(children) => {
            for child in children {
                collect_defaults(child, repeated, options, defaults);
            }
        }
        Pattern::OneOrMore(child) => collect_defaults(child, repeated, options, defaults),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct MatchState {
    position: usize,
    used_options: BTreeSet<String>,
    values: BTreeMap<String, OptionValue>,
}

struct Matcher<'a> {
    positionals: &'a [String],
    options: &'a BTreeMap<String, Option<String>>,
    repeated: &'a BTreeSet<String>,
}

impl Matcher<'_> {
    /// Every way `pattern` can match from `state`, most preferred first.
    fn outcomes(&self, pattern: &Pattern, state: MatchState) -> Vec<MatchState> {
        match pattern {
            Pattern::Command(name) => match self.positionals.get(state.position) {
                Some(token) if token == name => {
                    let mut next = state;
                    next.position += 1;
                    next.values.insert(name.clone(), OptionValue::Flag(true));
                    vec![next]
                }
                _ => Vec::new(),
            },
            Pattern::Argument(name) => match self.positionals.get(state.position) {
                Some(token) => {
                    let mut next = state;
                    next.position += 1;
                    if self.repeated.contains(name) {
                        match next.values.get_mut(name) {
                            Some(OptionValue::List(values)) => values.push(token.clone()),
                            _ => {
                                next.values
                                    .insert(name.clone(), OptionValue::List(vec![token.clone()]));
                            }
                        }
                    } else {
                        next.values
                            .insert(name.clone(), OptionValue::Text(Some(token.clone())));
                    }
                    vec![next]
                }
                None => Vec::new(),
            },
            Pattern::Option(name) => {
                if state.used_options.contains(name) {
                    return Vec::new();
                }
                let Some(value) = self.options.get(name) else {
                    return Vec::new();
                };
                let mut next = state;
                next.used_options.insert(name.clone());
                let bound = match value {
                    Some(value) => OptionValue::Text(Some(value.clone())),
                    None => OptionValue::Flag(true),
                };
                next.values.insert(name.clone(), bound);
                vec![next]
            }
            Pattern::Required(children) => self.sequence(children, state, false),
            Pattern::Optional(children) => self.sequence(children, state, true),
            Pattern::Either(alternatives) => {
                let mut results = Vec::new();
                for alternative in alternatives {
                    push_unique(&mut results, self.outcomes(alternative, state.clone()));
                }
                results
            }
            Pattern::OneOrMore(child) => self.repeat(child, state),
        }
    }

    fn sequence(&self, children: &[Pattern], state: MatchState, each_optional: bool) -> Vec<MatchState> {
        let mut states = vec![state];
        for child in children {
            let mut next_states = Vec::new();
            for current in states {
                push_unique(&mut next_states, self.outcomes(child, current.clone()));
                if each_optional {
                    push_unique(&mut next_states, vec![current]);
                }
            }
            states = next_states;
            if states.is_empty() {
                break;
            }
        }
        states
    }

    /// `...` is greedy: each branch repeats until it stops making progress.
    /// No backtracking into shorter repetitions, so cost stays linear in argv.
    fn repeat(&self, child: &Pattern, state: MatchState) -> Vec<MatchState> {
        if let Pattern::Argument(name) = child {
            return self.take_remaining(name, state).into_iter().collect();
        }
        let mut settled = Vec::new();
        let mut frontier = self.outcomes(child, state);
        while !frontier.is_empty() {
            let mut extended = Vec::new();
            for current in frontier {
                let progressed = self
                    .outcomes(child, current.clone())
                    .into_iter()
                    .filter(|matched| {
                        matched.position > current.position
                            || matched.used_options.len() > current.used_options.len()
                    })
                    .collect::<Vec<_>>();
                if progressed.is_empty() {
                    push_unique(&mut settled, vec![current]);
                } else {
                    push_unique(&mut extended, progressed);
                }
            }
            frontier = extended;
        }
        settled
    }

    /// Binds every remaining positional to a repeated argument in one step.
    fn take_remaining(&self, name: &str, mut state: MatchState) -> Option<MatchState> {
        let rest = self.positionals.get(state.position..).unwrap_or_default();
        if rest.is_empty() {
            return None;
        }
        match state.values.get_mut(name) {
            Some(OptionValue::List(values)) => values.extend(rest.iter().cloned()),
            _ => {
                let value = if self.repeated.contains(name) {
                    OptionValue::List(rest.to_vec())
                } else {
                    OptionValue::Text(rest.last().cloned())
                };
                state.values.insert(name.to_string(), value);
            }
        }
        state.position = self.positionals.len();
        Some(state)
    }
}

fn push_unique(target: &mut Vec<MatchState>, candidates: Vec<MatchState>) {
    for candidate in candidates {
        if !target.contains(&candidate) {
            target.push(candidate);
        }
    }
}
