use std::collections::BTreeMap;

use tipbot_i18n::keys;

use crate::usage_grammar::{Grammar, GrammarError, UsageLine};

/// Program word every usage line starts with; replaced by `/` in help output.
pub const USAGE_PROGRAM: &str = "c";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// One row of the command table. `aliases[0]` is the primary alias.
pub struct CommandDefinition {
    pub aliases: &'static [&'static str],
    pub argstr: &'static str,
    pub inline: bool,
    pub inline_example: &'static str,
}

impl CommandDefinition {
    pub const fn new(aliases: &'static [&'static str], argstr: &'static str) -> Self {
        Self {
            aliases,
            argstr,
            inline: false,
            inline_example: "",
        }
    }

    pub const fn inline(
        aliases: &'static [&'static str],
        argstr: &'static str,
        inline_example: &'static str,
    ) -> Self {
        Self {
            aliases,
            argstr,
            inline: true,
            inline_example,
        }
    }

    pub fn primary_alias(&self) -> &'static str {
        self.aliases.first().copied().unwrap_or_default()
    }

    pub fn help_key(&self) -> String {
        keys::command_help_key(self.primary_alias())
    }
}

pub const DEFAULT_COMMANDS: &[CommandDefinition] = &[
    CommandDefinition::new(&["start", "tutorial"], "[<tutorial>]"),
    CommandDefinition::inline(
        &["receive", "invoice", "fund"],
        "(lnurl <lnurl> | (<satoshis> | any) [<description>...] [--preimage=<preimage>])",
        "invoice <satoshis>",
    ),
    CommandDefinition::new(
        &["pay", "decode", "paynow", "withdraw"],
        "(lnurl [<satoshis>] | [now] [<invoice>])",
    ),
    CommandDefinition::new(
        &["send", "tip", "sendanonymously"],
        "[anonymously] <satoshis> [<receiver>...] [--anonymous]",
    ),
    CommandDefinition::new(&["balance"], ""),
    CommandDefinition::new(&["transactions"], ""),
    CommandDefinition::new(&["transaction", "tx"], "<hash>"),
    CommandDefinition::inline(&["giveaway"], "<satoshis>", "giveaway <satoshis>"),
    CommandDefinition::inline(
        &["coinflip", "lottery"],
        "<satoshis> [<num_participants>]",
        "coinflip <satoshis> <num_participants>",
    ),
    CommandDefinition::inline(
        &["giveflip"],
        "<satoshis> [<num_participants>]",
        "giveflip <satoshis> <num_participants>",
    ),
    CommandDefinition::new(
        &["fundraise", "crowdfund"],
        "<satoshis> <num_participants> <receiver>...",
    ),
    CommandDefinition::new(
        &["hide"],
        "<satoshis> <message>... [--revealers=<num_revealers>] [--crowdfund=<num_participants>] [--public] [--private]",
    ),
    CommandDefinition::inline(
        &["reveal"],
        "<hidden_message_id>",
        "reveal [hidden_message_id]",
    ),
    CommandDefinition::new(&["lnurl"], "<lnurl>"),
    CommandDefinition::new(&["rename"], "<name>..."),
    CommandDefinition::new(&["apps", "app"], ""),
    CommandDefinition::new(
        &["microbet", "app microbet"],
        "[bets | balance | withdraw | bet]",
    ),
    CommandDefinition::new(
        &["bitflash", "app bitflash"],
        "(orders | status | rate | <satoshis> <address>)",
    ),
    CommandDefinition::new(
        &["satellite", "app satellite"],
        "(transmissions | queue | bump <satoshis> <transmission_id> | delete <transmission_id> | <satoshis> <message>...)",
    ),
    CommandDefinition::new(&["golightning", "app golightning"], "<satoshis>"),
    CommandDefinition::new(&["gifts", "app gifts"], "(list | [<satoshis>])"),
    CommandDefinition::new(
        &["paywall", "app paywall"],
        "[list | <url> <satoshis> <memo>... | balance | withdraw]",
    ),
    CommandDefinition::inline(
        &["poker", "app poker"],
        "deposit <satoshis> | balance | withdraw | status | url | play | (available|watch|wait) <minutes>",
        "poker",
    ),
    CommandDefinition::new(&["bluewallet", "lndhub", "zeus"], "[refresh]"),
    CommandDefinition::new(
        &["toggle"],
        "(ticket [<price>] | renamable [<price>] | spammy | coinflips | language [<lang>])",
    ),
    CommandDefinition::new(&["help"], "[<command>...]"),
    CommandDefinition::new(&["stop"], ""),
];

#[derive(Debug, Default)]
/// Collects command definitions and compiles them into a [`CommandRegistry`].
pub struct RegistryBuilder {
    service_id: String,
    definitions: Vec<CommandDefinition>,
}

impl RegistryBuilder {
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            definitions: Vec::new(),
        }
    }

    pub fn with_default_table(mut self) -> Self {
        self.definitions.extend_from_slice(DEFAULT_COMMANDS);
        self
    }

    pub fn define(mut self, definition: CommandDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn build(self) -> Result<CommandRegistry, GrammarError> {
        let mut alias_index = BTreeMap::new();
        let mut aliases = Vec::new();
        let mut lines = Vec::new();
        for (index, definition) in self.definitions.iter().enumerate() {
            if definition.aliases.is_empty() {
                return Err(GrammarError::EmptyAlias);
            }
            for alias in definition.aliases {
                let normalized = alias.split_whitespace().collect::<Vec<_>>().join(" ");
                if normalized.is_empty() || normalized != *alias {
                    return Err(GrammarError::EmptyAlias);
                }
                if alias_index.insert(normalized, index).is_some() {
                    return Err(GrammarError::DuplicateAlias((*alias).to_string()));
                }
                aliases.push(*alias);
                lines.push(UsageLine::new(*alias, definition.argstr));
            }
        }

        let grammar = Grammar::compile(&lines)?;
        let rendered = lines
            .iter()
            .map(|line| format!("  {}", line.render(USAGE_PROGRAM)))
            .collect::<Vec<_>>()
            .join("\n");
        let usage = format!("{}\n\nUsage:\n{rendered}", self.service_id);
        tracing::debug!(
            commands = self.definitions.len(),
            aliases = aliases.len(),
            "compiled command registry"
        );

        Ok(CommandRegistry {
            service_id: self.service_id,
            definitions: self.definitions,
            alias_index,
            aliases,
            grammar,
            usage,
        })
    }
}

#[derive(Debug, Clone)]
/// Immutable command table plus its compiled usage grammar.
pub struct CommandRegistry {
    service_id: String,
    definitions: Vec<CommandDefinition>,
    alias_index: BTreeMap<String, usize>,
    aliases: Vec<&'static str>,
    grammar: Grammar,
    usage: String,
}

impl CommandRegistry {
    /// Registry over [`DEFAULT_COMMANDS`].
    pub fn with_defaults(service_id: impl Into<String>) -> Result<Self, GrammarError> {
        RegistryBuilder::new(service_id).with_default_table().build()
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn definitions(&self) -> &[CommandDefinition] {
        &self.definitions
    }

    /// Every alias in table order.
    pub fn aliases(&self) -> &[&'static str] {
        &self.aliases
    }

    pub fn definition(&self, alias: &str) -> Option<&CommandDefinition> {
        self.alias_index
            .get(alias)
            .and_then(|index| self.definitions.get(*index))
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Usage block: the service id, a blank line, then one line per alias.
    pub fn usage(&self) -> &str {
        &self.usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn functional_default_table_compiles() {
        let registry = CommandRegistry::with_defaults("tipbot").expect("registry");
        assert!(registry.usage().starts_with("tipbot\n\nUsage:\n  c start [<tutorial>]\n"));
        assert!(registry.usage().contains("\n  c app microbet [bets | balance | withdraw | bet]\n"));
        assert!(registry.usage().ends_with("\n  c stop"));
        assert_eq!(
            registry.aliases().len(),
            DEFAULT_COMMANDS
                .iter()
                .map(|definition| definition.aliases.len())
                .sum::<usize>()
        );
        assert_eq!(
            registry
                .definition("withdraw")
                .map(CommandDefinition::primary_alias),
            Some("pay")
        );
        assert_eq!(
            registry.definition("app poker").map(|definition| definition.inline),
            Some(true)
        );
    }

    #[test]
    fn unit_usage_is_deterministic() {
        let first = CommandRegistry::with_defaults("tipbot").expect("first");
        let second = CommandRegistry::with_defaults("tipbot").expect("second");
        assert_eq!(first.usage(), second.usage());
    }

    #[test]
    fn regression_duplicate_alias_is_rejected() {
        let error = RegistryBuilder::new("tipbot")
            .with_default_table()
            .define(CommandDefinition::new(&["tip"], "<satoshis>"))
            .build()
            .expect_err("duplicate alias");
        assert_eq!(error, GrammarError::DuplicateAlias("tip".to_string()));
    }

    #[test]
    fn regression_empty_or_padded_alias_is_rejected() {
        for aliases in [&[][..], &[""][..], &[" pay"][..]] {
            let error = RegistryBuilder::new("tipbot")
                .define(CommandDefinition::new(aliases, ""))
                .build()
                .expect_err("invalid alias");
            assert_eq!(error, GrammarError::EmptyAlias);
        }
    }

    #[test]
    fn regression_malformed_argstr_fails_at_build() {
        let error = RegistryBuilder::new("tipbot")
            .define(CommandDefinition::new(&["broken"], "(<satoshis>"))
            .build()
            .expect_err("malformed argstr");
        assert!(matches!(error, GrammarError::Unbalanced { .. }));
    }

    #[test]
    fn unit_help_key_uses_primary_alias() {
        let registry = CommandRegistry::with_defaults("tipbot").expect("registry");
        assert_eq!(
            registry.definition("lottery").map(CommandDefinition::help_key),
            Some("coinflip_help".to_string())
        );
    }
}
