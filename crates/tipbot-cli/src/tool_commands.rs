use anyhow::{Context, Result};
use tipbot_commands::{display_usage, parse_command_text, render_help, CommandParse};
use tipbot_lnurl::{decode_lnurl, encode_lnurl};

use crate::bot_runtime::{build_bundle, build_registry};
use crate::bot_settings::BotSettings;
use crate::cli_args::CliCommand;

/// Runs one offline subcommand and returns what it prints.
pub fn execute_tool_command(settings: &BotSettings, command: &CliCommand) -> Result<String> {
    match command {
        CliCommand::Usage => {
            let registry = build_registry(&settings.service_id)?;
            Ok(display_usage(&registry))
        }
        CliCommand::Parse { text } => {
            let registry = build_registry(&settings.service_id)?;
            Ok(match parse_command_text(&registry, text) {
                CommandParse::NotACommand => "not a command".to_string(),
                CommandParse::Parsed(parsed) => {
                    format!("{}\n{:#?}", parsed.command.name(), parsed.command)
                }
                CommandParse::Unparseable { method, error } => {
                    format!("unparseable '{method}': {error}")
                }
            })
        }
        CliCommand::Help { locale, topic } => {
            let registry = build_registry(&settings.service_id)?;
            let bundle = build_bundle(&settings.default_locale)?;
            let locale = if locale.trim().is_empty() {
                settings.default_locale.as_str()
            } else {
                locale.as_str()
            };
            let topic = topic.join(" ");
            Ok(render_help(&registry, &bundle, locale, &topic)
                .map(|help| help.into_text())
                .unwrap_or_else(|| format!("no help for '{topic}'")))
        }
        CliCommand::EncodeLnurl { url } => {
            encode_lnurl(url.trim()).with_context(|| format!("failed to encode '{url}'"))
        }
        CliCommand::DecodeLnurl { lnurl } => {
            decode_lnurl(lnurl).with_context(|| format!("failed to decode '{lnurl}'"))
        }
    }
}
