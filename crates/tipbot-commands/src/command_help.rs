use serde_json::json;
use tipbot_i18n::{keys, TranslationBundle};

use crate::command_registry::{CommandRegistry, USAGE_PROGRAM};

const MAX_SUGGESTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Rendered help text and what kind of help it is.
pub enum HelpReply {
    Overview(String),
    Command(String),
    Suggestion(String),
}

impl HelpReply {
    pub fn text(&self) -> &str {
        match self {
            Self::Overview(text) | Self::Command(text) | Self::Suggestion(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Overview(text) | Self::Command(text) | Self::Suggestion(text) => text,
        }
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Usage block as shown to users, with the program word replaced by `/`.
pub fn display_usage(registry: &CommandRegistry) -> String {
    registry
        .usage()
        .replace(&format!("  {USAGE_PROGRAM} "), "  /")
}

/// Help for `method`. `None` means the method is unknown and nothing is close.
pub fn render_help(
    registry: &CommandRegistry,
    bundle: &TranslationBundle,
    locale: &str,
    method: &str,
) -> Option<HelpReply> {
    let method = method.trim().to_lowercase().replace('_', " ");
    if method.is_empty() {
        return Some(HelpReply::Overview(bundle.render_or_key(
            locale,
            keys::HELP_INTRO,
            json!({ "Help": escape_html(&display_usage(registry)) }),
        )));
    }

    let Some(definition) = registry.definition(&method) else {
        let similar = find_similar(&method, registry.aliases());
        if similar.is_empty() {
            return None;
        }
        return Some(HelpReply::Suggestion(bundle.render_or_key(
            locale,
            keys::HELP_SIMILAR,
            json!({ "Method": escape_html(&method), "Similar": similar }),
        )));
    };

    let help_key = definition.help_key();
    let body = if bundle.has(&help_key) {
        bundle.render_or_key(
            locale,
            &help_key,
            json!({ "BotName": registry.service_id() }),
        )
    } else {
        String::new()
    };
    let aliases = definition
        .aliases
        .iter()
        .filter(|alias| **alias != method)
        .collect::<Vec<_>>();
    Some(HelpReply::Command(bundle.render_or_key(
        locale,
        keys::HELP_METHOD,
        json!({
            "MainName": method,
            "Argstr": escape_html(definition.argstr),
            "Help": body,
            "HasInline": definition.inline,
            "InlineExample": escape_html(definition.inline_example),
            "Aliases": aliases,
            "ServiceId": registry.service_id(),
        }),
    )))
}

/// Aliases close to `method`: prefix matches first, then by edit distance.
pub fn find_similar(method: &str, aliases: &[&str]) -> Vec<String> {
    let method = method.trim();
    if method.is_empty() {
        return Vec::new();
    }
    let threshold = match method.chars().count() {
        0..=4 => 1,
        5..=8 => 2,
        _ => 3,
    };
    let mut scored = aliases
        .iter()
        .filter_map(|alias| {
            let distance = if alias.starts_with(method) {
                0
            } else {
                levenshtein_distance(method, alias)
            };
            (distance <= threshold).then_some((distance, *alias))
        })
        .collect::<Vec<_>>();
    scored.sort_by_key(|(distance, _)| *distance);
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, alias)| alias.to_string())
        .collect()
}

fn levenshtein_distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let b_chars = b.chars().collect::<Vec<_>>();
    let mut previous = (0..=b_chars.len()).collect::<Vec<_>>();
    let mut current = vec![0; b_chars.len() + 1];
    for (i, left) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, right) in b_chars.iter().enumerate() {
            let substitution = previous[j] + usize::from(left != *right);
            current[j + 1] = (previous[j + 1] + 1).min(current[j] + 1).min(substitution);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (CommandRegistry, TranslationBundle) {
        (
            CommandRegistry::with_defaults("tipbot").expect("registry"),
            TranslationBundle::builtin("en").expect("bundle"),
        )
    }

    #[test]
    fn unit_levenshtein_distance_counts_edits() {
        assert_eq!(levenshtein_distance("send", "send"), 0);
        assert_eq!(levenshtein_distance("sned", "send"), 2);
        assert_eq!(levenshtein_distance("blance", "balance"), 1);
        assert_eq!(levenshtein_distance("", "tip"), 3);
    }

    #[test]
    fn unit_find_similar_prefers_closest_and_caps_results() {
        let aliases = ["balance", "bitflash", "bluewallet", "giveaway", "giveflip"];
        assert_eq!(find_similar("blance", &aliases), vec!["balance"]);
        assert_eq!(find_similar("give", &aliases), vec!["giveaway", "giveflip"]);
        assert_eq!(find_similar("b", &aliases).len(), MAX_SUGGESTIONS);
        assert!(find_similar("zzzzzz", &aliases).is_empty());
    }

    #[test]
    fn functional_empty_method_renders_escaped_usage() {
        let (registry, bundle) = fixtures();
        let reply = render_help(&registry, &bundle, "en", "  ").expect("overview");
        assert!(matches!(reply, HelpReply::Overview(_)));
        assert!(reply.text().contains("  /send [anonymously] &lt;satoshis&gt;"));
        assert!(!reply.text().contains("  c send"));
    }

    #[test]
    fn functional_exact_alias_renders_method_help() {
        let (registry, bundle) = fixtures();
        let reply = render_help(&registry, &bundle, "en", "Lottery").expect("method help");
        let HelpReply::Command(text) = reply else {
            panic!("expected command help");
        };
        assert!(text.contains("/lottery &lt;satoshis&gt; [&lt;num_participants&gt;]"));
        assert!(text.contains("fair lottery"));
        assert!(text.contains("@tipbot coinflip"));
        assert!(text.contains("<code>coinflip</code>"));
    }

    #[test]
    fn unit_underscore_method_matches_multi_word_alias() {
        let (registry, bundle) = fixtures();
        let reply = render_help(&registry, &bundle, "en", "app_microbet").expect("help");
        assert!(matches!(reply, HelpReply::Command(_)));
    }

    #[test]
    fn functional_unknown_method_offers_suggestions_or_nothing() {
        let (registry, bundle) = fixtures();
        let reply = render_help(&registry, &bundle, "en", "balanse").expect("suggestion");
        let HelpReply::Suggestion(text) = reply else {
            panic!("expected suggestion");
        };
        assert!(text.contains("<code>balanse</code>"));
        assert!(text.contains("<code>balance</code>"));
        assert_eq!(render_help(&registry, &bundle, "en", "qwertyuiopasdf"), None);
    }
}
