//! Picks who a transfer goes to. An explicit receiver in the command wins over
//! the author of the replied-to message; with neither there is no receiver.

use tipbot_core::{ReplyContext, SenderProfile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverSource {
    /// A user mentioned by entity (no public username).
    Mention(SenderProfile),
    /// `@username` typed in the arguments, without the `@`.
    Username(String),
    /// Author of the replied-to message; leftover arguments become the note.
    ReplyAuthor {
        sender: SenderProfile,
        note: Option<String>,
    },
    Missing,
}

impl ReceiverSource {
    pub fn display_name(&self) -> String {
        match self {
            Self::Mention(profile) => profile.display_name(),
            Self::Username(username) => format!("@{username}"),
            Self::ReplyAuthor { sender, .. } => sender.display_name(),
            Self::Missing => String::new(),
        }
    }

    pub fn note(&self) -> Option<&str> {
        match self {
            Self::ReplyAuthor { note, .. } => note.as_deref(),
            _ => None,
        }
    }
}

fn username_token(token: &str) -> Option<&str> {
    let username = token.trim().strip_prefix('@')?;
    let valid = !username.is_empty()
        && username
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    valid.then_some(username)
}

/// Explicit receivers only: entity mentions first, then `@username` tokens.
pub fn explicit_receiver(tokens: &[String], text_mentions: &[SenderProfile]) -> ReceiverSource {
    if let Some(profile) = text_mentions.first() {
        return ReceiverSource::Mention(profile.clone());
    }
    tokens
        .iter()
        .find_map(|token| username_token(token))
        .map(|username| ReceiverSource::Username(username.to_string()))
        .unwrap_or(ReceiverSource::Missing)
}

pub fn select_receiver(
    tokens: &[String],
    text_mentions: &[SenderProfile],
    reply_to: Option<&ReplyContext>,
) -> ReceiverSource {
    let explicit = explicit_receiver(tokens, text_mentions);
    if explicit != ReceiverSource::Missing {
        return explicit;
    }
    match reply_to {
        Some(reply) => {
            let note = tokens.join(" ").trim().to_string();
            ReceiverSource::ReplyAuthor {
                sender: reply.sender.clone(),
                note: (!note.is_empty()).then_some(note),
            }
        }
        None => ReceiverSource::Missing,
    }
}
