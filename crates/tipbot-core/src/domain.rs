//! Chat-side domain handles resolved per dispatch.
//!
//! Actors and conversations are read/write-through handles owned by the user
//! directory; the command engine never caches them beyond one message.

use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type ChatId = i64;
pub type MessageId = i64;

pub const DEFAULT_LOCALE: &str = "en";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `ChatKind` values.
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Group => "group",
            Self::Supergroup => "supergroup",
            Self::Channel => "channel",
        }
    }

    pub fn is_private(self) -> bool {
        matches!(self, Self::Private)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
/// Transport-level identity of whoever sent or authored a message.
pub struct SenderProfile {
    pub transport_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

impl SenderProfile {
    /// `@username` when known, otherwise the trimmed full name.
    pub fn display_name(&self) -> String {
        match self.username.as_deref().filter(|name| !name.is_empty()) {
            Some(username) => format!("@{username}"),
            None => format!("{} {}", self.first_name, self.last_name)
                .trim()
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// The message an inbound message replies to.
pub struct ReplyContext {
    pub message_id: MessageId,
    pub sender: SenderProfile,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Transport-agnostic inbound chat message.
pub struct InboundMessage {
    pub message_id: MessageId,
    pub chat_id: ChatId,
    pub chat_kind: ChatKind,
    /// Absent for channel posts.
    #[serde(default)]
    pub sender: Option<SenderProfile>,
    #[serde(default)]
    pub text: String,
    /// True when the first entity of the message is a bot command at offset 0.
    #[serde(default)]
    pub leading_bot_command: bool,
    #[serde(default)]
    pub reply_to: Option<ReplyContext>,
    /// Users mentioned by entity (people without a public username).
    #[serde(default)]
    pub text_mentions: Vec<SenderProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// A ledger account holder as resolved by the user directory.
pub struct Actor {
    pub id: UserId,
    pub transport_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: String,
    pub locale: String,
    /// Private chat used for notifications; `None` until the user talks to the bot.
    #[serde(default)]
    pub chat_id: Option<ChatId>,
}

impl Actor {
    /// Placeholder actor used for channel posts, which carry no sender.
    pub fn channel(chat_id: ChatId) -> Self {
        Self {
            id: 0,
            transport_id: 0,
            username: None,
            display_name: String::new(),
            locale: DEFAULT_LOCALE.to_string(),
            chat_id: Some(chat_id),
        }
    }

    pub fn at_name(&self) -> String {
        match self.username.as_deref().filter(|name| !name.is_empty()) {
            Some(username) => format!("@{username}"),
            None if !self.display_name.trim().is_empty() => self.display_name.trim().to_string(),
            None => format!("user:{}", self.id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Chat or group context a command was issued in.
pub struct Conversation {
    pub chat_id: ChatId,
    pub kind: ChatKind,
    pub locale: String,
    #[serde(default)]
    pub spammy: bool,
    #[serde(default = "default_coinflips_enabled")]
    pub coinflips_enabled: bool,
    #[serde(default)]
    pub ticket_price: u64,
    #[serde(default)]
    pub renamable_price: u64,
}

fn default_coinflips_enabled() -> bool {
    true
}

impl Conversation {
    /// Settings used when a conversation has no stored record.
    pub fn transient(chat_id: ChatId, kind: ChatKind, locale: &str) -> Self {
        Self {
            chat_id,
            kind,
            locale: locale.to_string(),
            spammy: false,
            coinflips_enabled: true,
            ticket_price: 0,
            renamable_price: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Settings mutation applied through the user directory.
pub enum ConversationChange {
    TicketPrice(u64),
    RenamablePrice(u64),
    ToggleSpammy,
    ToggleCoinflips,
    Language(String),
}
