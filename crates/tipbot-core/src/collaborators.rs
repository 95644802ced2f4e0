//! Narrow contracts for the services the command engine delegates to.
//!
//! Settlement, persistence and message delivery live behind these traits; the
//! engine only assembles fully-validated requests and translates failures.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{
    Actor, ChatId, ChatKind, Conversation, ConversationChange, MessageId, SenderProfile, UserId,
};

#[derive(Debug, Error)]
/// Enumerates supported `CollaboratorError` values.
pub enum CollaboratorError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("{service} unavailable: {message}")]
    Unavailable {
        service: &'static str,
        message: String,
    },
}

impl CollaboratorError {
    pub fn unavailable(service: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            service,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Internal transfer between two ledger accounts.
pub struct TransferRequest {
    pub from: UserId,
    pub to: UserId,
    pub amount_msat: u64,
    pub anonymous: bool,
    pub note: Option<String>,
    pub message_id: MessageId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRequest {
    pub user: UserId,
    /// `None` creates an invoice payable with any amount.
    pub amount_msat: Option<u64>,
    pub description: String,
    pub preimage: Option<String>,
    pub message_id: MessageId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedInvoice {
    pub amount_msat: Option<u64>,
    #[serde(default)]
    pub description: String,
    pub payment_hash: String,
    #[serde(default)]
    pub payee: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub user: UserId,
    pub bolt11: String,
    pub amount_msat: u64,
    pub message_id: MessageId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub balance_msat: i64,
    pub total_sent_msat: i64,
    pub total_received_msat: i64,
    pub total_fees_msat: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub payment_hash: String,
    /// Negative for outgoing payments.
    pub amount_msat: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pending: bool,
    pub time_unix: u64,
}

#[async_trait]
/// Trait contract for the balance ledger and Lightning node client.
pub trait Ledger: Send + Sync {
    async fn balance_msat(&self, user: UserId) -> Result<i64, CollaboratorError>;

    async fn balance_summary(&self, user: UserId) -> Result<BalanceSummary, CollaboratorError>;

    /// Whether `user` can afford `amount_msat` for the named purpose (fees included).
    async fn can_afford(
        &self,
        user: UserId,
        amount_msat: u64,
        purpose: &str,
    ) -> Result<bool, CollaboratorError>;

    /// Atomically debits the sender and credits the receiver.
    async fn transfer(&self, request: TransferRequest) -> Result<(), CollaboratorError>;

    async fn create_invoice(&self, request: InvoiceRequest) -> Result<String, CollaboratorError>;

    async fn decode_invoice(&self, bolt11: &str) -> Result<DecodedInvoice, CollaboratorError>;

    async fn pay_invoice(&self, request: PaymentRequest) -> Result<(), CollaboratorError>;

    async fn list_transactions(
        &self,
        user: UserId,
        limit: usize,
    ) -> Result<Vec<TransactionEntry>, CollaboratorError>;

    async fn transaction(
        &self,
        user: UserId,
        payment_hash: &str,
    ) -> Result<Option<TransactionEntry>, CollaboratorError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ButtonAction {
    Callback(String),
    SwitchInlineQuery(String),
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardButton {
    pub text: String,
    pub action: ButtonAction,
}

impl KeyboardButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }

    pub fn switch_inline(text: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::SwitchInlineQuery(query.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Rendered reply handed to the chat transport.
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
    #[serde(default)]
    pub reply_to: Option<MessageId>,
    #[serde(default)]
    pub keyboard: Vec<Vec<KeyboardButton>>,
    /// Payload the transport renders as a QR picture next to the text.
    #[serde(default)]
    pub qr_payload: Option<String>,
}

impl OutboundMessage {
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn replying_to(mut self, message_id: Option<MessageId>) -> Self {
        self.reply_to = message_id;
        self
    }

    pub fn with_keyboard(mut self, keyboard: Vec<Vec<KeyboardButton>>) -> Self {
        self.keyboard = keyboard;
        self
    }

    pub fn with_qr(mut self, payload: impl Into<String>) -> Self {
        self.qr_payload = Some(payload.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMember {
    /// The bot account itself.
    Bot,
    User(i64),
}

#[async_trait]
/// Trait contract for message delivery on the chat transport.
pub trait ChatTransport: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<MessageId, CollaboratorError>;

    async fn forward(
        &self,
        from_chat: ChatId,
        message_id: MessageId,
        to_chat: ChatId,
    ) -> Result<(), CollaboratorError>;

    async fn delete(&self, chat: ChatId, message_id: MessageId) -> Result<(), CollaboratorError>;

    async fn is_admin(&self, chat: ChatId, member: ChatMember) -> Result<bool, CollaboratorError>;
}

#[async_trait]
/// Trait contract for user and group persistence.
pub trait UserDirectory: Send + Sync {
    /// Loads or creates the account bound to a transport identity.
    async fn ensure_sender(&self, sender: &SenderProfile) -> Result<Actor, CollaboratorError>;

    async fn load_user(&self, user: UserId) -> Result<Option<Actor>, CollaboratorError>;

    /// Resolves a username (without `@`). Implementations may create a
    /// placeholder account that is claimed when the user first talks to the bot.
    async fn find_by_username(&self, username: &str) -> Result<Option<Actor>, CollaboratorError>;

    async fn is_banned(&self, user: UserId) -> Result<bool, CollaboratorError>;

    async fn set_notification_chat(
        &self,
        user: UserId,
        chat: Option<ChatId>,
    ) -> Result<(), CollaboratorError>;

    async fn set_user_language(&self, user: UserId, locale: &str) -> Result<(), CollaboratorError>;

    async fn load_conversation(
        &self,
        chat: ChatId,
    ) -> Result<Option<Conversation>, CollaboratorError>;

    async fn ensure_conversation(
        &self,
        chat: ChatId,
        kind: ChatKind,
        locale: &str,
    ) -> Result<Conversation, CollaboratorError>;

    /// Applies a settings change and returns the updated record.
    async fn update_conversation(
        &self,
        chat: ChatId,
        change: ConversationChange,
    ) -> Result<Conversation, CollaboratorError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub user: Option<UserId>,
    pub name: String,
    #[serde(default)]
    pub properties: Value,
}

impl AnalyticsEvent {
    pub fn new(user: Option<UserId>, name: impl Into<String>, properties: Value) -> Self {
        Self {
            user,
            name: name.into(),
            properties,
        }
    }
}

#[async_trait]
/// Trait contract for product analytics delivery.
pub trait AnalyticsSink: Send + Sync {
    async fn track(&self, event: AnalyticsEvent) -> Result<(), CollaboratorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Third-party apps and wallet bridges reachable through chat commands.
pub enum ExternalApp {
    Microbet,
    Bitflash,
    Satellite,
    Golightning,
    Gifts,
    Paywall,
    Poker,
    Lndhub,
}

impl ExternalApp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Microbet => "microbet",
            Self::Bitflash => "bitflash",
            Self::Satellite => "satellite",
            Self::Golightning => "golightning",
            Self::Gifts => "gifts",
            Self::Paywall => "paywall",
            Self::Poker => "poker",
            Self::Lndhub => "lndhub",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppRequest {
    pub app: ExternalApp,
    pub actor: Actor,
    pub chat_id: ChatId,
    pub message_id: MessageId,
    /// Parsed arguments of the command, keyed the way the usage grammar names them.
    pub arguments: Value,
}

#[async_trait]
/// Trait contract for external app integrations; they own their replies.
pub trait AppGateway: Send + Sync {
    async fn run(&self, request: AppRequest) -> Result<(), CollaboratorError>;
}
