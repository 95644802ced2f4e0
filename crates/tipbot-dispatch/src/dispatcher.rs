//! Turns inbound chat messages into ledger, chat and voucher side effects.
//!
//! Every message walks the same path: resolve who sent it and where, decide
//! whether it is a command at all, parse it, then run exactly one branch. A
//! branch validates everything before its first side effect and answers with
//! one localized message.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tipbot_commands::{
    parse_command_text, render_help, Command, CommandParse, CommandRegistry, InvoiceAmount,
    ToggleTarget, COMMAND_PREFIX,
};
use tipbot_core::{
    Actor, AnalyticsEvent, AppGateway, AppRequest, ChatId, ChatKind, ChatMember, ChatTransport,
    CollaboratorError, Conversation, ConversationChange, DecodedInvoice, EphemeralStore,
    ExternalApp, InboundMessage, InvoiceRequest, KeyboardButton, Ledger, MessageId,
    OutboundMessage, PaymentRequest, SenderProfile, StoreError, TransferRequest, UserDirectory,
    UserId,
};
use tipbot_i18n::{keys, TranslationBundle};
use tipbot_lnurl::{
    InvoiceAuthorization, LnurlError, VoucherConsumer, WithdrawIssuer, WithdrawSettlement,
};

use crate::analytics_queue::AnalyticsQueue;

pub mod amount_parsing;
pub mod game_quota;
pub mod hidden_message;
pub mod inbound_detection;
pub mod receiver_resolution;

use amount_parsing::{parse_participants, parse_price, parse_satoshis};
use game_quota::{GameCheck, GameKind, GameQuota, GameQuotaConfig};
use hidden_message::{
    extract_hidden_content, hidden_message_id, hidden_message_key, normalize_hidden_options,
    HiddenMessage,
};
use inbound_detection::{detect_pasted_payment, PastedPayment};
use receiver_resolution::{explicit_receiver, select_receiver, ReceiverSource};

pub const PAY_PROMPT_KEY_PREFIX: &str = "payconfirm:";
pub const RENAME_PROMPT_KEY_PREFIX: &str = "rename:";

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Bot username, without `@`.
    pub service_id: String,
    pub hidden_message_ttl: Duration,
    /// Lifetime of pending payment and rename confirmations.
    pub prompt_ttl: Duration,
    pub quota: GameQuotaConfig,
    pub transaction_list_limit: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            service_id: "tipbot".to_string(),
            hidden_message_ttl: Duration::from_secs(5 * 24 * 60 * 60),
            prompt_ttl: Duration::from_secs(60 * 60),
            quota: GameQuotaConfig::default(),
            transaction_list_limit: 25,
        }
    }
}

/// Collaborators and settings a [`Dispatcher`] is assembled from.
pub struct DispatcherParts {
    pub ledger: Arc<dyn Ledger>,
    pub chat: Arc<dyn ChatTransport>,
    pub directory: Arc<dyn UserDirectory>,
    pub apps: Arc<dyn AppGateway>,
    pub store: Arc<dyn EphemeralStore>,
    pub analytics: AnalyticsQueue,
    pub consumer: Arc<VoucherConsumer>,
    pub issuer: Arc<WithdrawIssuer>,
    pub registry: Arc<CommandRegistry>,
    pub bundle: Arc<TranslationBundle>,
    pub settings: DispatchSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    MissingSender,
    SenderUnavailable,
    Banned,
    /// Group message whose first entity is not a bot command.
    NotLeadingCommand,
    NotACommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Validation failure that stopped a command before any side effect.
pub enum Rejection {
    InvalidAmount,
    InvalidParticipants,
    NoReceiver,
    UnknownReceiver,
    RateLimited,
    OverQuota,
    InsufficientBalance,
    NotAdmin,
    PrivateOnly,
    GroupOnly,
    CoinflipsDisabled,
    NotRenamable,
    NoHiddenContent,
    HiddenNotFound,
    TransactionNotFound,
    MissingInvoice,
    InvalidLnurl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Ignored(IgnoreReason),
    /// Free text answering a bot prompt; the caller owns prompt state.
    PromptReply { reply_to: MessageId, text: String },
    /// Prefixed text that did not parse, answered with usage help.
    Help,
    Unrecognized { notified: bool },
    Handled { command: &'static str },
    Rejected { command: &'static str, reason: Rejection },
    Failed { command: &'static str, message: String },
}

enum BranchError {
    Rejected(Rejection),
    Failed(String),
}

type BranchResult = Result<(), BranchError>;

#[derive(Debug, Error)]
enum PromptError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode prompt: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Payment waiting for its owner to press confirm.
pub struct PendingPayment {
    pub user: UserId,
    pub bolt11: String,
    pub amount_msat: u64,
    pub message_id: MessageId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRename {
    pub user: UserId,
    pub chat: ChatId,
    pub name: String,
    pub satoshis: u64,
}

struct MessageContext<'a> {
    message: &'a InboundMessage,
    actor: Actor,
    conversation: Conversation,
}

impl MessageContext<'_> {
    fn is_private(&self) -> bool {
        self.message.chat_kind.is_private()
    }

    fn reply_text(&self) -> Option<&str> {
        self.message
            .reply_to
            .as_ref()
            .and_then(|reply| reply.text.as_deref())
    }
}

pub struct Dispatcher {
    ledger: Arc<dyn Ledger>,
    chat: Arc<dyn ChatTransport>,
    directory: Arc<dyn UserDirectory>,
    apps: Arc<dyn AppGateway>,
    store: Arc<dyn EphemeralStore>,
    analytics: AnalyticsQueue,
    consumer: Arc<VoucherConsumer>,
    issuer: Arc<WithdrawIssuer>,
    registry: Arc<CommandRegistry>,
    bundle: Arc<TranslationBundle>,
    quota: GameQuota,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(parts: DispatcherParts) -> Self {
        let quota = GameQuota::new(Arc::clone(&parts.store), parts.settings.quota);
        Self {
            ledger: parts.ledger,
            chat: parts.chat,
            directory: parts.directory,
            apps: parts.apps,
            store: parts.store,
            analytics: parts.analytics,
            consumer: parts.consumer,
            issuer: parts.issuer,
            registry: parts.registry,
            bundle: parts.bundle,
            quota,
            settings: parts.settings,
        }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    #[tracing::instrument(
        name = "tipbot_dispatch.dispatch",
        skip(self, message),
        fields(chat = message.chat_id, message = message.message_id)
    )]
    pub async fn dispatch(&self, message: &InboundMessage) -> DispatchOutcome {
        let (actor, conversation) = match self.resolve_context(message).await {
            Ok(resolved) => resolved,
            Err(reason) => {
                tracing::debug!(?reason, "ignoring message");
                return DispatchOutcome::Ignored(reason);
            }
        };
        let context = MessageContext {
            message,
            actor,
            conversation,
        };

        if !context.is_private() && !message.leading_bot_command {
            return self.prompt_reply_or_ignore(message, IgnoreReason::NotLeadingCommand);
        }

        let text = message.text.trim();
        let command_text = match detect_pasted(context.is_private(), text) {
            Some(pasted) => pasted.command_text(),
            None => text.to_string(),
        };

        match parse_command_text(&self.registry, &command_text) {
            CommandParse::NotACommand => {
                self.prompt_reply_or_ignore(message, IgnoreReason::NotACommand)
            }
            CommandParse::Unparseable { method, .. } => {
                self.handle_unparseable(&context, &method).await
            }
            CommandParse::Parsed(parsed) => self.dispatch_command(&context, parsed.command).await,
        }
    }

    async fn resolve_context(
        &self,
        message: &InboundMessage,
    ) -> Result<(Actor, Conversation), IgnoreReason> {
        let mut actor = match (&message.sender, message.chat_kind) {
            (_, ChatKind::Channel) => Actor::channel(message.chat_id),
            (None, _) => return Err(IgnoreReason::MissingSender),
            (Some(sender), _) => self.resolve_sender(sender).await?,
        };

        if message.chat_kind.is_private() {
            if actor.chat_id != Some(message.chat_id) {
                match self
                    .directory
                    .set_notification_chat(actor.id, Some(message.chat_id))
                    .await
                {
                    Ok(()) => actor.chat_id = Some(message.chat_id),
                    Err(error) => {
                        tracing::warn!(user = actor.id, %error, "failed to record private chat");
                    }
                }
            }
            let conversation =
                Conversation::transient(message.chat_id, message.chat_kind, &actor.locale);
            return Ok((actor, conversation));
        }

        let fallback = || {
            Conversation::transient(
                message.chat_id,
                message.chat_kind,
                self.bundle.default_locale(),
            )
        };
        let conversation = match self.directory.load_conversation(message.chat_id).await {
            Ok(Some(conversation)) => conversation,
            Ok(None) => fallback(),
            Err(error) => {
                tracing::warn!(chat = message.chat_id, %error, "failed to load group settings");
                fallback()
            }
        };
        Ok((actor, conversation))
    }

    async fn resolve_sender(&self, sender: &SenderProfile) -> Result<Actor, IgnoreReason> {
        let actor = self.directory.ensure_sender(sender).await.map_err(|error| {
            tracing::warn!(sender = sender.transport_id, %error, "failed to load sender");
            IgnoreReason::SenderUnavailable
        })?;
        match self.directory.is_banned(actor.id).await {
            Ok(false) => Ok(actor),
            Ok(true) => Err(IgnoreReason::Banned),
            Err(error) => {
                tracing::warn!(user = actor.id, %error, "failed to check ban list");
                Err(IgnoreReason::SenderUnavailable)
            }
        }
    }

    fn prompt_reply_or_ignore(
        &self,
        message: &InboundMessage,
        reason: IgnoreReason,
    ) -> DispatchOutcome {
        match &message.reply_to {
            Some(reply) if self.is_own_message(&reply.sender) => DispatchOutcome::PromptReply {
                reply_to: reply.message_id,
                text: message.text.clone(),
            },
            _ => DispatchOutcome::Ignored(reason),
        }
    }

    fn is_own_message(&self, author: &SenderProfile) -> bool {
        author.is_bot
            && author
                .username
                .as_deref()
                .is_some_and(|username| username.eq_ignore_ascii_case(&self.settings.service_id))
    }

    /// Groups stay quiet so several bots can share a room.
    async fn handle_unparseable(
        &self,
        context: &MessageContext<'_>,
        method: &str,
    ) -> DispatchOutcome {
        if !context.is_private() {
            return DispatchOutcome::Unrecognized { notified: false };
        }
        let locale = context.actor.locale.as_str();
        match render_help(&self.registry, &self.bundle, locale, method) {
            Some(help) => {
                self.deliver(self.in_place(context, help.into_text())).await;
                DispatchOutcome::Help
            }
            None => {
                let text = self
                    .bundle
                    .render_or_key(locale, keys::WRONG_COMMAND, json!({}));
                self.deliver(self.in_place(context, text)).await;
                DispatchOutcome::Unrecognized { notified: true }
            }
        }
    }

    async fn dispatch_command(
        &self,
        context: &MessageContext<'_>,
        command: Command,
    ) -> DispatchOutcome {
        let name = command.name();
        tracing::debug!(command = name, user = context.actor.id, "dispatching command");
        self.track(
            &context.actor,
            "command",
            json!({ "command": name, "chat": context.conversation.kind.as_str() }),
        );

        let result = match command {
            Command::Start { tutorial } => self.handle_start(context, tutorial).await,
            Command::Stop => self.handle_stop(context).await,
            Command::ExternalApp { app, arguments } => {
                self.handle_external_app(context, app, arguments).await
            }
            Command::Send {
                amount,
                receivers,
                anonymous,
            } => self.handle_send(context, &amount, &receivers, anonymous).await,
            Command::Giveaway { amount } => self.handle_giveaway(context, &amount).await,
            Command::Giveflip {
                amount,
                participants,
            } => {
                self.handle_giveflip(context, &amount, participants.as_deref())
                    .await
            }
            Command::Coinflip {
                amount,
                participants,
            } => {
                self.handle_coinflip(context, &amount, participants.as_deref())
                    .await
            }
            Command::Fundraise {
                amount,
                participants,
                receivers,
            } => {
                self.handle_fundraise(context, &amount, &participants, &receivers)
                    .await
            }
            Command::Hide {
                amount,
                message,
                revealers,
                crowdfund,
                public,
                private,
            } => {
                let crowdfund = crowdfund.as_deref().and_then(parse_count);
                let revealers = revealers.as_deref().and_then(parse_count);
                self.handle_hide(context, &amount, &message, public, private, crowdfund, revealers)
                    .await
            }
            Command::Reveal { hidden_id } => self.handle_reveal(context, &hidden_id).await,
            Command::Transactions => self.handle_transactions(context).await,
            Command::Transaction { hash } => self.handle_transaction(context, &hash).await,
            Command::Balance => self.handle_balance(context).await,
            Command::Pay {
                invoice,
                now,
                decode_only,
            } => self.handle_pay(context, invoice, now, decode_only).await,
            Command::IssueVoucher { amount } => {
                self.handle_issue_voucher(context, amount.as_deref()).await
            }
            Command::Receive {
                amount,
                description,
                preimage,
            } => {
                self.handle_receive(context, amount, description, preimage)
                    .await
            }
            Command::RedeemVoucher { lnurl } => self.handle_redeem_voucher(context, &lnurl).await,
            Command::Rename { name } => self.handle_rename(context, name).await,
            Command::Apps => {
                self.tell_actor(context, keys::TUTORIAL, json!({ "Name": "apps" }))
                    .await;
                Ok(())
            }
            Command::Help { topic } => self.handle_help(context, &topic).await,
            Command::Toggle(target) => self.handle_toggle(context, target).await,
        };

        match result {
            Ok(()) => DispatchOutcome::Handled { command: name },
            Err(BranchError::Rejected(reason)) => {
                tracing::debug!(command = name, ?reason, "command rejected");
                DispatchOutcome::Rejected {
                    command: name,
                    reason,
                }
            }
            Err(BranchError::Failed(message)) => DispatchOutcome::Failed {
                command: name,
                message,
            },
        }
    }

    async fn handle_start(
        &self,
        context: &MessageContext<'_>,
        tutorial: Option<String>,
    ) -> BranchResult {
        if !context.is_private() {
            return Err(BranchError::Rejected(Rejection::PrivateOnly));
        }
        match tutorial {
            Some(name) => {
                self.tell_actor(context, keys::TUTORIAL, json!({ "Name": name }))
                    .await
            }
            None => self.tell_actor(context, keys::WELCOME, json!({})).await,
        };
        self.track(&context.actor, "start", json!({}));
        Ok(())
    }

    async fn handle_stop(&self, context: &MessageContext<'_>) -> BranchResult {
        if !context.is_private() {
            return Err(BranchError::Rejected(Rejection::PrivateOnly));
        }
        if let Err(error) = self
            .directory
            .set_notification_chat(context.actor.id, None)
            .await
        {
            return Err(self.fail(context, error).await);
        }
        self.tell_actor(context, keys::STOP_NOTIFY, json!({})).await;
        Ok(())
    }

    async fn handle_external_app(
        &self,
        context: &MessageContext<'_>,
        app: ExternalApp,
        arguments: Value,
    ) -> BranchResult {
        let request = AppRequest {
            app,
            actor: context.actor.clone(),
            chat_id: context.message.chat_id,
            message_id: context.message.message_id,
            arguments,
        };
        match self.apps.run(request).await {
            Ok(()) => Ok(()),
            Err(error) => Err(self.fail(context, error).await),
        }
    }

    async fn handle_send(
        &self,
        context: &MessageContext<'_>,
        raw_amount: &str,
        receivers: &[String],
        anonymous: bool,
    ) -> BranchResult {
        let sats = self.parse_amount(context, raw_amount).await?;
        let message = context.message;
        let source = select_receiver(receivers, &message.text_mentions, message.reply_to.as_ref());
        let receiver = match &source {
            ReceiverSource::Missing => {
                return Err(self
                    .reject(
                        context,
                        keys::CANT_SEND_NO_RECEIVER,
                        json!({ "Sats": sats }),
                        Rejection::NoReceiver,
                    )
                    .await);
            }
            ReceiverSource::Username(username) => {
                self.find_receiver_by_username(context, username).await?
            }
            ReceiverSource::Mention(profile) | ReceiverSource::ReplyAuthor { sender: profile, .. } => {
                match self.directory.ensure_sender(profile).await {
                    Ok(receiver) => receiver,
                    Err(error) => {
                        tracing::warn!(receiver = %source.display_name(), %error, "failed to load receiver");
                        return Err(self
                            .fail_with(context, keys::SAVE_RECEIVER_FAIL, json!({}), error)
                            .await);
                    }
                }
            }
        };

        let note = source.note().map(str::to_string);
        let transfer = TransferRequest {
            from: context.actor.id,
            to: receiver.id,
            amount_msat: sats * 1000,
            anonymous,
            note: note.clone(),
            message_id: message.message_id,
        };
        if let Err(error) = self.ledger.transfer(transfer).await {
            let err = error.to_string();
            return Err(self
                .fail_with(context, keys::FAILED_SEND, json!({ "Err": err }), error)
                .await);
        }

        let sats_text = sats.to_string();
        let raw_text = raw_amount.trim();
        if let Some(receiver_chat) = receiver.chat_id {
            let text = if anonymous {
                self.bundle.render_or_key(
                    &receiver.locale,
                    keys::RECEIVED_SATS_ANON,
                    json!({ "Sats": sats_text }),
                )
            } else {
                self.bundle.render_or_key(
                    &receiver.locale,
                    keys::USER_SENT_YOU_SATS,
                    json!({
                        "User": context.actor.at_name(),
                        "Sats": sats_text,
                        "RawSats": raw_text,
                        "Note": note.clone().unwrap_or_default(),
                    }),
                )
            };
            self.deliver(OutboundMessage::text(receiver_chat, text))
                .await;
        }

        // Receivers without a bot chat only learn about it in the group.
        let confirmation = self.actor_message(
            context,
            keys::USER_SENT_TO_USER,
            json!({ "Sats": sats_text, "User": receiver.at_name(), "RawSats": raw_text }),
            receiver.chat_id.is_none(),
        );
        self.deliver(confirmation).await;
        self.track(
            &context.actor,
            "send",
            json!({
                "sats": sats,
                "anonymous": anonymous,
                "reply": matches!(source, ReceiverSource::ReplyAuthor { .. }),
            }),
        );
        Ok(())
    }

    async fn find_receiver_by_username(
        &self,
        context: &MessageContext<'_>,
        username: &str,
    ) -> Result<Actor, BranchError> {
        match self.directory.find_by_username(username).await {
            Ok(Some(receiver)) => Ok(receiver),
            Ok(None) => Err(self
                .reject(
                    context,
                    keys::FAILED_USER,
                    json!({}),
                    Rejection::UnknownReceiver,
                )
                .await),
            Err(error) => Err(self.fail(context, error).await),
        }
    }

    async fn handle_giveaway(&self, context: &MessageContext<'_>, raw_amount: &str) -> BranchResult {
        let sats = self.parse_amount(context, raw_amount).await?;
        self.check_game(context, GameKind::Giveaway).await?;
        self.ensure_affordable(context, sats, "giveaway").await?;

        let text = self.group_text(
            context,
            keys::GIVEAWAY_MSG,
            json!({ "User": context.actor.at_name(), "Sats": sats }),
        );
        let button = self.group_text(context, keys::GIVEAWAY_BUTTON, json!({}));
        let data = format!("giveaway={}-{sats}", context.actor.id);
        self.post_game(context, GameKind::Giveaway, text, button, data, sats)
            .await
    }

    async fn handle_giveflip(
        &self,
        context: &MessageContext<'_>,
        raw_amount: &str,
        raw_participants: Option<&str>,
    ) -> BranchResult {
        let sats = self.parse_amount(context, raw_amount).await?;
        let participants = self.parse_participant_count(context, raw_participants).await?;
        self.check_game(context, GameKind::Giveflip).await?;
        self.ensure_affordable(context, sats, "giveflip").await?;

        let text = self.group_text(
            context,
            keys::GIVEFLIP_MSG,
            json!({
                "User": context.actor.at_name(),
                "Sats": sats,
                "Participants": participants,
            }),
        );
        let button = self.group_text(context, keys::GIVEFLIP_BUTTON, json!({}));
        let data = format!("giveflip={}-{participants}-{sats}", context.actor.id);
        self.post_game(context, GameKind::Giveflip, text, button, data, sats)
            .await
    }

    async fn handle_coinflip(
        &self,
        context: &MessageContext<'_>,
        raw_amount: &str,
        raw_participants: Option<&str>,
    ) -> BranchResult {
        if !context.conversation.coinflips_enabled {
            self.move_to_private(context).await;
            let text = self.bundle.render_or_key(
                &context.actor.locale,
                keys::COINFLIPS_ENABLED_MSG,
                json!({ "Enabled": false }),
            );
            let chat = context.actor.chat_id.unwrap_or(context.message.chat_id);
            self.deliver(OutboundMessage::text(chat, text)).await;
            return Err(BranchError::Rejected(Rejection::CoinflipsDisabled));
        }

        let sats = self.parse_amount(context, raw_amount).await?;
        let participants = self.parse_participant_count(context, raw_participants).await?;
        self.check_game(context, GameKind::Coinflip).await?;
        self.ensure_affordable(context, sats, "coinflip").await?;

        let text = self.group_text(
            context,
            keys::LOTTERY_MSG,
            json!({
                "EntrySats": sats,
                "Participants": participants,
                "Prize": sats * u64::from(participants),
                "Registered": context.actor.at_name(),
            }),
        );
        let button = self.group_text(context, keys::LOTTERY_BUTTON, json!({}));
        let data = format!("lottery={}-{participants}-{sats}", context.actor.id);
        self.post_game(context, GameKind::Coinflip, text, button, data, sats)
            .await
    }

    /// Forwards the command to the sender's private chat and removes it from the group.
    async fn move_to_private(&self, context: &MessageContext<'_>) {
        let message = context.message;
        if let Some(private_chat) = context.actor.chat_id {
            if let Err(error) = self
                .chat
                .forward(message.chat_id, message.message_id, private_chat)
                .await
            {
                tracing::warn!(chat = message.chat_id, %error, "failed to forward command");
            }
        }
        if let Err(error) = self.chat.delete(message.chat_id, message.message_id).await {
            tracing::warn!(chat = message.chat_id, %error, "failed to delete command");
        }
    }

    async fn post_game(
        &self,
        context: &MessageContext<'_>,
        kind: GameKind,
        text: String,
        button: String,
        data: String,
        sats: u64,
    ) -> BranchResult {
        let outbound = self
            .in_place(context, text)
            .with_keyboard(vec![vec![KeyboardButton::callback(button, data)]]);
        if let Err(error) = self.chat.send(outbound).await {
            return Err(self.fail(context, error).await);
        }
        if let Err(error) = self.quota.record_creation(kind, context.actor.id) {
            tracing::warn!(user = context.actor.id, %error, "failed to record game creation");
        }
        self.track(
            &context.actor,
            &format!("{} created", kind.as_str()),
            json!({ "sats": sats }),
        );
        Ok(())
    }

    async fn handle_fundraise(
        &self,
        context: &MessageContext<'_>,
        raw_amount: &str,
        raw_participants: &str,
        receivers: &[String],
    ) -> BranchResult {
        let sats = self.parse_amount(context, raw_amount).await?;
        let participants = self
            .parse_participant_count(context, Some(raw_participants))
            .await?;
        self.ensure_affordable(context, sats, "fundraise").await?;

        let receiver = match explicit_receiver(receivers, &context.message.text_mentions) {
            ReceiverSource::Username(username) => {
                self.find_receiver_by_username(context, &username).await?
            }
            ReceiverSource::Mention(profile) => match self.directory.ensure_sender(&profile).await {
                Ok(receiver) => receiver,
                Err(error) => {
                    return Err(self
                        .fail_with(context, keys::SAVE_RECEIVER_FAIL, json!({}), error)
                        .await);
                }
            },
            _ => {
                return Err(self
                    .reject(context, keys::FAILED_USER, json!({}), Rejection::NoReceiver)
                    .await);
            }
        };

        let text = self.group_text(
            context,
            keys::FUNDRAISE_AD,
            json!({
                "Fund": sats * u64::from(participants),
                "ToUser": receiver.at_name(),
                "Participants": participants,
                "Sats": sats,
                "Registered": context.actor.at_name(),
            }),
        );
        let button = self.group_text(context, keys::FUNDRAISE_BUTTON, json!({}));
        let outbound = self.in_place(context, text).with_keyboard(vec![vec![
            KeyboardButton::callback(button, format!("fundraise={}-{participants}-{sats}", receiver.id)),
        ]]);
        if let Err(error) = self.chat.send(outbound).await {
            return Err(self.fail(context, error).await);
        }
        self.track(&context.actor, "fundraise created", json!({ "sats": sats }));
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn handle_hide(
        &self,
        context: &MessageContext<'_>,
        raw_amount: &str,
        words: &[String],
        public: bool,
        private: bool,
        crowdfund: Option<i64>,
        revealers: Option<i64>,
    ) -> BranchResult {
        let sats = self.parse_amount(context, raw_amount).await?;
        let Some((preview, content)) = extract_hidden_content(context.reply_text(), words) else {
            return Err(self
                .reject(
                    context,
                    keys::HIDDEN_NO_CONTENT,
                    json!({}),
                    Rejection::NoHiddenContent,
                )
                .await);
        };
        let visibility = normalize_hidden_options(public, private, crowdfund, revealers);
        let hidden_id = hidden_message_id(
            context.actor.id,
            context.message.chat_id,
            context.message.message_id,
        );
        let hidden = HiddenMessage {
            owner: context.actor.id,
            preview,
            content,
            satoshis: sats,
            public: visibility.public,
            crowdfund: visibility.crowdfund,
            revealers: visibility.revealers,
        };
        if let Err(error) = self.store_json(
            &hidden_message_key(&hidden_id),
            &hidden,
            self.settings.hidden_message_ttl,
        ) {
            return Err(self.fail(context, error).await);
        }

        let share = self.bundle.render_or_key(
            &context.actor.locale,
            keys::HIDDEN_SHARE_BUTTON,
            json!({}),
        );
        let reply = self
            .actor_message(
                context,
                keys::HIDDEN_WITH_ID,
                json!({
                    "HiddenId": hidden_id,
                    "Public": visibility.public,
                    "Crowdfund": visibility.crowdfund,
                    "Times": visibility.revealers,
                    "Satoshis": sats,
                }),
                false,
            )
            .with_keyboard(vec![vec![KeyboardButton::switch_inline(
                share,
                format!("reveal {hidden_id}"),
            )]]);
        self.deliver(reply).await;
        self.track(&context.actor, "hide", json!({ "sats": sats }));
        Ok(())
    }

    async fn handle_reveal(&self, context: &MessageContext<'_>, hidden_id: &str) -> BranchResult {
        let stored = match self.store.get(&hidden_message_key(hidden_id)) {
            Ok(stored) => stored,
            Err(error) => return Err(self.fail(context, error).await),
        };
        let hidden = stored
            .as_deref()
            .map(serde_json::from_str::<HiddenMessage>)
            .transpose();
        let hidden = match hidden {
            Ok(Some(hidden)) => hidden,
            Ok(None) => {
                return Err(self
                    .reject(
                        context,
                        keys::HIDDEN_MSG_NOT_FOUND,
                        json!({}),
                        Rejection::HiddenNotFound,
                    )
                    .await);
            }
            Err(error) => return Err(self.fail(context, error).await),
        };

        let button = self.group_text(
            context,
            keys::HIDDEN_REVEAL_BUTTON,
            json!({ "Sats": hidden.satoshis }),
        );
        let text = if hidden.preview.is_empty() {
            button.clone()
        } else {
            hidden.preview
        };
        let outbound = self.in_place(context, text).with_keyboard(vec![vec![
            KeyboardButton::callback(button, format!("reveal={}", hidden_id.trim().to_lowercase())),
        ]]);
        self.deliver(outbound).await;
        Ok(())
    }

    async fn handle_transactions(&self, context: &MessageContext<'_>) -> BranchResult {
        let entries = match self
            .ledger
            .list_transactions(context.actor.id, self.settings.transaction_list_limit)
            .await
        {
            Ok(entries) => entries,
            Err(error) => return Err(self.fail(context, error).await),
        };
        let rows = entries
            .iter()
            .map(|entry| {
                json!({
                    "sign": if entry.amount_msat < 0 { "-" } else { "+" },
                    "sats": entry.amount_msat.unsigned_abs() / 1000,
                    "pending": entry.pending,
                    "description": entry.description,
                    "hash": short_hash(&entry.payment_hash),
                })
            })
            .collect::<Vec<_>>();
        self.tell_actor(context, keys::TRANSACTIONS_LIST, json!({ "Transactions": rows }))
            .await;
        Ok(())
    }

    async fn handle_transaction(&self, context: &MessageContext<'_>, hash: &str) -> BranchResult {
        match self.ledger.transaction(context.actor.id, hash.trim()).await {
            Ok(Some(entry)) => {
                self.tell_actor(
                    context,
                    keys::TRANSACTION_DETAIL,
                    json!({
                        "Hash": entry.payment_hash,
                        "Sats": entry.amount_msat / 1000,
                        "Description": entry.description,
                        "Pending": entry.pending,
                    }),
                )
                .await;
                Ok(())
            }
            Ok(None) => Err(self
                .reject(
                    context,
                    keys::TRANSACTION_NOT_FOUND,
                    json!({ "Hash": hash.trim() }),
                    Rejection::TransactionNotFound,
                )
                .await),
            Err(error) => Err(self.fail(context, error).await),
        }
    }

    async fn handle_balance(&self, context: &MessageContext<'_>) -> BranchResult {
        let summary = match self.ledger.balance_summary(context.actor.id).await {
            Ok(summary) => summary,
            Err(error) => return Err(self.fail(context, error).await),
        };
        self.tell_actor(
            context,
            keys::BALANCE_MSG,
            json!({
                "Sats": summary.balance_msat / 1000,
                "Received": summary.total_received_msat / 1000,
                "Sent": summary.total_sent_msat / 1000,
                "Fees": summary.total_fees_msat / 1000,
            }),
        )
        .await;
        Ok(())
    }

    async fn handle_pay(
        &self,
        context: &MessageContext<'_>,
        invoice: Option<String>,
        now: bool,
        decode_only: bool,
    ) -> BranchResult {
        let bolt11 = invoice.or_else(|| match context.reply_text().and_then(detect_pasted_payment) {
            Some(PastedPayment::Invoice(bolt11)) => Some(bolt11),
            _ => None,
        });
        let Some(bolt11) = bolt11 else {
            return Err(self
                .reject(
                    context,
                    keys::PAY_MISSING_INVOICE,
                    json!({}),
                    Rejection::MissingInvoice,
                )
                .await);
        };
        let decoded = match self.ledger.decode_invoice(&bolt11).await {
            Ok(decoded) => decoded,
            Err(error) => return Err(self.fail(context, error).await),
        };

        if decode_only {
            self.tell_actor(
                context,
                keys::DECODED_INVOICE,
                json!({
                    "Sats": decoded.amount_msat.map(|msat| msat / 1000),
                    "Description": decoded.description,
                    "Payee": decoded.payee,
                    "Hash": decoded.payment_hash,
                }),
            )
            .await;
            return Ok(());
        }

        let Some(amount_msat) = decoded.amount_msat.filter(|msat| *msat > 0) else {
            return Err(self
                .reject(
                    context,
                    keys::INVALID_AMOUNT,
                    json!({ "Amount": "any" }),
                    Rejection::InvalidAmount,
                )
                .await);
        };
        let (chat, reply_to) = self.actor_destination(context, false);
        let payment = PendingPayment {
            user: context.actor.id,
            bolt11,
            amount_msat,
            message_id: context.message.message_id,
        };
        if now {
            self.track(&context.actor, "pay", json!({ "sats": amount_msat / 1000 }));
            return self
                .execute_payment(&context.actor, chat, reply_to, payment)
                .await
                .map_err(|error| BranchError::Failed(error.to_string()));
        }
        if let Err(error) = self
            .prompt_payment(&context.actor, chat, reply_to, payment, &decoded)
            .await
        {
            return Err(self.fail(context, error).await);
        }
        Ok(())
    }

    async fn execute_payment(
        &self,
        actor: &Actor,
        chat: ChatId,
        reply_to: Option<MessageId>,
        payment: PendingPayment,
    ) -> Result<(), CollaboratorError> {
        let sats = payment.amount_msat / 1000;
        let request = PaymentRequest {
            user: payment.user,
            bolt11: payment.bolt11,
            amount_msat: payment.amount_msat,
            message_id: payment.message_id,
        };
        let (key, data, result) = match self.ledger.pay_invoice(request).await {
            Ok(()) => (keys::PAYMENT_SENT, json!({ "Sats": sats }), Ok(())),
            Err(error) => {
                tracing::warn!(user = actor.id, %error, "payment failed");
                (
                    keys::PAYMENT_FAILED,
                    json!({ "Err": error.to_string() }),
                    Err(error),
                )
            }
        };
        let text = self.bundle.render_or_key(&actor.locale, key, data);
        self.deliver(OutboundMessage::text(chat, text).replying_to(reply_to))
            .await;
        result
    }

    async fn prompt_payment(
        &self,
        actor: &Actor,
        chat: ChatId,
        reply_to: Option<MessageId>,
        payment: PendingPayment,
        decoded: &DecodedInvoice,
    ) -> Result<(), PromptError> {
        let sats = payment.amount_msat / 1000;
        let token = self.store_prompt(PAY_PROMPT_KEY_PREFIX, &payment)?;
        let locale = actor.locale.as_str();
        let text = self.bundle.render_or_key(
            locale,
            keys::PAY_CONFIRM,
            json!({
                "Description": decoded.description,
                "Sats": sats,
                "Hash": decoded.payment_hash,
            }),
        );
        let confirm = self
            .bundle
            .render_or_key(locale, keys::PAY_CONFIRM_BUTTON, json!({}));
        let cancel = self
            .bundle
            .render_or_key(locale, keys::CANCEL_BUTTON, json!({}));
        let outbound = OutboundMessage::text(chat, text)
            .replying_to(reply_to)
            .with_keyboard(vec![vec![
                KeyboardButton::callback(confirm, format!("pay={token}")),
                KeyboardButton::callback(cancel, format!("cancel={token}")),
            ]]);
        self.deliver(outbound).await;
        Ok(())
    }

    async fn handle_issue_voucher(
        &self,
        context: &MessageContext<'_>,
        raw_amount: Option<&str>,
    ) -> BranchResult {
        let max_sat = match raw_amount {
            Some(raw) => Some(self.parse_amount(context, raw).await?),
            None => None,
        };
        let voucher =
            match self
                .issuer
                .issue_voucher(&context.actor, context.message.message_id, max_sat)
            {
                Ok(voucher) => voucher,
                Err(error) => {
                    let err = error.to_string();
                    return Err(self
                        .fail_with(context, keys::LNURL_FAIL, json!({ "Err": err }), error)
                        .await);
                }
            };
        let reply = self
            .actor_message(
                context,
                keys::LNURL_VOUCHER,
                json!({ "Lnurl": voucher.lnurl }),
                false,
            )
            .with_qr(voucher.lnurl.clone());
        self.deliver(reply).await;
        self.track(
            &context.actor,
            "lnurl withdraw",
            json!({ "capped": voucher.max_msat.is_some() }),
        );
        Ok(())
    }

    async fn handle_receive(
        &self,
        context: &MessageContext<'_>,
        amount: InvoiceAmount,
        description: String,
        preimage: Option<String>,
    ) -> BranchResult {
        let amount_msat = match amount {
            InvoiceAmount::Any => None,
            InvoiceAmount::Sats(raw) => Some(self.parse_amount(context, &raw).await? * 1000),
        };
        let description = if description.trim().is_empty() {
            context.reply_text().unwrap_or_default().trim().to_string()
        } else {
            description
        };
        let request = InvoiceRequest {
            user: context.actor.id,
            amount_msat,
            description,
            preimage,
            message_id: context.message.message_id,
        };
        let bolt11 = match self.ledger.create_invoice(request).await {
            Ok(bolt11) => bolt11,
            Err(error) => return Err(self.fail(context, error).await),
        };
        let reply = self
            .actor_message(
                context,
                keys::INVOICE_CREATED,
                json!({ "Invoice": bolt11 }),
                false,
            )
            .with_qr(bolt11.clone());
        self.deliver(reply).await;
        self.track(
            &context.actor,
            "invoice created",
            json!({ "sats": amount_msat.map(|msat| msat / 1000) }),
        );
        Ok(())
    }

    /// Success stays silent: the ledger announces the incoming payment.
    async fn handle_redeem_voucher(&self, context: &MessageContext<'_>, lnurl: &str) -> BranchResult {
        match self
            .consumer
            .redeem(&context.actor, lnurl, context.message.message_id)
            .await
        {
            Ok(amount_msat) => {
                self.track(
                    &context.actor,
                    "lnurl redeem",
                    json!({ "sats": amount_msat / 1000 }),
                );
                Ok(())
            }
            Err(LnurlError::InvalidLnurl(reason)) => Err(self
                .reject(
                    context,
                    keys::LNURL_INVALID,
                    json!({ "Err": reason }),
                    Rejection::InvalidLnurl,
                )
                .await),
            Err(error) => {
                let err = error.to_string();
                Err(self
                    .fail_with(context, keys::LNURL_FAIL, json!({ "Err": err }), error)
                    .await)
            }
        }
    }

    async fn handle_rename(&self, context: &MessageContext<'_>, name: String) -> BranchResult {
        if context.is_private() {
            return Err(BranchError::Rejected(Rejection::GroupOnly));
        }
        let price = context.conversation.renamable_price;
        let bot_is_admin = match self
            .chat
            .is_admin(context.message.chat_id, ChatMember::Bot)
            .await
        {
            Ok(admin) => admin,
            Err(error) => {
                tracing::warn!(chat = context.message.chat_id, %error, "failed to check bot rights");
                false
            }
        };
        if price == 0 || !bot_is_admin {
            let text = self.group_text(context, keys::GROUP_NOT_RENAMABLE, json!({}));
            self.deliver(self.in_place(context, text)).await;
            return Err(BranchError::Rejected(Rejection::NotRenamable));
        }

        let rename = PendingRename {
            user: context.actor.id,
            chat: context.message.chat_id,
            name,
            satoshis: price,
        };
        let token = match self.store_prompt(RENAME_PROMPT_KEY_PREFIX, &rename) {
            Ok(token) => token,
            Err(error) => return Err(self.fail(context, error).await),
        };
        let button = self
            .bundle
            .render_or_key(&context.actor.locale, keys::RENAME_BUTTON, json!({}));
        let prompt = self
            .actor_message(
                context,
                keys::RENAME_PROMPT,
                json!({ "Sats": price, "Name": rename.name }),
                false,
            )
            .with_keyboard(vec![vec![KeyboardButton::callback(
                button,
                format!("rename={token}"),
            )]]);
        self.deliver(prompt).await;
        Ok(())
    }

    async fn handle_help(&self, context: &MessageContext<'_>, topic: &str) -> BranchResult {
        let locale = context.actor.locale.as_str();
        match render_help(&self.registry, &self.bundle, locale, topic) {
            Some(help) => {
                let (chat, reply_to) = self.actor_destination(context, false);
                self.deliver(OutboundMessage::text(chat, help.into_text()).replying_to(reply_to))
                    .await;
            }
            None => {
                self.tell_actor(context, keys::WRONG_COMMAND, json!({})).await;
            }
        }
        Ok(())
    }

    async fn handle_toggle(&self, context: &MessageContext<'_>, target: ToggleTarget) -> BranchResult {
        if context.is_private() {
            let ToggleTarget::Language(language) = target else {
                return Err(BranchError::Rejected(Rejection::GroupOnly));
            };
            let locale = match language {
                Some(language) => {
                    let language = language.trim().to_lowercase();
                    if let Err(error) = self
                        .directory
                        .set_user_language(context.actor.id, &language)
                        .await
                    {
                        return Err(self.fail(context, error).await);
                    }
                    language
                }
                None => context.actor.locale.clone(),
            };
            let text = self.bundle.render_or_key(
                &locale,
                keys::LANGUAGE_MSG,
                json!({ "Language": locale }),
            );
            self.deliver(self.in_place(context, text)).await;
            return Ok(());
        }

        if !self.is_group_admin(context).await {
            return Err(BranchError::Rejected(Rejection::NotAdmin));
        }
        let change = match target {
            ToggleTarget::Ticket(raw) => match parse_price(raw.as_deref()) {
                Ok(price) => ConversationChange::TicketPrice(price),
                Err(_) => return Err(self.invalid_amount(context, raw.as_deref()).await),
            },
            ToggleTarget::Renamable(raw) => match parse_price(raw.as_deref()) {
                Ok(price) => ConversationChange::RenamablePrice(price),
                Err(_) => return Err(self.invalid_amount(context, raw.as_deref()).await),
            },
            ToggleTarget::Spammy => ConversationChange::ToggleSpammy,
            ToggleTarget::Coinflips => ConversationChange::ToggleCoinflips,
            ToggleTarget::Language(Some(language)) => {
                ConversationChange::Language(language.trim().to_lowercase())
            }
            ToggleTarget::Language(None) => {
                let locale = context.conversation.locale.as_str();
                let text =
                    self.bundle
                        .render_or_key(locale, keys::LANGUAGE_MSG, json!({ "Language": locale }));
                self.deliver(self.in_place(context, text)).await;
                return Ok(());
            }
        };

        let chat = context.message.chat_id;
        let updated = match self
            .directory
            .ensure_conversation(chat, context.message.chat_kind, &context.conversation.locale)
            .await
        {
            Ok(_) => self.directory.update_conversation(chat, change.clone()).await,
            Err(error) => Err(error),
        };
        let updated = match updated {
            Ok(updated) => updated,
            Err(error) => return Err(self.fail(context, error).await),
        };

        let bot_name = self.settings.service_id.as_str();
        let (key, data) = match change {
            ConversationChange::TicketPrice(0) => (keys::FREE_JOIN, json!({})),
            ConversationChange::TicketPrice(price) => (
                keys::TICKET_MSG,
                json!({ "Sat": price, "BotName": bot_name }),
            ),
            ConversationChange::RenamablePrice(0) => (keys::GROUP_NOT_RENAMABLE, json!({})),
            ConversationChange::RenamablePrice(price) => (
                keys::RENAMABLE_MSG,
                json!({ "Sat": price, "BotName": bot_name }),
            ),
            ConversationChange::ToggleSpammy => {
                (keys::SPAMMY_MSG, json!({ "Spammy": updated.spammy }))
            }
            ConversationChange::ToggleCoinflips => (
                keys::COINFLIPS_ENABLED_MSG,
                json!({ "Enabled": updated.coinflips_enabled }),
            ),
            ConversationChange::Language(_) => {
                (keys::LANGUAGE_MSG, json!({ "Language": updated.locale }))
            }
        };
        let text = self.bundle.render_or_key(&updated.locale, key, data);
        self.deliver(self.in_place(context, text)).await;
        Ok(())
    }

    /// Channel posts come from channel admins by construction.
    async fn is_group_admin(&self, context: &MessageContext<'_>) -> bool {
        if context.message.chat_kind == ChatKind::Channel {
            return true;
        }
        let member = ChatMember::User(context.actor.transport_id);
        match self.chat.is_admin(context.message.chat_id, member).await {
            Ok(admin) => admin,
            Err(error) => {
                tracing::warn!(chat = context.message.chat_id, %error, "failed to check admin rights");
                false
            }
        }
    }

    async fn parse_amount(&self, context: &MessageContext<'_>, raw: &str) -> Result<u64, BranchError> {
        match parse_satoshis(raw) {
            Ok(sats) => Ok(sats),
            Err(error) => {
                tracing::debug!(%error, "invalid amount");
                Err(self.invalid_amount(context, Some(raw)).await)
            }
        }
    }

    async fn invalid_amount(&self, context: &MessageContext<'_>, raw: Option<&str>) -> BranchError {
        self.reject(
            context,
            keys::INVALID_AMOUNT,
            json!({ "Amount": raw.unwrap_or_default().trim() }),
            Rejection::InvalidAmount,
        )
        .await
    }

    async fn parse_participant_count(
        &self,
        context: &MessageContext<'_>,
        raw: Option<&str>,
    ) -> Result<u32, BranchError> {
        match parse_participants(raw) {
            Ok(count) => Ok(count),
            Err(number) => Err(self
                .reject(
                    context,
                    keys::INVALID_PARTICIPANTS,
                    json!({ "Number": number }),
                    Rejection::InvalidParticipants,
                )
                .await),
        }
    }

    async fn check_game(&self, context: &MessageContext<'_>, kind: GameKind) -> BranchResult {
        match self.quota.check_creation(kind, context.actor.id) {
            Ok(GameCheck::Allowed) => Ok(()),
            Ok(GameCheck::RateLimited) => Err(self
                .reject(context, keys::RATE_LIMIT, json!({}), Rejection::RateLimited)
                .await),
            Ok(GameCheck::OverQuota) => Err(self
                .reject(
                    context,
                    keys::OVER_QUOTA,
                    json!({ "App": kind.as_str() }),
                    Rejection::OverQuota,
                )
                .await),
            Err(error) => Err(self.fail(context, error).await),
        }
    }

    async fn ensure_affordable(
        &self,
        context: &MessageContext<'_>,
        sats: u64,
        purpose: &str,
    ) -> BranchResult {
        match self
            .ledger
            .can_afford(context.actor.id, sats * 1000, purpose)
            .await
        {
            Ok(true) => Ok(()),
            Ok(false) => Err(self
                .reject(
                    context,
                    keys::INSUFFICIENT_BALANCE,
                    json!({ "Purpose": purpose, "Sats": sats }),
                    Rejection::InsufficientBalance,
                )
                .await),
            Err(error) => Err(self.fail(context, error).await),
        }
    }

    /// Where replies meant only for the sender go: in place for private chats,
    /// spammy groups and forced replies, otherwise the sender's bot chat.
    fn actor_destination(
        &self,
        context: &MessageContext<'_>,
        force_public: bool,
    ) -> (ChatId, Option<MessageId>) {
        let message = context.message;
        let in_place = context.is_private() || context.conversation.spammy || force_public;
        match context.actor.chat_id {
            Some(chat) if !in_place => (chat, None),
            _ => (message.chat_id, Some(message.message_id)),
        }
    }

    fn actor_message(
        &self,
        context: &MessageContext<'_>,
        key: &str,
        data: Value,
        force_public: bool,
    ) -> OutboundMessage {
        let text = self.bundle.render_or_key(&context.actor.locale, key, data);
        let (chat, reply_to) = self.actor_destination(context, force_public);
        OutboundMessage::text(chat, text).replying_to(reply_to)
    }

    async fn tell_actor(&self, context: &MessageContext<'_>, key: &str, data: Value) -> Option<MessageId> {
        self.deliver(self.actor_message(context, key, data, false))
            .await
    }

    fn group_text(&self, context: &MessageContext<'_>, key: &str, data: Value) -> String {
        self.bundle
            .render_or_key(&context.conversation.locale, key, data)
    }

    fn in_place(&self, context: &MessageContext<'_>, text: String) -> OutboundMessage {
        OutboundMessage::text(context.message.chat_id, text)
            .replying_to(Some(context.message.message_id))
    }

    async fn deliver(&self, message: OutboundMessage) -> Option<MessageId> {
        let chat = message.chat_id;
        match self.chat.send(message).await {
            Ok(message_id) => Some(message_id),
            Err(error) => {
                tracing::warn!(chat, %error, "failed to deliver message");
                None
            }
        }
    }

    async fn reject(
        &self,
        context: &MessageContext<'_>,
        key: &str,
        data: Value,
        reason: Rejection,
    ) -> BranchError {
        self.tell_actor(context, key, data).await;
        BranchError::Rejected(reason)
    }

    async fn fail(&self, context: &MessageContext<'_>, error: impl Display) -> BranchError {
        let message = error.to_string();
        let data = json!({ "Err": &message });
        self.fail_with(context, keys::ERROR, data, message).await
    }

    async fn fail_with(
        &self,
        context: &MessageContext<'_>,
        key: &str,
        data: Value,
        error: impl Display,
    ) -> BranchError {
        let message = error.to_string();
        tracing::warn!(user = context.actor.id, error = %message, "command failed");
        self.tell_actor(context, key, data).await;
        BranchError::Failed(message)
    }

    fn store_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), PromptError> {
        let encoded = serde_json::to_string(value)?;
        self.store.set(key, &encoded, Some(ttl))?;
        Ok(())
    }

    /// Persists a pending confirmation and returns the token its buttons carry.
    fn store_prompt<T: Serialize>(&self, prefix: &str, value: &T) -> Result<String, PromptError> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        self.store_json(&format!("{prefix}{token}"), value, self.settings.prompt_ttl)?;
        Ok(token)
    }

    fn track(&self, actor: &Actor, name: &str, properties: Value) {
        let user = (actor.id != 0).then_some(actor.id);
        self.analytics
            .enqueue(AnalyticsEvent::new(user, name, properties));
    }
}

#[async_trait]
impl WithdrawSettlement for Dispatcher {
    #[tracing::instrument(
        name = "tipbot_dispatch.settle_withdraw",
        skip(self, authorization),
        fields(user = authorization.user.id, unattended = authorization.unattended)
    )]
    async fn settle(&self, authorization: InvoiceAuthorization) -> Result<(), CollaboratorError> {
        let InvoiceAuthorization {
            user,
            bolt11,
            amount_msat,
            message_id,
            unattended,
            invoice,
        } = authorization;
        let Some(chat) = user.chat_id else {
            return Err(CollaboratorError::Rejected(format!(
                "user {} has no chat with the bot",
                user.id
            )));
        };

        let echo_reply = (message_id != 0).then_some(message_id);
        self.deliver(OutboundMessage::text(chat, bolt11.clone()).replying_to(echo_reply))
            .await;

        let payment = PendingPayment {
            user: user.id,
            bolt11,
            amount_msat,
            message_id,
        };
        if unattended {
            return self.execute_payment(&user, chat, None, payment).await;
        }
        self.prompt_payment(&user, chat, None, payment, &invoice)
            .await
            .map_err(|error| CollaboratorError::unavailable("store", error.to_string()))
    }
}

/// Pasted invoices and vouchers only count in private chats.
fn detect_pasted(private: bool, text: &str) -> Option<PastedPayment> {
    if !private || text.starts_with(COMMAND_PREFIX) {
        return None;
    }
    detect_pasted_payment(text)
}

fn parse_count(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

fn short_hash(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}

#[cfg(test)]
mod tests;
