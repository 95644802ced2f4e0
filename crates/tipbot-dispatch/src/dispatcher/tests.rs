use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tipbot_commands::CommandRegistry;
use tipbot_core::{
    AnalyticsSink, BalanceSummary, MemoryStore, ReplyContext, TransactionEntry,
};
use tipbot_i18n::TranslationBundle;
use tipbot_lnurl::WithdrawIssuerConfig;

use super::*;
use crate::analytics_queue::AnalyticsQueueConfig;

const ALICE: i64 = 7;
const BOB: i64 = 8;
const GROUP: ChatId = -100;
const COMMAND_MESSAGE: MessageId = 10;
const INVOICE: &str = "lnbc1500n1pj9x7xzpp5qqqqqqqqqqqqqqqqqqqqqqqqqq";

struct FakeLedger {
    affordable: Mutex<bool>,
    pay_error: Mutex<Option<String>>,
    transfers: Mutex<Vec<TransferRequest>>,
    payments: Mutex<Vec<PaymentRequest>>,
    invoices: Mutex<Vec<InvoiceRequest>>,
}

impl Default for FakeLedger {
    fn default() -> Self {
        Self {
            affordable: Mutex::new(true),
            pay_error: Mutex::new(None),
            transfers: Mutex::new(Vec::new()),
            payments: Mutex::new(Vec::new()),
            invoices: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn balance_msat(&self, _user: UserId) -> Result<i64, CollaboratorError> {
        Ok(1_000_000)
    }

    async fn balance_summary(&self, _user: UserId) -> Result<BalanceSummary, CollaboratorError> {
        Ok(BalanceSummary {
            balance_msat: 1_234_000,
            total_sent_msat: 500_000,
            total_received_msat: 2_000_000,
            total_fees_msat: 3_000,
        })
    }

    async fn can_afford(
        &self,
        _user: UserId,
        _amount_msat: u64,
        _purpose: &str,
    ) -> Result<bool, CollaboratorError> {
        Ok(*self.affordable.lock().expect("affordable lock"))
    }

    async fn transfer(&self, request: TransferRequest) -> Result<(), CollaboratorError> {
        self.transfers.lock().expect("transfers lock").push(request);
        Ok(())
    }

    async fn create_invoice(&self, request: InvoiceRequest) -> Result<String, CollaboratorError> {
        self.invoices.lock().expect("invoices lock").push(request);
        Ok("lnbc1fresh".to_string())
    }

    async fn decode_invoice(&self, bolt11: &str) -> Result<DecodedInvoice, CollaboratorError> {
        if !bolt11.starts_with("lnbc") {
            return Err(CollaboratorError::Rejected("not an invoice".to_string()));
        }
        Ok(DecodedInvoice {
            amount_msat: Some(150_000),
            description: "coffee".to_string(),
            payment_hash: "ab".repeat(32),
            payee: "02node".to_string(),
        })
    }

    async fn pay_invoice(&self, request: PaymentRequest) -> Result<(), CollaboratorError> {
        if let Some(reason) = self.pay_error.lock().expect("pay error lock").clone() {
            return Err(CollaboratorError::Rejected(reason));
        }
        self.payments.lock().expect("payments lock").push(request);
        Ok(())
    }

    async fn list_transactions(
        &self,
        _user: UserId,
        _limit: usize,
    ) -> Result<Vec<TransactionEntry>, CollaboratorError> {
        Ok(vec![TransactionEntry {
            payment_hash: "cd".repeat(32),
            amount_msat: -21_000,
            description: "tip".to_string(),
            pending: false,
            time_unix: 1_700_000_000,
        }])
    }

    async fn transaction(
        &self,
        _user: UserId,
        _payment_hash: &str,
    ) -> Result<Option<TransactionEntry>, CollaboratorError> {
        Ok(None)
    }
}

#[derive(Default)]
struct FakeChat {
    sent: Mutex<Vec<OutboundMessage>>,
    forwarded: Mutex<Vec<(ChatId, MessageId, ChatId)>>,
    deleted: Mutex<Vec<(ChatId, MessageId)>>,
    admins: Mutex<HashSet<i64>>,
    bot_admin: Mutex<bool>,
}

impl FakeChat {
    fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().expect("sent lock").clone()
    }

    fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|message| message.text).collect()
    }
}

#[async_trait]
impl ChatTransport for FakeChat {
    async fn send(&self, message: OutboundMessage) -> Result<MessageId, CollaboratorError> {
        let mut sent = self.sent.lock().expect("sent lock");
        sent.push(message);
        Ok(1_000 + sent.len() as MessageId)
    }

    async fn forward(
        &self,
        from_chat: ChatId,
        message_id: MessageId,
        to_chat: ChatId,
    ) -> Result<(), CollaboratorError> {
        self.forwarded
            .lock()
            .expect("forwarded lock")
            .push((from_chat, message_id, to_chat));
        Ok(())
    }

    async fn delete(&self, chat: ChatId, message_id: MessageId) -> Result<(), CollaboratorError> {
        self.deleted
            .lock()
            .expect("deleted lock")
            .push((chat, message_id));
        Ok(())
    }

    async fn is_admin(&self, _chat: ChatId, member: ChatMember) -> Result<bool, CollaboratorError> {
        Ok(match member {
            ChatMember::Bot => *self.bot_admin.lock().expect("bot admin lock"),
            ChatMember::User(id) => self.admins.lock().expect("admins lock").contains(&id),
        })
    }
}

#[derive(Default)]
struct FakeDirectory {
    users: Mutex<HashMap<i64, Actor>>,
    banned: Mutex<HashSet<UserId>>,
    conversations: Mutex<HashMap<ChatId, Conversation>>,
    updates: Mutex<Vec<ConversationChange>>,
    languages: Mutex<Vec<(UserId, String)>>,
}

impl FakeDirectory {
    fn seed_user(&self, transport_id: i64, username: &str, chat_id: Option<ChatId>) {
        self.users.lock().expect("users lock").insert(
            transport_id,
            Actor {
                id: transport_id,
                transport_id,
                username: Some(username.to_string()),
                display_name: username.to_string(),
                locale: "en".to_string(),
                chat_id,
            },
        );
    }

    fn seed_group(&self, edit: impl FnOnce(&mut Conversation)) {
        let mut conversation = Conversation::transient(GROUP, ChatKind::Group, "en");
        edit(&mut conversation);
        self.conversations
            .lock()
            .expect("conversations lock")
            .insert(GROUP, conversation);
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn ensure_sender(&self, sender: &SenderProfile) -> Result<Actor, CollaboratorError> {
        let mut users = self.users.lock().expect("users lock");
        let actor = users.entry(sender.transport_id).or_insert_with(|| Actor {
            id: sender.transport_id,
            transport_id: sender.transport_id,
            username: sender.username.clone(),
            display_name: sender.display_name(),
            locale: "en".to_string(),
            chat_id: None,
        });
        Ok(actor.clone())
    }

    async fn load_user(&self, user: UserId) -> Result<Option<Actor>, CollaboratorError> {
        Ok(self.users.lock().expect("users lock").get(&user).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Actor>, CollaboratorError> {
        Ok(self
            .users
            .lock()
            .expect("users lock")
            .values()
            .find(|actor| {
                actor
                    .username
                    .as_deref()
                    .is_some_and(|known| known.eq_ignore_ascii_case(username))
            })
            .cloned())
    }

    async fn is_banned(&self, user: UserId) -> Result<bool, CollaboratorError> {
        Ok(self.banned.lock().expect("banned lock").contains(&user))
    }

    async fn set_notification_chat(
        &self,
        user: UserId,
        chat: Option<ChatId>,
    ) -> Result<(), CollaboratorError> {
        if let Some(actor) = self.users.lock().expect("users lock").get_mut(&user) {
            actor.chat_id = chat;
        }
        Ok(())
    }

    async fn set_user_language(&self, user: UserId, locale: &str) -> Result<(), CollaboratorError> {
        self.languages
            .lock()
            .expect("languages lock")
            .push((user, locale.to_string()));
        Ok(())
    }

    async fn load_conversation(
        &self,
        chat: ChatId,
    ) -> Result<Option<Conversation>, CollaboratorError> {
        Ok(self
            .conversations
            .lock()
            .expect("conversations lock")
            .get(&chat)
            .cloned())
    }

    async fn ensure_conversation(
        &self,
        chat: ChatId,
        kind: ChatKind,
        locale: &str,
    ) -> Result<Conversation, CollaboratorError> {
        Ok(self
            .conversations
            .lock()
            .expect("conversations lock")
            .entry(chat)
            .or_insert_with(|| Conversation::transient(chat, kind, locale))
            .clone())
    }

    async fn update_conversation(
        &self,
        chat: ChatId,
        change: ConversationChange,
    ) -> Result<Conversation, CollaboratorError> {
        self.updates
            .lock()
            .expect("updates lock")
            .push(change.clone());
        let mut conversations = self.conversations.lock().expect("conversations lock");
        let conversation = conversations
            .get_mut(&chat)
            .ok_or_else(|| CollaboratorError::NotFound(format!("chat {chat}")))?;
        match change {
            ConversationChange::TicketPrice(price) => conversation.ticket_price = price,
            ConversationChange::RenamablePrice(price) => conversation.renamable_price = price,
            ConversationChange::ToggleSpammy => conversation.spammy = !conversation.spammy,
            ConversationChange::ToggleCoinflips => {
                conversation.coinflips_enabled = !conversation.coinflips_enabled
            }
            ConversationChange::Language(locale) => conversation.locale = locale,
        }
        Ok(conversation.clone())
    }
}

#[derive(Default)]
struct RecordingApps {
    requests: Mutex<Vec<AppRequest>>,
}

#[async_trait]
impl AppGateway for RecordingApps {
    async fn run(&self, request: AppRequest) -> Result<(), CollaboratorError> {
        self.requests.lock().expect("requests lock").push(request);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<String>>,
}

#[async_trait]
impl AnalyticsSink for RecordingSink {
    async fn track(&self, event: AnalyticsEvent) -> Result<(), CollaboratorError> {
        self.events.lock().expect("events lock").push(event.name);
        Ok(())
    }
}

struct Harness {
    dispatcher: Dispatcher,
    ledger: Arc<FakeLedger>,
    chat: Arc<FakeChat>,
    directory: Arc<FakeDirectory>,
    apps: Arc<RecordingApps>,
    sink: Arc<RecordingSink>,
    store: Arc<MemoryStore>,
}

fn harness() -> Harness {
    let ledger = Arc::new(FakeLedger::default());
    let chat = Arc::new(FakeChat::default());
    let directory = Arc::new(FakeDirectory::default());
    let apps = Arc::new(RecordingApps::default());
    let sink = Arc::new(RecordingSink::default());
    let store = Arc::new(MemoryStore::new());

    let issuer = WithdrawIssuer::new(
        WithdrawIssuerConfig::default(),
        store.clone(),
        ledger.clone(),
        directory.clone(),
    );
    let consumer = VoucherConsumer::new(ledger.clone(), 1_000).expect("consumer");
    let dispatcher = Dispatcher::new(DispatcherParts {
        ledger: ledger.clone(),
        chat: chat.clone(),
        directory: directory.clone(),
        apps: apps.clone(),
        store: store.clone(),
        analytics: AnalyticsQueue::spawn(sink.clone(), AnalyticsQueueConfig::default()),
        consumer: Arc::new(consumer),
        issuer: Arc::new(issuer),
        registry: Arc::new(CommandRegistry::with_defaults("tipbot").expect("registry")),
        bundle: Arc::new(TranslationBundle::builtin("en").expect("bundle")),
        settings: DispatchSettings::default(),
    });
    Harness {
        dispatcher,
        ledger,
        chat,
        directory,
        apps,
        sink,
        store,
    }
}

fn profile(transport_id: i64, username: &str) -> SenderProfile {
    SenderProfile {
        transport_id,
        username: Some(username.to_string()),
        first_name: username.to_string(),
        ..SenderProfile::default()
    }
}

fn bot_profile() -> SenderProfile {
    SenderProfile {
        is_bot: true,
        ..profile(1, "tipbot")
    }
}

fn private_message(text: &str) -> InboundMessage {
    InboundMessage {
        message_id: COMMAND_MESSAGE,
        chat_id: ALICE,
        chat_kind: ChatKind::Private,
        sender: Some(profile(ALICE, "alice")),
        text: text.to_string(),
        leading_bot_command: text.starts_with('/'),
        reply_to: None,
        text_mentions: Vec::new(),
    }
}

fn group_message(text: &str) -> InboundMessage {
    InboundMessage {
        chat_id: GROUP,
        chat_kind: ChatKind::Group,
        ..private_message(text)
    }
}

fn replying_to(mut message: InboundMessage, author: SenderProfile, text: &str) -> InboundMessage {
    message.reply_to = Some(ReplyContext {
        message_id: 55,
        sender: author,
        text: Some(text.to_string()),
    });
    message
}

fn callback_data(message: &OutboundMessage) -> Vec<String> {
    message
        .keyboard
        .iter()
        .flatten()
        .filter_map(|button| match &button.action {
            tipbot_core::ButtonAction::Callback(data) => Some(data.clone()),
            _ => None,
        })
        .collect()
}

fn rejected(command: &'static str, reason: Rejection) -> DispatchOutcome {
    DispatchOutcome::Rejected { command, reason }
}

#[tokio::test]
async fn functional_send_to_username_transfers_and_notifies_both_sides() {
    let harness = harness();
    harness.directory.seed_user(BOB, "bob", Some(BOB));

    let outcome = harness
        .dispatcher
        .dispatch(&private_message("/send 500 @bob"))
        .await;

    assert_eq!(outcome, DispatchOutcome::Handled { command: "send" });
    assert_eq!(
        *harness.ledger.transfers.lock().expect("transfers lock"),
        vec![TransferRequest {
            from: ALICE,
            to: BOB,
            amount_msat: 500_000,
            anonymous: false,
            note: None,
            message_id: COMMAND_MESSAGE,
        }]
    );
    let sent = harness.chat.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].chat_id, BOB);
    assert_eq!(sent[0].text, "@alice has sent you 500 sat.");
    assert_eq!(sent[1].chat_id, ALICE);
    assert_eq!(sent[1].text, "500 sat sent to @bob.");
}

#[tokio::test]
async fn functional_anonymous_send_hides_the_sender() {
    let harness = harness();
    harness.directory.seed_user(BOB, "bob", Some(BOB));

    harness
        .dispatcher
        .dispatch(&private_message("/sendanonymously 2k @bob"))
        .await;

    let transfers = harness.ledger.transfers.lock().expect("transfers lock").clone();
    assert_eq!(transfers.len(), 1);
    assert!(transfers[0].anonymous);
    assert_eq!(transfers[0].amount_msat, 2_000_000);
    let texts = harness.chat.texts();
    assert_eq!(texts[0], "Someone has sent you 2000 sat.");
    assert_eq!(texts[1], "2000 sat sent to @bob (2k).");
}

#[tokio::test]
async fn functional_reply_tip_uses_reply_author_and_leftover_words_as_note() {
    let harness = harness();
    harness.directory.seed_user(ALICE, "alice", Some(ALICE));
    let message = replying_to(
        group_message("/tip 100 thanks for the help"),
        profile(BOB, "bob"),
        "here is how you do it",
    );

    let outcome = harness.dispatcher.dispatch(&message).await;

    assert_eq!(outcome, DispatchOutcome::Handled { command: "send" });
    let transfers = harness.ledger.transfers.lock().expect("transfers lock").clone();
    assert_eq!(transfers[0].to, BOB);
    assert_eq!(transfers[0].note.as_deref(), Some("thanks for the help"));
    // Bob never talked to the bot, so the confirmation stays in the group.
    let sent = harness.chat.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat_id, GROUP);
    assert_eq!(sent[0].reply_to, Some(COMMAND_MESSAGE));
}

#[tokio::test]
async fn functional_send_without_receiver_fails_before_any_transfer() {
    let harness = harness();

    let outcome = harness
        .dispatcher
        .dispatch(&private_message("/send 500"))
        .await;

    assert_eq!(outcome, rejected("send", Rejection::NoReceiver));
    assert!(harness.ledger.transfers.lock().expect("transfers lock").is_empty());
    assert_eq!(
        harness.chat.texts(),
        vec!["Can't send 500 sat: receiver is missing.".to_string()]
    );
}

#[tokio::test]
async fn regression_invalid_amount_short_circuits_before_receiver_lookup() {
    let harness = harness();

    let outcome = harness
        .dispatcher
        .dispatch(&private_message("/send lots @nobody"))
        .await;

    assert_eq!(outcome, rejected("send", Rejection::InvalidAmount));
    assert_eq!(harness.chat.texts(), vec!["Invalid amount: lots".to_string()]);
}

#[tokio::test]
async fn functional_unknown_username_is_reported() {
    let harness = harness();

    let outcome = harness
        .dispatcher
        .dispatch(&private_message("/send 10 @ghost"))
        .await;

    assert_eq!(outcome, rejected("send", Rejection::UnknownReceiver));
    assert_eq!(
        harness.chat.texts(),
        vec!["Failed to parse receiver name.".to_string()]
    );
}

#[tokio::test]
async fn functional_rate_limited_giveflip_sends_nothing_public() {
    let harness = harness();
    harness
        .store
        .set("recentgiveflip:7", "t", None)
        .expect("seed cooldown");

    let outcome = harness
        .dispatcher
        .dispatch(&group_message("/giveflip 100 5"))
        .await;

    assert_eq!(outcome, rejected("giveflip", Rejection::RateLimited));
    let sent = harness.chat.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].keyboard.is_empty());
    assert_eq!(
        sent[0].text,
        "You're rate-limited! Please wait before creating another game."
    );
    assert_eq!(harness.store.get("giveflipquota:7").expect("get"), None);
}

#[tokio::test]
async fn functional_giveflip_posts_game_and_starts_cooldown() {
    let harness = harness();

    let outcome = harness
        .dispatcher
        .dispatch(&group_message("/giveflip 100 5"))
        .await;

    assert_eq!(outcome, DispatchOutcome::Handled { command: "giveflip" });
    let sent = harness.chat.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat_id, GROUP);
    assert_eq!(callback_data(&sent[0]), vec!["giveflip=7-5-100".to_string()]);
    assert!(harness.store.exists("recentgiveflip:7").expect("exists"));
    assert_eq!(
        harness.store.get("giveflipquota:7").expect("get"),
        Some("1".to_string())
    );

    let again = harness
        .dispatcher
        .dispatch(&group_message("/giveflip 100 5"))
        .await;
    assert_eq!(again, rejected("giveflip", Rejection::RateLimited));
}

#[tokio::test]
async fn functional_giveflip_checks_participants_before_quota() {
    let harness = harness();

    let outcome = harness
        .dispatcher
        .dispatch(&group_message("/giveflip 100 1"))
        .await;

    assert_eq!(outcome, rejected("giveflip", Rejection::InvalidParticipants));
    assert_eq!(harness.store.get("giveflipquota:7").expect("get"), None);
}

#[tokio::test]
async fn regression_unaffordable_giveflip_leaves_quota_untouched() {
    let harness = harness();
    *harness.ledger.affordable.lock().expect("affordable lock") = false;

    let outcome = harness
        .dispatcher
        .dispatch(&group_message("/giveflip 100 5"))
        .await;

    assert_eq!(outcome, rejected("giveflip", Rejection::InsufficientBalance));
    assert_eq!(harness.store.get("giveflipquota:7").expect("get"), None);
    assert!(!harness.store.exists("recentgiveflip:7").expect("exists"));
}

#[tokio::test]
async fn functional_exhausted_daily_quota_rejects_new_games() {
    let harness = harness();
    harness
        .store
        .set("giveawayquota:7", "10", None)
        .expect("seed quota");

    let outcome = harness
        .dispatcher
        .dispatch(&group_message("/giveaway 100"))
        .await;

    assert_eq!(outcome, rejected("giveaway", Rejection::OverQuota));
    assert_eq!(
        harness.chat.texts(),
        vec!["You're over your quota for giveaway today.".to_string()]
    );
    assert!(harness.chat.sent().iter().all(|message| message.keyboard.is_empty()));
    assert_eq!(
        harness.store.get("giveawayquota:7").expect("get"),
        Some("10".to_string())
    );
}

#[tokio::test]
async fn functional_fundraise_posts_contribution_button_for_receiver() {
    let harness = harness();
    harness.directory.seed_user(BOB, "bob", Some(BOB));

    let outcome = harness
        .dispatcher
        .dispatch(&group_message("/fundraise 100 3 @bob"))
        .await;

    assert_eq!(outcome, DispatchOutcome::Handled { command: "fundraise" });
    let sent = harness.chat.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat_id, GROUP);
    assert_eq!(sent[0].reply_to, Some(COMMAND_MESSAGE));
    assert_eq!(
        sent[0].text,
        "Fundraising 300 sat for @bob: 3 participants, 100 sat each. Registered: @alice"
    );
    assert_eq!(callback_data(&sent[0]), vec!["fundraise=8-3-100".to_string()]);
    assert!(harness.ledger.transfers.lock().expect("transfers lock").is_empty());
}

#[tokio::test]
async fn regression_fundraise_validates_amount_participants_balance_then_receiver() {
    let cases: &[(&str, bool, Rejection, &str)] = &[
        ("/fundraise lots 1 bob", true, Rejection::InvalidAmount, "Invalid amount: lots"),
        (
            "/fundraise 100 1 bob",
            true,
            Rejection::InvalidParticipants,
            "Number of participants should be between 2 and 100, got 1.",
        ),
        (
            "/fundraise 100 3 bob",
            false,
            Rejection::InsufficientBalance,
            "Insufficient balance for fundraise. Needs 100 sat.",
        ),
        ("/fundraise 100 3 bob", true, Rejection::NoReceiver, "Failed to parse receiver name."),
        (
            "/fundraise 100 3 @ghost",
            true,
            Rejection::UnknownReceiver,
            "Failed to parse receiver name.",
        ),
    ];
    for (text, affordable, reason, reply) in cases {
        let harness = harness();
        *harness.ledger.affordable.lock().expect("affordable lock") = *affordable;

        let outcome = harness.dispatcher.dispatch(&group_message(text)).await;

        assert_eq!(outcome, rejected("fundraise", *reason), "{text}");
        assert_eq!(harness.chat.texts(), vec![reply.to_string()], "{text}");
        assert!(callback_data(&harness.chat.sent()[0]).is_empty(), "{text}");
    }
}

#[tokio::test]
async fn functional_insufficient_balance_blocks_giveaway() {
    let harness = harness();
    *harness.ledger.affordable.lock().expect("affordable lock") = false;

    let outcome = harness
        .dispatcher
        .dispatch(&group_message("/giveaway 1000"))
        .await;

    assert_eq!(outcome, rejected("giveaway", Rejection::InsufficientBalance));
    assert_eq!(
        harness.chat.texts(),
        vec!["Insufficient balance for giveaway. Needs 1000 sat.".to_string()]
    );
}

#[tokio::test]
async fn functional_disabled_coinflips_move_command_to_private_chat() {
    let harness = harness();
    harness.directory.seed_user(ALICE, "alice", Some(ALICE));
    harness
        .directory
        .seed_group(|conversation| conversation.coinflips_enabled = false);

    let outcome = harness
        .dispatcher
        .dispatch(&group_message("/coinflip 10 3"))
        .await;

    assert_eq!(outcome, rejected("coinflip", Rejection::CoinflipsDisabled));
    assert_eq!(
        *harness.chat.forwarded.lock().expect("forwarded lock"),
        vec![(GROUP, COMMAND_MESSAGE, ALICE)]
    );
    assert_eq!(
        *harness.chat.deleted.lock().expect("deleted lock"),
        vec![(GROUP, COMMAND_MESSAGE)]
    );
    let sent = harness.chat.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat_id, ALICE);
    assert_eq!(sent[0].text, "Coinflips are disabled in this group.");
}

#[tokio::test]
async fn functional_coinflip_announces_prize_and_records_cooldown() {
    let harness = harness();

    let outcome = harness
        .dispatcher
        .dispatch(&group_message("/lottery 10 3"))
        .await;

    assert_eq!(outcome, DispatchOutcome::Handled { command: "coinflip" });
    let sent = harness.chat.sent();
    assert!(sent[0].text.contains("Prize: 30 sat"));
    assert_eq!(callback_data(&sent[0]), vec!["lottery=7-3-10".to_string()]);
    assert!(harness.store.exists("recentcoinflip:7").expect("exists"));
}

#[tokio::test]
async fn functional_non_admin_toggle_is_silently_rejected() {
    let harness = harness();

    let outcome = harness
        .dispatcher
        .dispatch(&group_message("/toggle ticket 200"))
        .await;

    assert_eq!(outcome, rejected("toggle", Rejection::NotAdmin));
    assert!(harness.directory.updates.lock().expect("updates lock").is_empty());
    assert!(harness.chat.sent().is_empty());
}

#[tokio::test]
async fn functional_admin_toggles_ticket_price_and_spammy() {
    let harness = harness();
    harness.chat.admins.lock().expect("admins lock").insert(ALICE);

    let ticket = harness
        .dispatcher
        .dispatch(&group_message("/toggle ticket 200"))
        .await;
    let spammy = harness
        .dispatcher
        .dispatch(&group_message("/toggle spammy"))
        .await;

    assert_eq!(ticket, DispatchOutcome::Handled { command: "toggle" });
    assert_eq!(spammy, DispatchOutcome::Handled { command: "toggle" });
    assert_eq!(
        *harness.directory.updates.lock().expect("updates lock"),
        vec![
            ConversationChange::TicketPrice(200),
            ConversationChange::ToggleSpammy
        ]
    );
    let texts = harness.chat.texts();
    assert!(texts[0].contains("200 sat"));
    assert!(texts[0].contains("@tipbot"));
    assert_eq!(
        texts[1],
        "This group is now spammy: notifications will be shown here."
    );
}

#[tokio::test]
async fn functional_private_toggle_only_changes_language() {
    let harness = harness();

    let language = harness
        .dispatcher
        .dispatch(&private_message("/toggle language ES"))
        .await;
    let spammy = harness
        .dispatcher
        .dispatch(&private_message("/toggle spammy"))
        .await;

    assert_eq!(language, DispatchOutcome::Handled { command: "toggle" });
    assert_eq!(spammy, rejected("toggle", Rejection::GroupOnly));
    assert_eq!(
        *harness.directory.languages.lock().expect("languages lock"),
        vec![(ALICE, "es".to_string())]
    );
    assert_eq!(harness.chat.sent().len(), 1);
}

#[tokio::test]
async fn functional_hide_normalizes_visibility_and_reveal_finds_it() {
    let harness = harness();

    let outcome = harness
        .dispatcher
        .dispatch(&private_message(
            "/hide 50 teaser~the secret --revealers=3 --crowdfund=4 --public",
        ))
        .await;
    assert_eq!(outcome, DispatchOutcome::Handled { command: "hide" });

    let hidden_id = hidden_message_id(ALICE, ALICE, COMMAND_MESSAGE);
    let stored = harness
        .store
        .get(&hidden_message_key(&hidden_id))
        .expect("get")
        .expect("hidden message stored");
    let hidden: HiddenMessage = serde_json::from_str(&stored).expect("decode hidden");
    assert_eq!(hidden.preview, "teaser");
    assert_eq!(hidden.content, "the secret");
    assert!(!hidden.public);
    assert_eq!(hidden.crowdfund, 1);
    assert_eq!(hidden.revealers, 3);

    let sent = harness.chat.sent();
    assert_eq!(
        sent[0].keyboard[0][0].action,
        tipbot_core::ButtonAction::SwitchInlineQuery(format!("reveal {hidden_id}"))
    );

    let reveal = harness
        .dispatcher
        .dispatch(&private_message(&format!("/reveal {hidden_id}")))
        .await;
    assert_eq!(reveal, DispatchOutcome::Handled { command: "reveal" });
    let sent = harness.chat.sent();
    assert_eq!(sent[1].text, "teaser");
    assert_eq!(callback_data(&sent[1]), vec![format!("reveal={hidden_id}")]);
}

#[tokio::test]
async fn functional_hide_without_content_and_unknown_reveal_are_rejected() {
    let harness = harness();

    let hide = harness
        .dispatcher
        .dispatch(&private_message("/hide 50 nothing to split"))
        .await;
    let reveal = harness
        .dispatcher
        .dispatch(&private_message("/reveal deadbeef0000"))
        .await;

    assert_eq!(hide, rejected("hide", Rejection::NoHiddenContent));
    assert_eq!(reveal, rejected("reveal", Rejection::HiddenNotFound));
    assert_eq!(harness.chat.texts()[1], "Hidden message not found.");
}

#[tokio::test]
async fn functional_pasted_invoice_in_private_becomes_payment_prompt() {
    let harness = harness();

    let outcome = harness
        .dispatcher
        .dispatch(&private_message(&format!("please pay lightning:{}", INVOICE.to_uppercase())))
        .await;

    assert_eq!(outcome, DispatchOutcome::Handled { command: "pay" });
    assert!(harness.ledger.payments.lock().expect("payments lock").is_empty());
    let sent = harness.chat.sent();
    let buttons = callback_data(&sent[0]);
    assert_eq!(buttons.len(), 2);
    let token = buttons[0]
        .strip_prefix("pay=")
        .expect("confirm button carries token");
    assert_eq!(buttons[1], format!("cancel={token}"));
    let stored = harness
        .store
        .get(&format!("{PAY_PROMPT_KEY_PREFIX}{token}"))
        .expect("get")
        .expect("pending payment stored");
    let pending: PendingPayment = serde_json::from_str(&stored).expect("decode pending");
    assert_eq!(pending.bolt11, INVOICE);
    assert_eq!(pending.amount_msat, 150_000);
}

#[tokio::test]
async fn functional_paynow_pays_without_confirmation() {
    let harness = harness();

    let outcome = harness
        .dispatcher
        .dispatch(&private_message(&format!("/paynow {INVOICE}")))
        .await;

    assert_eq!(outcome, DispatchOutcome::Handled { command: "pay" });
    assert_eq!(harness.ledger.payments.lock().expect("payments lock").len(), 1);
    assert_eq!(harness.chat.texts(), vec!["Payment of 150 sat sent.".to_string()]);
}

#[tokio::test]
async fn functional_pay_reads_invoice_from_replied_message() {
    let harness = harness();
    let message = replying_to(
        private_message("/decode"),
        profile(BOB, "bob"),
        &format!("my invoice: {INVOICE}"),
    );

    let outcome = harness.dispatcher.dispatch(&message).await;

    assert_eq!(outcome, DispatchOutcome::Handled { command: "pay" });
    assert!(harness.chat.texts()[0].contains("<b>Payee</b>: 02node"));
}

#[tokio::test]
async fn functional_pay_without_invoice_is_rejected() {
    let harness = harness();

    let outcome = harness.dispatcher.dispatch(&private_message("/pay")).await;

    assert_eq!(outcome, rejected("pay", Rejection::MissingInvoice));
}

#[tokio::test]
async fn functional_receive_creates_invoice_with_qr() {
    let harness = harness();
    let message = replying_to(private_message("/invoice 21"), profile(BOB, "bob"), "for pizza");

    let outcome = harness.dispatcher.dispatch(&message).await;

    assert_eq!(outcome, DispatchOutcome::Handled { command: "receive" });
    let invoices = harness.ledger.invoices.lock().expect("invoices lock").clone();
    assert_eq!(invoices[0].amount_msat, Some(21_000));
    assert_eq!(invoices[0].description, "for pizza");
    assert_eq!(
        harness.chat.sent()[0].qr_payload.as_deref(),
        Some("lnbc1fresh")
    );
}

#[tokio::test]
async fn functional_issued_voucher_is_sent_with_qr() {
    let harness = harness();

    let outcome = harness
        .dispatcher
        .dispatch(&private_message("/withdraw lnurl 500"))
        .await;

    assert_eq!(outcome, DispatchOutcome::Handled { command: "lnurl withdraw" });
    let sent = harness.chat.sent();
    let lnurl = sent[0].qr_payload.clone().expect("qr payload");
    assert!(lnurl.starts_with("LNURL1"));
    assert!(sent[0].text.contains(&format!("lightning:{lnurl}")));
}

#[tokio::test]
async fn functional_malformed_lnurl_is_reported_as_invalid() {
    let harness = harness();

    let outcome = harness
        .dispatcher
        .dispatch(&private_message("/lnurl lnurl1notavoucher"))
        .await;

    assert_eq!(outcome, rejected("lnurl redeem", Rejection::InvalidLnurl));
    assert!(harness.chat.texts()[0].starts_with("Invalid lnurl:"));
}

#[tokio::test]
async fn functional_balance_and_transactions_render_in_sats() {
    let harness = harness();

    harness
        .dispatcher
        .dispatch(&private_message("/balance"))
        .await;
    harness
        .dispatcher
        .dispatch(&private_message("/transactions"))
        .await;

    let texts = harness.chat.texts();
    assert!(texts[0].contains("<b>Balance</b>: 1234 sat"));
    assert!(texts[0].contains("<b>Total fees paid</b>: 3 sat"));
    assert!(texts[1].contains("<code>-21</code>"));
    assert!(texts[1].contains("/tx_cdcdcdcd"));
}

#[tokio::test]
async fn functional_rename_requires_price_and_bot_rights() {
    let harness = harness();
    harness
        .directory
        .seed_group(|conversation| conversation.renamable_price = 300);

    let refused = harness
        .dispatcher
        .dispatch(&group_message("/rename Moon Club"))
        .await;
    assert_eq!(refused, rejected("rename", Rejection::NotRenamable));

    *harness.chat.bot_admin.lock().expect("bot admin lock") = true;
    let accepted = harness
        .dispatcher
        .dispatch(&group_message("/rename Moon Club"))
        .await;
    assert_eq!(accepted, DispatchOutcome::Handled { command: "rename" });
    let sent = harness.chat.sent();
    let token = callback_data(&sent[1])[0]
        .strip_prefix("rename=")
        .expect("rename token")
        .to_string();
    let stored = harness
        .store
        .get(&format!("{RENAME_PROMPT_KEY_PREFIX}{token}"))
        .expect("get")
        .expect("pending rename");
    let rename: PendingRename = serde_json::from_str(&stored).expect("decode rename");
    assert_eq!(rename.name, "Moon Club");
    assert_eq!(rename.satoshis, 300);
    assert_eq!(rename.chat, GROUP);
}

#[tokio::test]
async fn functional_external_app_commands_reach_the_gateway() {
    let harness = harness();

    let outcome = harness
        .dispatcher
        .dispatch(&private_message("/microbet bets"))
        .await;

    assert_eq!(outcome, DispatchOutcome::Handled { command: "microbet" });
    let requests = harness.apps.requests.lock().expect("requests lock");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].app, ExternalApp::Microbet);
    assert_eq!(requests[0].actor.id, ALICE);
}

#[tokio::test]
async fn functional_unparseable_command_helps_in_private_but_stays_quiet_in_groups() {
    let harness = harness();

    let private = harness
        .dispatcher
        .dispatch(&private_message("/sendd 5"))
        .await;
    let group = harness
        .dispatcher
        .dispatch(&group_message("/sendd 5"))
        .await;

    assert_eq!(private, DispatchOutcome::Help);
    assert_eq!(group, DispatchOutcome::Unrecognized { notified: false });
    let sent = harness.chat.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.contains("send"));
}

#[tokio::test]
async fn functional_banned_and_senderless_messages_are_ignored() {
    let harness = harness();
    harness.directory.banned.lock().expect("banned lock").insert(ALICE);

    let banned = harness
        .dispatcher
        .dispatch(&private_message("/balance"))
        .await;
    let mut senderless = group_message("/balance");
    senderless.sender = None;
    let senderless = harness.dispatcher.dispatch(&senderless).await;

    assert_eq!(banned, DispatchOutcome::Ignored(IgnoreReason::Banned));
    assert_eq!(
        senderless,
        DispatchOutcome::Ignored(IgnoreReason::MissingSender)
    );
    assert!(harness.chat.sent().is_empty());
}

#[tokio::test]
async fn functional_group_chatter_is_ignored_but_prompt_replies_surface() {
    let harness = harness();

    let chatter = harness
        .dispatcher
        .dispatch(&group_message("anyone up for a coinflip?"))
        .await;
    let answer = harness
        .dispatcher
        .dispatch(&replying_to(
            group_message("New Group Name"),
            bot_profile(),
            "What should the new name be?",
        ))
        .await;

    assert_eq!(
        chatter,
        DispatchOutcome::Ignored(IgnoreReason::NotLeadingCommand)
    );
    assert_eq!(
        answer,
        DispatchOutcome::PromptReply {
            reply_to: 55,
            text: "New Group Name".to_string(),
        }
    );
}

#[tokio::test]
async fn regression_start_and_stop_only_act_in_private_chats() {
    let harness = harness();

    let group = harness
        .dispatcher
        .dispatch(&group_message("/start"))
        .await;
    let private = harness
        .dispatcher
        .dispatch(&private_message("/stop"))
        .await;

    assert_eq!(group, rejected("start", Rejection::PrivateOnly));
    assert_eq!(private, DispatchOutcome::Handled { command: "stop" });
    assert_eq!(harness.chat.texts(), vec!["Notifications stopped.".to_string()]);
    let alice = harness
        .directory
        .load_user(ALICE)
        .await
        .expect("load")
        .expect("alice");
    assert_eq!(alice.chat_id, None);
}

#[tokio::test]
async fn integration_commands_are_tracked_through_the_analytics_queue() {
    let harness = harness();
    harness.directory.seed_user(BOB, "bob", Some(BOB));

    harness
        .dispatcher
        .dispatch(&private_message("/send 1 @bob"))
        .await;

    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        let events = harness.sink.events.lock().expect("events lock").clone();
        if events.len() >= 2 || tokio::time::Instant::now() >= deadline {
            assert_eq!(events, vec!["command".to_string(), "send".to_string()]);
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}

fn authorization(unattended: bool, chat_id: Option<ChatId>) -> InvoiceAuthorization {
    InvoiceAuthorization {
        user: Actor {
            id: ALICE,
            transport_id: ALICE,
            username: Some("alice".to_string()),
            display_name: "alice".to_string(),
            locale: "en".to_string(),
            chat_id,
        },
        bolt11: INVOICE.to_string(),
        amount_msat: 150_000,
        message_id: 42,
        unattended,
        invoice: DecodedInvoice {
            amount_msat: Some(150_000),
            description: "withdraw".to_string(),
            payment_hash: "ef".repeat(32),
            payee: "02wallet".to_string(),
        },
    }
}

#[tokio::test]
async fn integration_unattended_settlement_echoes_invoice_then_pays() {
    let harness = harness();

    harness
        .dispatcher
        .settle(authorization(true, Some(ALICE)))
        .await
        .expect("settle");

    let sent = harness.chat.sent();
    assert_eq!(sent[0].text, INVOICE);
    assert_eq!(sent[0].reply_to, Some(42));
    assert_eq!(sent[1].text, "Payment of 150 sat sent.");
    let payments = harness.ledger.payments.lock().expect("payments lock");
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].message_id, 42);
}

#[tokio::test]
async fn functional_attended_settlement_asks_for_confirmation() {
    let harness = harness();

    harness
        .dispatcher
        .settle(authorization(false, Some(ALICE)))
        .await
        .expect("settle");

    assert!(harness.ledger.payments.lock().expect("payments lock").is_empty());
    let sent = harness.chat.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].text.contains("Pay 150 sat?"));
    assert_eq!(callback_data(&sent[1]).len(), 2);
}

#[tokio::test]
async fn regression_settlement_failures_surface_to_the_issuer() {
    let harness = harness();
    *harness.ledger.pay_error.lock().expect("pay error lock") = Some("no route".to_string());

    let failed = harness
        .dispatcher
        .settle(authorization(true, Some(ALICE)))
        .await
        .expect_err("payment fails");
    let no_chat = harness
        .dispatcher
        .settle(authorization(true, None))
        .await
        .expect_err("no chat");

    assert_eq!(failed.to_string(), "rejected: no route");
    assert!(matches!(no_chat, CollaboratorError::Rejected(_)));
    assert_eq!(harness.chat.texts()[1], "Payment failed: rejected: no route");
}
