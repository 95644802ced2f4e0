//! Command engine of the tip bot.
//!
//! [`Dispatcher`] resolves the sender and chat of an inbound message, parses
//! it with the command grammar and runs the matching branch against the
//! ledger, chat transport and voucher collaborators. It also settles invoices
//! the withdraw issuer accepted. Analytics go through the non-blocking
//! [`AnalyticsQueue`].

pub mod analytics_queue;
pub mod dispatcher;

pub use analytics_queue::{AnalyticsQueue, AnalyticsQueueConfig, AnalyticsQueueStats};
pub use dispatcher::amount_parsing::{parse_participants, parse_price, parse_satoshis, AmountError};
pub use dispatcher::game_quota::{GameCheck, GameKind, GameQuota, GameQuotaConfig};
pub use dispatcher::hidden_message::{HiddenMessage, HiddenVisibility};
pub use dispatcher::inbound_detection::{detect_pasted_payment, PastedPayment};
pub use dispatcher::receiver_resolution::ReceiverSource;
pub use dispatcher::{
    DispatchOutcome, DispatchSettings, Dispatcher, DispatcherParts, IgnoreReason, PendingPayment,
    PendingRename, Rejection, PAY_PROMPT_KEY_PREFIX, RENAME_PROMPT_KEY_PREFIX,
};
