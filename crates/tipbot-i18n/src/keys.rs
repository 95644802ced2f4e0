//! Symbolic identifiers of every user-facing message.

pub const HELP_INTRO: &str = "help_intro";
pub const HELP_METHOD: &str = "help_method";
pub const HELP_SIMILAR: &str = "help_similar";
pub const WRONG_COMMAND: &str = "wrong_command";

pub const WELCOME: &str = "welcome";
pub const TUTORIAL: &str = "tutorial";
pub const STOP_NOTIFY: &str = "stop_notify";
pub const ERROR: &str = "error";

pub const INVALID_AMOUNT: &str = "invalid_amount";
pub const INVALID_PARTICIPANTS: &str = "invalid_participants";
pub const INSUFFICIENT_BALANCE: &str = "insufficient_balance";
pub const RATE_LIMIT: &str = "rate_limit";
pub const OVER_QUOTA: &str = "over_quota";

pub const CANT_SEND_NO_RECEIVER: &str = "cant_send_no_receiver";
pub const SAVE_RECEIVER_FAIL: &str = "save_receiver_fail";
pub const FAILED_USER: &str = "failed_user";
pub const FAILED_SEND: &str = "failed_send";
pub const USER_SENT_YOU_SATS: &str = "user_sent_you_sats";
pub const RECEIVED_SATS_ANON: &str = "received_sats_anon";
pub const USER_SENT_TO_USER: &str = "user_sent_to_user";

pub const GIVEAWAY_MSG: &str = "giveaway_msg";
pub const GIVEAWAY_BUTTON: &str = "giveaway_button";
pub const GIVEFLIP_MSG: &str = "giveflip_msg";
pub const GIVEFLIP_BUTTON: &str = "giveflip_button";
pub const LOTTERY_MSG: &str = "lottery_msg";
pub const LOTTERY_BUTTON: &str = "lottery_button";
pub const COINFLIPS_ENABLED_MSG: &str = "coinflips_enabled_msg";
pub const FUNDRAISE_AD: &str = "fundraise_ad";
pub const FUNDRAISE_BUTTON: &str = "fundraise_button";

pub const HIDDEN_WITH_ID: &str = "hidden_with_id";
pub const HIDDEN_SHARE_BUTTON: &str = "hidden_share_button";
pub const HIDDEN_REVEAL_BUTTON: &str = "hidden_reveal_button";
pub const HIDDEN_MSG_NOT_FOUND: &str = "hidden_msg_not_found";
pub const HIDDEN_NO_CONTENT: &str = "hidden_no_content";

pub const LNURL_INVALID: &str = "lnurl_invalid";
pub const LNURL_FAIL: &str = "lnurl_fail";
pub const LNURL_VOUCHER: &str = "lnurl_voucher";

pub const INVOICE_CREATED: &str = "invoice_created";
pub const PAY_MISSING_INVOICE: &str = "pay_missing_invoice";
pub const PAY_CONFIRM: &str = "pay_confirm";
pub const PAY_CONFIRM_BUTTON: &str = "pay_confirm_button";
pub const CANCEL_BUTTON: &str = "cancel_button";
pub const PAYMENT_SENT: &str = "payment_sent";
pub const PAYMENT_FAILED: &str = "payment_failed";
pub const DECODED_INVOICE: &str = "decoded_invoice";

pub const BALANCE_MSG: &str = "balance_msg";
pub const TRANSACTIONS_LIST: &str = "transactions_list";
pub const TRANSACTION_DETAIL: &str = "transaction_detail";
pub const TRANSACTION_NOT_FOUND: &str = "transaction_not_found";

pub const GROUP_NOT_RENAMABLE: &str = "group_not_renamable";
pub const RENAME_PROMPT: &str = "rename_prompt";
pub const RENAME_BUTTON: &str = "rename_button";
pub const FREE_JOIN: &str = "free_join";
pub const TICKET_MSG: &str = "ticket_msg";
pub const RENAMABLE_MSG: &str = "renamable_msg";
pub const SPAMMY_MSG: &str = "spammy_msg";
pub const LANGUAGE_MSG: &str = "language_msg";

/// Key of the free-text help body of a command, derived from its primary alias.
pub fn command_help_key(primary_alias: &str) -> String {
    format!("{}_help", primary_alias.replace(' ', "_"))
}
