use thiserror::Error;
use tipbot_core::{CollaboratorError, StoreError};

#[derive(Debug, Error)]
/// Enumerates supported `LnurlError` values.
pub enum LnurlError {
    #[error("{0}")]
    InvalidLnurl(String),
    #[error("failed to encode lnurl: {0}")]
    Encode(String),
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Remote(String),
    #[error("voucher cap of {0} sat is out of range")]
    CapOutOfRange(u64),
    #[error("voucher amount {0} msat is below the {1} msat minimum")]
    AmountBelowMinimum(u64, u64),
    #[error("unsupported lnurl tag '{0}'")]
    NotWithdraw(String),
    #[error("{0}")]
    Invoice(#[from] CollaboratorError),
    #[error("{0}")]
    Store(#[from] StoreError),
}

/// Reasons returned to wallets in `{status:"ERROR", reason}` bodies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoucherRejection {
    #[error("Invalid user id.")]
    InvalidUserId,
    #[error("Couldn't load user.")]
    UnknownUser,
    #[error("Invalid message id.")]
    InvalidMessageId,
    #[error("Invalid maximum amount.")]
    InvalidMaximum,
    #[error("Couldn't load balance.")]
    BalanceUnavailable,
    #[error("Expired secret.")]
    ExpiredSecret,
    #[error("lnurl already used.")]
    AlreadyUsed,
    #[error("Internal mismatch.")]
    Mismatch,
    #[error("Invalid user or maximum amount.")]
    InvalidPath,
    #[error("Invalid payment request.")]
    InvalidPaymentRequest,
    #[error("Amount too big.")]
    AmountTooBig,
    #[error("Failed to load user.")]
    UserLoadFailed,
    #[error("User has no chat with the bot.")]
    OwnerUnreachable,
    #[error("Store error. Please report.")]
    Store,
    #[error("Payment failed: {0}")]
    PaymentFailed(String),
}
