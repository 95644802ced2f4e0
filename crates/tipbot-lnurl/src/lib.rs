//! LNURL-withdraw vouchers in both roles.
//!
//! [`VoucherConsumer`] redeems third-party vouchers into a bot balance.
//! [`WithdrawIssuer`] and the axum router in [`voucher_server`] let an outside
//! wallet pull funds from a bot balance, optionally without confirmation when a
//! one-time challenge backs the voucher.

pub mod lnurl_codec;
pub mod lnurl_error;
pub mod voucher_consumer;
pub mod voucher_server;
pub mod voucher_wire;
pub mod withdraw_issuer;

pub use lnurl_codec::{decode_lnurl, encode_lnurl, LNURL_HRP};
pub use lnurl_error::{LnurlError, VoucherRejection};
pub use voucher_consumer::VoucherConsumer;
pub use voucher_server::{
    build_voucher_router, run_voucher_server, serve_voucher_router, VoucherServerState,
    WithdrawSettlement, WITHDRAW_INVOICE_ENDPOINT, WITHDRAW_PARAMS_ENDPOINT,
};
pub use voucher_wire::{
    InvoiceSubmission, LnurlStatus, WithdrawParamsQuery, WithdrawRequest, STATUS_ERROR, STATUS_OK,
    WITHDRAW_REQUEST_TAG,
};
pub use withdraw_issuer::{
    challenge_key, InvoiceAuthorization, IssuedVoucher, WithdrawIssuer, WithdrawIssuerConfig,
    USED_MARKER,
};
