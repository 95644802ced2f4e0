//! Issuer side of the withdraw voucher handshake.
//!
//! A voucher carries a `user`/`message` pair and, when capped, a one-time
//! challenge bound to `user-max_msat` in the ephemeral store. The invoice
//! endpoint consumes that challenge with a single atomic exchange; concurrent
//! submissions of the same challenge see either the binding (exactly one of
//! them) or the `used` marker.

use std::sync::Arc;
use std::time::Duration;

use tipbot_core::{
    Actor, DecodedInvoice, EphemeralStore, Ledger, MessageId, UserDirectory, UserId,
};

use crate::lnurl_codec::encode_lnurl;
use crate::lnurl_error::{LnurlError, VoucherRejection};
use crate::voucher_wire::{
    InvoiceSubmission, LnurlStatus, WithdrawParamsQuery, WithdrawRequest, WITHDRAW_REQUEST_TAG,
};

pub const CHALLENGE_KEY_PREFIX: &str = "lnurlwithdrawnoconf:";
pub const SPENT_CHALLENGE_KEY_PREFIX: &str = "lnurlwithdrawspent:";
pub const USED_MARKER: &str = "used";

pub fn challenge_key(challenge: &str) -> String {
    format!("{CHALLENGE_KEY_PREFIX}{challenge}")
}

fn spent_challenge_key(challenge: &str) -> String {
    format!("{SPENT_CHALLENGE_KEY_PREFIX}{challenge}")
}

fn challenge_binding(user: UserId, max_msat: u64) -> String {
    format!("{user}-{max_msat}")
}

fn new_challenge() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[derive(Debug, Clone)]
pub struct WithdrawIssuerConfig {
    /// Public base URL the voucher endpoints are reachable under.
    pub service_url: String,
    pub challenge_ttl: Duration,
    pub margin_threshold_msat: u64,
    pub margin_percent: u64,
}

impl Default for WithdrawIssuerConfig {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:8787".to_string(),
            challenge_ttl: Duration::from_secs(3600),
            margin_threshold_msat: 5_000_000,
            margin_percent: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A freshly issued voucher, ready to be shown to its owner.
pub struct IssuedVoucher {
    pub lnurl: String,
    pub url: String,
    pub challenge: String,
    pub max_msat: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An invoice the issuer accepted for settlement.
pub struct InvoiceAuthorization {
    pub user: Actor,
    pub bolt11: String,
    pub amount_msat: u64,
    pub message_id: MessageId,
    /// Set when a challenge was consumed; the payment skips confirmation.
    pub unattended: bool,
    pub invoice: DecodedInvoice,
}

pub struct WithdrawIssuer {
    config: WithdrawIssuerConfig,
    store: Arc<dyn EphemeralStore>,
    ledger: Arc<dyn Ledger>,
    directory: Arc<dyn UserDirectory>,
}

impl WithdrawIssuer {
    pub fn new(
        config: WithdrawIssuerConfig,
        store: Arc<dyn EphemeralStore>,
        ledger: Arc<dyn Ledger>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            config,
            store,
            ledger,
            directory,
        }
    }

    pub fn config(&self) -> &WithdrawIssuerConfig {
        &self.config
    }

    fn service_url(&self) -> &str {
        self.config.service_url.trim_end_matches('/')
    }

    /// Builds a voucher for `actor`. A cap binds a one-time challenge so the
    /// invoice endpoint can pay without asking the owner.
    #[tracing::instrument(
        name = "tipbot_lnurl.issuer.issue_voucher",
        skip(self, actor),
        fields(user = actor.id)
    )]
    pub fn issue_voucher(
        &self,
        actor: &Actor,
        message_id: MessageId,
        max_sat: Option<u64>,
    ) -> Result<IssuedVoucher, LnurlError> {
        let challenge = new_challenge();
        let mut url = format!(
            "{}/lnurl/withdraw?user={}&message={}&challenge={}",
            self.service_url(),
            actor.id,
            message_id,
            challenge
        );
        let max_msat = match max_sat.filter(|sats| *sats > 0) {
            Some(sats) => Some(sats.checked_mul(1000).ok_or(LnurlError::CapOutOfRange(sats))?),
            None => None,
        };
        if let Some(max_msat) = max_msat {
            url.push_str(&format!("&max={}", max_msat / 1000));
            self.store.set(
                &challenge_key(&challenge),
                &challenge_binding(actor.id, max_msat),
                Some(self.config.challenge_ttl),
            )?;
        }
        let lnurl = encode_lnurl(&url)?;
        tracing::debug!(capped = max_msat.is_some(), "issued withdraw voucher");
        Ok(IssuedVoucher {
            lnurl,
            url,
            challenge,
            max_msat,
        })
    }

    /// Largest amount a wallet may pull from `balance_msat` without a cap.
    pub fn withdrawable_msat(&self, balance_msat: i64) -> u64 {
        let balance = u64::try_from(balance_msat).unwrap_or(0);
        if balance > self.config.margin_threshold_msat {
            let keep = 100 - self.config.margin_percent.min(100);
            (u128::from(balance) * u128::from(keep) / 100) as u64
        } else {
            balance
        }
    }

    /// Answers the parameter endpoint. Read-only with respect to challenges.
    #[tracing::instrument(
        name = "tipbot_lnurl.issuer.withdraw_parameters",
        skip(self, query),
        fields(user = query.user.as_deref().unwrap_or_default())
    )]
    pub async fn withdraw_parameters(
        &self,
        query: &WithdrawParamsQuery,
    ) -> Result<WithdrawRequest, VoucherRejection> {
        let user_id = query
            .user
            .as_deref()
            .and_then(|raw| raw.trim().parse::<UserId>().ok())
            .ok_or(VoucherRejection::InvalidUserId)?;
        let message_id = query
            .message
            .as_deref()
            .and_then(|raw| raw.trim().parse::<MessageId>().ok())
            .ok_or(VoucherRejection::InvalidMessageId)?;
        let cap_sat = match query.max.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| VoucherRejection::InvalidMaximum)?,
        };
        let user = match self.directory.load_user(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(VoucherRejection::UnknownUser),
            Err(error) => {
                tracing::warn!(user = user_id, %error, "failed to load voucher owner");
                return Err(VoucherRejection::UnknownUser);
            }
        };

        let (k1, max_msat) = if cap_sat > 0 {
            let max_msat = cap_sat
                .checked_mul(1000)
                .ok_or(VoucherRejection::InvalidMaximum)?;
            let challenge = query
                .challenge
                .as_deref()
                .map(str::trim)
                .filter(|challenge| !challenge.is_empty())
                .ok_or(VoucherRejection::ExpiredSecret)?;
            self.check_pending_challenge(challenge, user.id, max_msat)?;
            (challenge.to_string(), max_msat)
        } else {
            let balance = self.ledger.balance_msat(user.id).await.map_err(|error| {
                tracing::warn!(user = user.id, %error, "failed to load balance for voucher");
                VoucherRejection::BalanceUnavailable
            })?;
            (new_challenge(), self.withdrawable_msat(balance))
        };

        Ok(WithdrawRequest {
            callback: format!(
                "{}/lnurl/withdraw/invoice/{}/{}/{}",
                self.service_url(),
                user.id,
                max_msat,
                message_id
            ),
            k1,
            max_withdrawable: max_msat,
            min_withdrawable: 0,
            default_description: user.at_name(),
            tag: WITHDRAW_REQUEST_TAG.to_string(),
            status: LnurlStatus::ok(),
        })
    }

    fn check_pending_challenge(
        &self,
        challenge: &str,
        user: UserId,
        max_msat: u64,
    ) -> Result<(), VoucherRejection> {
        let current = self
            .store
            .get(&challenge_key(challenge))
            .map_err(|error| self.store_failure(challenge, error))?;
        match current.as_deref() {
            Some(USED_MARKER) => Err(VoucherRejection::AlreadyUsed),
            Some(binding) if binding == challenge_binding(user, max_msat) => Ok(()),
            Some(_) => Err(VoucherRejection::Mismatch),
            None if self.challenge_spent(challenge)? => Err(VoucherRejection::AlreadyUsed),
            None => Err(VoucherRejection::ExpiredSecret),
        }
    }

    fn challenge_spent(&self, challenge: &str) -> Result<bool, VoucherRejection> {
        self.store
            .exists(&spent_challenge_key(challenge))
            .map_err(|error| self.store_failure(challenge, error))
    }

    fn store_failure(&self, challenge: &str, error: impl std::fmt::Display) -> VoucherRejection {
        tracing::error!(%challenge, %error, "voucher challenge store failure");
        VoucherRejection::Store
    }

    /// Validates a submitted invoice against the path-encoded owner and cap,
    /// consuming the challenge when one governs the request.
    #[tracing::instrument(
        name = "tipbot_lnurl.issuer.authorize_invoice",
        skip(self, submission),
        fields(challenge = submission.k1.as_deref().unwrap_or_default())
    )]
    pub async fn authorize_invoice(
        &self,
        user_raw: &str,
        max_raw: &str,
        message_raw: &str,
        submission: &InvoiceSubmission,
    ) -> Result<InvoiceAuthorization, VoucherRejection> {
        let (Ok(user_id), Ok(max_msat)) = (
            user_raw.trim().parse::<UserId>(),
            max_raw.trim().parse::<u64>(),
        ) else {
            return Err(VoucherRejection::InvalidPath);
        };
        let message_id = message_raw.trim().parse::<MessageId>().unwrap_or_default();

        let bolt11 = submission
            .pr
            .as_deref()
            .map(str::trim)
            .filter(|pr| !pr.is_empty())
            .ok_or(VoucherRejection::InvalidPaymentRequest)?;
        let invoice = self.ledger.decode_invoice(bolt11).await.map_err(|error| {
            tracing::debug!(%error, "submitted invoice did not decode");
            VoucherRejection::InvalidPaymentRequest
        })?;
        let amount_msat = invoice
            .amount_msat
            .filter(|amount| *amount > 0)
            .ok_or(VoucherRejection::InvalidPaymentRequest)?;
        if amount_msat > max_msat {
            return Err(VoucherRejection::AmountTooBig);
        }

        let user = match self.directory.load_user(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(VoucherRejection::UserLoadFailed),
            Err(error) => {
                tracing::warn!(user = user_id, %error, "failed to load voucher owner");
                return Err(VoucherRejection::UserLoadFailed);
            }
        };
        // Settlement needs the owner's chat; refuse before a challenge is burned.
        if user.chat_id.is_none() {
            return Err(VoucherRejection::OwnerUnreachable);
        }

        let challenge = submission.k1.as_deref().map(str::trim).unwrap_or_default();
        let unattended = if challenge.is_empty() {
            false
        } else {
            self.consume_challenge(challenge, user.id, max_msat)?
        };

        Ok(InvoiceAuthorization {
            user,
            bolt11: bolt11.to_string(),
            amount_msat,
            message_id,
            unattended,
            invoice,
        })
    }

    /// `Ok(true)` when this call consumed a pending challenge, `Ok(false)` when
    /// no challenge governs the request.
    fn consume_challenge(
        &self,
        challenge: &str,
        user: UserId,
        max_msat: u64,
    ) -> Result<bool, VoucherRejection> {
        let key = challenge_key(challenge);
        let previous = self
            .store
            .exchange(&key, USED_MARKER)
            .map_err(|error| self.store_failure(challenge, error))?;
        match previous.as_deref() {
            None if self.challenge_spent(challenge)? => Err(VoucherRejection::AlreadyUsed),
            None => Ok(false),
            Some(USED_MARKER) => Err(VoucherRejection::AlreadyUsed),
            Some(binding) if binding != challenge_binding(user, max_msat) => {
                tracing::warn!(%challenge, user, max_msat, "challenge binding mismatch");
                Err(VoucherRejection::Mismatch)
            }
            Some(_) => {
                self.store
                    .set(
                        &spent_challenge_key(challenge),
                        USED_MARKER,
                        Some(self.config.challenge_ttl),
                    )
                    .map_err(|error| self.store_failure(challenge, error))?;
                self.store
                    .delete(&key)
                    .map_err(|error| self.store_failure(challenge, error))?;
                tracing::info!(%challenge, user, "consumed withdraw challenge");
                Ok(true)
            }
        }
    }
}
