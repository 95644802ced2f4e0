use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use tipbot_core::{Actor, InvoiceRequest, Ledger, MessageId};

use crate::lnurl_codec::decode_lnurl;
use crate::lnurl_error::LnurlError;
use crate::voucher_wire::{LnurlStatus, WithdrawRequest, WITHDRAW_REQUEST_TAG};

/// Pulls funds from third-party withdraw vouchers into a bot balance.
pub struct VoucherConsumer {
    client: Client,
    ledger: Arc<dyn Ledger>,
}

impl VoucherConsumer {
    pub fn new(ledger: Arc<dyn Ledger>, timeout_ms: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms.max(1)))
            .build()
            .context("failed to create lnurl http client")?;
        Ok(Self { client, ledger })
    }

    /// Redeems `lnurl` for its advertised maximum. Returns the invoiced amount.
    ///
    /// Success is silent on the wire: the ledger credits the account when the
    /// remote service pays the submitted invoice.
    #[tracing::instrument(
        name = "tipbot_lnurl.consumer.redeem",
        skip(self, actor, lnurl),
        fields(user = actor.id)
    )]
    pub async fn redeem(
        &self,
        actor: &Actor,
        lnurl: &str,
        message_id: MessageId,
    ) -> Result<u64, LnurlError> {
        let url = decode_lnurl(lnurl)?;
        tracing::debug!(%url, "withdrawing from lnurl");

        let params = self
            .client
            .get(&url)
            .send()
            .await?
            .json::<WithdrawRequest>()
            .await?;
        if params.status.is_error() {
            return Err(LnurlError::Remote(params.status.reason_or_default()));
        }
        if params.tag != WITHDRAW_REQUEST_TAG {
            return Err(LnurlError::NotWithdraw(params.tag));
        }

        let amount_msat = params.max_withdrawable / 1000 * 1000;
        let minimum_msat = params.min_withdrawable.max(1000);
        if amount_msat < minimum_msat {
            return Err(LnurlError::AmountBelowMinimum(amount_msat, minimum_msat));
        }
        let bolt11 = self
            .ledger
            .create_invoice(InvoiceRequest {
                user: actor.id,
                amount_msat: Some(amount_msat),
                description: params.default_description.clone(),
                preimage: None,
                message_id,
            })
            .await?;

        let submitted = self
            .client
            .get(&params.callback)
            .query(&[("k1", params.k1.as_str()), ("pr", bolt11.as_str())])
            .send()
            .await?
            .json::<LnurlStatus>()
            .await?;
        if submitted.is_error() {
            return Err(LnurlError::Remote(submitted.reason_or_default()));
        }
        tracing::info!(amount_msat, "submitted invoice to lnurl service");
        Ok(amount_msat)
    }
}
