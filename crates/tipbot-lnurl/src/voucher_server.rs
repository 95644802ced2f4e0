//! HTTP surface of the withdraw voucher issuer.
//!
//! Both endpoints answer HTTP 200 with a `{status, reason?}` body; wallets key
//! off `status`, not the HTTP code.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tipbot_core::CollaboratorError;
use tokio::net::TcpListener;

use crate::lnurl_error::VoucherRejection;
use crate::voucher_wire::{InvoiceSubmission, LnurlStatus, WithdrawParamsQuery};
use crate::withdraw_issuer::{InvoiceAuthorization, WithdrawIssuer};

pub const WITHDRAW_PARAMS_ENDPOINT: &str = "/lnurl/withdraw";
pub const WITHDRAW_INVOICE_ENDPOINT: &str = "/lnurl/withdraw/invoice/{user}/{max}/{message}";

#[async_trait]
/// Trait contract for paying an invoice the issuer accepted.
pub trait WithdrawSettlement: Send + Sync {
    async fn settle(&self, authorization: InvoiceAuthorization) -> Result<(), CollaboratorError>;
}

#[derive(Clone)]
pub struct VoucherServerState {
    pub issuer: Arc<WithdrawIssuer>,
    pub settlement: Arc<dyn WithdrawSettlement>,
}

pub fn build_voucher_router(state: VoucherServerState) -> Router {
    Router::new()
        .route(WITHDRAW_PARAMS_ENDPOINT, get(handle_withdraw_params))
        .route(WITHDRAW_INVOICE_ENDPOINT, get(handle_withdraw_invoice))
        .with_state(Arc::new(state))
}

/// Serves the voucher endpoints on `bind` until ctrl-c.
pub async fn run_voucher_server(bind: &str, state: VoucherServerState) -> Result<()> {
    let bind_addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid voucher bind '{bind}': expected host:port"))?;
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind voucher server on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve voucher server listen address")?;
    tracing::info!(addr = %local_addr, "voucher server listening");

    serve_voucher_router(listener, state).await
}

pub async fn serve_voucher_router(listener: TcpListener, state: VoucherServerState) -> Result<()> {
    let app = build_voucher_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("voucher server exited unexpectedly")?;
    Ok(())
}

fn rejection_response(rejection: &VoucherRejection) -> Response {
    Json(LnurlStatus::error(rejection.to_string())).into_response()
}

async fn handle_withdraw_params(
    State(state): State<Arc<VoucherServerState>>,
    Query(query): Query<WithdrawParamsQuery>,
) -> Response {
    match state.issuer.withdraw_parameters(&query).await {
        Ok(params) => Json(params).into_response(),
        Err(rejection) => {
            tracing::debug!(%rejection, "rejected withdraw parameter request");
            rejection_response(&rejection)
        }
    }
}

async fn handle_withdraw_invoice(
    State(state): State<Arc<VoucherServerState>>,
    Path((user, max, message)): Path<(String, String, String)>,
    Query(submission): Query<InvoiceSubmission>,
) -> Response {
    let authorization = match state
        .issuer
        .authorize_invoice(&user, &max, &message, &submission)
        .await
    {
        Ok(authorization) => authorization,
        Err(rejection) => {
            tracing::debug!(%rejection, "rejected withdraw invoice");
            return rejection_response(&rejection);
        }
    };

    let user_id = authorization.user.id;
    match state.settlement.settle(authorization).await {
        Ok(()) => Json(LnurlStatus::ok()).into_response(),
        Err(error) => {
            tracing::warn!(user = user_id, %error, "withdraw settlement failed");
            rejection_response(&VoucherRejection::PaymentFailed(error.to_string()))
        }
    }
}
