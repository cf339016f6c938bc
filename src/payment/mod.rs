//! Payment gateway seam: balance lookup, authorization and broadcast.
//!
//! The lottery engine never signs or submits transactions itself. It talks
//! to a [`PaymentGateway`], which is either the in-memory
//! [`SimulatedPaymentGateway`] or the [`HttpPaymentGateway`] bridge client.
//! [`collect_payment`] is the shared check-balance → pay → broadcast flow
//! used by pool joins and storefront purchases.

pub mod http;
pub mod simulated;

use std::fmt;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::domain::{Amount, ParticipantId};
use crate::error::LotteryError;

pub use http::HttpPaymentGateway;
pub use simulated::SimulatedPaymentGateway;

/// Failure reported by a payment gateway.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PaymentError {
    /// The wallet or signer refused to authorize the payment.
    #[error("{0}")]
    Rejected(String),
    /// The network rejected the signed transaction.
    #[error("{0}")]
    BroadcastFailed(String),
    /// The gateway could not be reached.
    #[error("payment gateway unreachable: {0}")]
    Transport(String),
    /// The gateway answered with something unreadable.
    #[error("malformed payment gateway response: {0}")]
    Malformed(String),
}

/// A stake or purchase payment to authorize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Paying wallet.
    pub sender: String,
    /// Receiving address.
    pub recipient: String,
    /// Amount to transfer.
    pub amount: Amount,
}

/// Opaque signed transaction returned by [`PaymentGateway::pay`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignedTransaction(pub String);

/// Outcome of [`PaymentGateway::broadcast`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    /// Whether the network accepted the transaction.
    pub success: bool,
    /// Transaction hash when available.
    #[serde(default, rename = "txHash", alias = "transaction_hash")]
    pub transaction_hash: Option<String>,
    /// Gateway-supplied failure reason.
    #[serde(default)]
    pub error: Option<String>,
}

/// Receipt of a payment that was authorized and broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    /// Amount paid.
    pub amount: Amount,
    /// Receiving address.
    pub recipient: String,
    /// Transaction hash, if the gateway reported one.
    pub transaction_hash: Option<String>,
}

/// External collaborator that owns wallets and talks to the chain.
///
/// Methods return boxed futures so the trait stays object-safe and can sit
/// behind an `Arc<dyn PaymentGateway>`.
pub trait PaymentGateway: Send + Sync + fmt::Debug {
    /// Discovers the wallet attached to this gateway.
    fn wallet_address(&self) -> BoxFuture<'_, Result<String, PaymentError>>;

    /// Returns the stablecoin balance of `address`.
    fn balance_of<'a>(&'a self, address: &'a str) -> BoxFuture<'a, Result<Amount, PaymentError>>;

    /// Authorizes and signs a payment.
    fn pay<'a>(
        &'a self,
        request: &'a PaymentRequest,
    ) -> BoxFuture<'a, Result<SignedTransaction, PaymentError>>;

    /// Submits a signed transaction to the network.
    fn broadcast<'a>(
        &'a self,
        transaction: &'a SignedTransaction,
    ) -> BoxFuture<'a, Result<BroadcastResult, PaymentError>>;
}

/// Checks the payer's balance, then pays `amount` to `recipient` and
/// broadcasts the transaction.
///
/// `action` completes the insufficient-funds message ("…to join.").
///
/// # Errors
///
/// - [`LotteryError::InsufficientFunds`] if the balance is below `amount`;
///   nothing is signed or broadcast.
/// - [`LotteryError::GatewayFailure`] if signing is refused or the
///   broadcast reports failure.
/// - [`LotteryError::Unexpected`] if the gateway cannot be reached.
pub async fn collect_payment(
    gateway: &dyn PaymentGateway,
    payer: &ParticipantId,
    recipient: &str,
    amount: Amount,
    action: &'static str,
) -> Result<PaymentReceipt, LotteryError> {
    let available = gateway.balance_of(payer.as_str()).await?;
    if available < amount {
        return Err(LotteryError::InsufficientFunds {
            required: amount,
            available,
            action,
        });
    }

    let request = PaymentRequest {
        sender: payer.as_str().to_string(),
        recipient: recipient.to_string(),
        amount,
    };
    let signed = gateway.pay(&request).await?;
    let result = gateway.broadcast(&signed).await?;
    if !result.success {
        let reason = result
            .error
            .unwrap_or_else(|| "transaction broadcast failed".to_string());
        return Err(PaymentError::BroadcastFailed(reason).into());
    }

    tracing::debug!(
        payer = %payer,
        recipient,
        %amount,
        tx = result.transaction_hash.as_deref(),
        "payment broadcast"
    );

    Ok(PaymentReceipt {
        amount,
        recipient: recipient.to_string(),
        transaction_hash: result.transaction_hash,
    })
}
