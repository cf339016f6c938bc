//! HTTP client for an external signer bridge.
//!
//! The bridge owns the wallet (hardware tag, custodial signer, …) and the
//! RPC connection. This adapter only maps the [`PaymentGateway`] calls onto
//! its JSON endpoints:
//!
//! | Call            | Request                                   |
//! |-----------------|-------------------------------------------|
//! | `wallet_address`| `GET  {base}/wallet`                      |
//! | `balance_of`    | `GET  {base}/balances/{address}?network=` |
//! | `pay`           | `POST {base}/payments`                    |
//! | `broadcast`     | `POST {base}/transactions`                |

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::{BroadcastResult, PaymentError, PaymentGateway, PaymentRequest, SignedTransaction};
use crate::domain::Amount;

#[derive(Debug, Deserialize)]
struct WalletResponse {
    address: String,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: String,
}

#[derive(Debug, Serialize)]
struct PaymentBody<'a> {
    sender: &'a str,
    recipient: &'a str,
    amount: String,
    network: &'a str,
    rpc_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    signed_transaction: String,
}

#[derive(Debug, Serialize)]
struct BroadcastBody<'a> {
    signed_transaction: &'a str,
    network: &'a str,
    rpc_url: &'a str,
}

/// [`PaymentGateway`] backed by a signer bridge reachable over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
    network: String,
    rpc_url: String,
}

impl HttpPaymentGateway {
    /// Creates a client for the bridge at `base_url`.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        network: impl Into<String>,
        rpc_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            network: network.into(),
            rpc_url: rpc_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `{base}/balances/{address}?network={network}` with the address
    /// percent-encoded as a single path segment.
    fn balance_url(&self, address: &str) -> Result<reqwest::Url, PaymentError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| PaymentError::Transport(format!("invalid bridge url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| PaymentError::Transport("bridge url cannot carry a path".to_string()))?
            .pop_if_empty()
            .push("balances")
            .push(address);
        url.query_pairs_mut().append_pair("network", &self.network);
        Ok(url)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        refused: fn(String) -> PaymentError,
    ) -> Result<T, PaymentError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                format!("payment bridge returned {status}")
            } else {
                body
            };
            return Err(refused(message));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| PaymentError::Malformed(e.to_string()))
    }
}

fn transport(err: reqwest::Error) -> PaymentError {
    PaymentError::Transport(err.to_string())
}

impl PaymentGateway for HttpPaymentGateway {
    fn wallet_address(&self) -> BoxFuture<'_, Result<String, PaymentError>> {
        async move {
            let response = self
                .client
                .get(self.url("/wallet"))
                .send()
                .await
                .map_err(transport)?;
            let wallet: WalletResponse = Self::read_json(response, PaymentError::Rejected).await?;
            Ok(wallet.address)
        }
        .boxed()
    }

    fn balance_of<'a>(&'a self, address: &'a str) -> BoxFuture<'a, Result<Amount, PaymentError>> {
        async move {
            let response = self
                .client
                .get(self.balance_url(address)?)
                .send()
                .await
                .map_err(transport)?;
            let body: BalanceResponse = Self::read_json(response, PaymentError::Rejected).await?;
            body.balance
                .parse::<Amount>()
                .map_err(|e| PaymentError::Malformed(e.to_string()))
        }
        .boxed()
    }

    fn pay<'a>(
        &'a self,
        request: &'a PaymentRequest,
    ) -> BoxFuture<'a, Result<SignedTransaction, PaymentError>> {
        async move {
            let body = PaymentBody {
                sender: &request.sender,
                recipient: &request.recipient,
                amount: request.amount.to_string(),
                network: &self.network,
                rpc_url: &self.rpc_url,
            };
            let response = self
                .client
                .post(self.url("/payments"))
                .json(&body)
                .send()
                .await
                .map_err(transport)?;
            let signed: PaymentResponse = Self::read_json(response, PaymentError::Rejected).await?;
            Ok(SignedTransaction(signed.signed_transaction))
        }
        .boxed()
    }

    fn broadcast<'a>(
        &'a self,
        transaction: &'a SignedTransaction,
    ) -> BoxFuture<'a, Result<BroadcastResult, PaymentError>> {
        async move {
            let body = BroadcastBody {
                signed_transaction: &transaction.0,
                network: &self.network,
                rpc_url: &self.rpc_url,
            };
            let response = self
                .client
                .post(self.url("/transactions"))
                .json(&body)
                .send()
                .await
                .map_err(transport)?;
            Self::read_json(response, PaymentError::BroadcastFailed).await
        }
        .boxed()
    }
}
