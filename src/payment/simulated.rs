//! In-memory payment gateway.
//!
//! Keeps a ledger of wallet balances, signs nothing and settles transfers
//! when they are broadcast. Used for the demo mode and throughout the test
//! suite; failure switches let tests exercise every gateway error path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use super::{BroadcastResult, PaymentError, PaymentGateway, PaymentRequest, SignedTransaction};
use crate::domain::Amount;

#[derive(Debug, Default)]
struct Ledger {
    balances: HashMap<String, Amount>,
    pending: HashMap<String, PaymentRequest>,
}

#[derive(Debug, Default)]
struct Faults {
    reject_payments: Option<String>,
    fail_broadcasts: Option<String>,
    unreachable: bool,
}

/// Ledger-backed [`PaymentGateway`] with no network behind it.
///
/// Wallets that have never been seen start with `starting_balance`.
#[derive(Debug)]
pub struct SimulatedPaymentGateway {
    wallet: String,
    starting_balance: Amount,
    ledger: Mutex<Ledger>,
    faults: Mutex<Faults>,
    balance_queries: AtomicUsize,
    payments: AtomicUsize,
    broadcasts: AtomicUsize,
}

impl SimulatedPaymentGateway {
    /// Creates a gateway whose attached wallet is `wallet` and where every
    /// unknown wallet starts with `starting_balance`.
    #[must_use]
    pub fn new(wallet: impl Into<String>, starting_balance: Amount) -> Self {
        Self {
            wallet: wallet.into(),
            starting_balance,
            ledger: Mutex::new(Ledger::default()),
            faults: Mutex::new(Faults::default()),
            balance_queries: AtomicUsize::new(0),
            payments: AtomicUsize::new(0),
            broadcasts: AtomicUsize::new(0),
        }
    }

    /// Overrides the balance of `address`.
    pub fn set_balance(&self, address: &str, amount: Amount) {
        self.ledger().balances.insert(address.to_string(), amount);
    }

    /// Returns the current balance of `address`.
    #[must_use]
    pub fn balance(&self, address: &str) -> Amount {
        self.balance_locked(&mut self.ledger(), address)
    }

    /// Makes [`PaymentGateway::pay`] refuse with `reason` (`None` clears).
    pub fn reject_payments_with(&self, reason: Option<String>) {
        self.faults().reject_payments = reason;
    }

    /// Makes [`PaymentGateway::broadcast`] report failure with `reason`
    /// (`None` clears).
    pub fn fail_broadcasts_with(&self, reason: Option<String>) {
        self.faults().fail_broadcasts = reason;
    }

    /// Makes every call fail as if the gateway were offline.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.faults().unreachable = unreachable;
    }

    /// Number of balance lookups served.
    #[must_use]
    pub fn balance_query_count(&self) -> usize {
        self.balance_queries.load(Ordering::SeqCst)
    }

    /// Number of payments signed.
    #[must_use]
    pub fn pay_count(&self) -> usize {
        self.payments.load(Ordering::SeqCst)
    }

    /// Number of successful broadcasts.
    #[must_use]
    pub fn broadcast_count(&self) -> usize {
        self.broadcasts.load(Ordering::SeqCst)
    }

    fn ledger(&self) -> std::sync::MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn balance_locked(&self, ledger: &mut Ledger, address: &str) -> Amount {
        *ledger
            .balances
            .entry(address.to_string())
            .or_insert(self.starting_balance)
    }

    fn check_reachable(&self) -> Result<(), PaymentError> {
        if self.faults().unreachable {
            return Err(PaymentError::Transport("simulated gateway offline".to_string()));
        }
        Ok(())
    }

    fn settle(&self, transaction: &SignedTransaction) -> Result<BroadcastResult, PaymentError> {
        self.check_reachable()?;
        if let Some(reason) = self.faults().fail_broadcasts.clone() {
            return Ok(BroadcastResult {
                success: false,
                transaction_hash: None,
                error: Some(reason),
            });
        }

        let mut ledger = self.ledger();
        let Some(request) = ledger.pending.remove(&transaction.0) else {
            return Ok(BroadcastResult {
                success: false,
                transaction_hash: None,
                error: Some("unknown or already broadcast transaction".to_string()),
            });
        };

        let sender_balance = self.balance_locked(&mut ledger, &request.sender);
        let Some(remaining) = sender_balance.checked_sub(request.amount) else {
            return Ok(BroadcastResult {
                success: false,
                transaction_hash: None,
                error: Some("insufficient funds for transfer".to_string()),
            });
        };
        ledger.balances.insert(request.sender.clone(), remaining);
        let recipient_balance = ledger
            .balances
            .get(&request.recipient)
            .copied()
            .unwrap_or(Amount::ZERO);
        ledger.balances.insert(
            request.recipient.clone(),
            recipient_balance.saturating_add(request.amount),
        );

        self.broadcasts.fetch_add(1, Ordering::SeqCst);
        Ok(BroadcastResult {
            success: true,
            transaction_hash: Some(format!("0x{}", transaction.0.trim_start_matches("sim-"))),
            error: None,
        })
    }
}

impl PaymentGateway for SimulatedPaymentGateway {
    fn wallet_address(&self) -> BoxFuture<'_, Result<String, PaymentError>> {
        async move {
            self.check_reachable()?;
            Ok(self.wallet.clone())
        }
        .boxed()
    }

    fn balance_of<'a>(&'a self, address: &'a str) -> BoxFuture<'a, Result<Amount, PaymentError>> {
        async move {
            self.check_reachable()?;
            self.balance_queries.fetch_add(1, Ordering::SeqCst);
            Ok(self.balance(address))
        }
        .boxed()
    }

    fn pay<'a>(
        &'a self,
        request: &'a PaymentRequest,
    ) -> BoxFuture<'a, Result<SignedTransaction, PaymentError>> {
        async move {
            self.check_reachable()?;
            if let Some(reason) = self.faults().reject_payments.clone() {
                return Err(PaymentError::Rejected(reason));
            }
            let id = format!("sim-{}", uuid::Uuid::new_v4().simple());
            self.ledger().pending.insert(id.clone(), request.clone());
            self.payments.fetch_add(1, Ordering::SeqCst);
            Ok(SignedTransaction(id))
        }
        .boxed()
    }

    fn broadcast<'a>(
        &'a self,
        transaction: &'a SignedTransaction,
    ) -> BoxFuture<'a, Result<BroadcastResult, PaymentError>> {
        async move { self.settle(transaction) }.boxed()
    }
}
