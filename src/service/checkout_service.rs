//! Checkout service: single-payment purchases of storefront listings.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::{EventBus, InFlightGate, Listing, Notification, ParticipantId, PoolEvent};
use crate::error::LotteryError;
use crate::payment::{PaymentGateway, collect_payment};

/// Completed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    /// Listing bought.
    pub listing: Listing,
    /// Paying wallet.
    pub buyer: ParticipantId,
    /// Hash of the payment.
    pub transaction_hash: Option<String>,
}

/// Outcome of [`CheckoutService::purchase`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// The buyer paid the full price.
    Purchased(PurchaseReceipt),
    /// The buyer already had an operation in flight; nothing happened.
    Skipped,
}

/// Sells fixed-price listings through the shared [`PaymentGateway`].
///
/// Shares the [`InFlightGate`] with the pool service, so a wallet cannot
/// buy while one of its joins is still paying.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    listings: BTreeMap<String, Listing>,
    event_bus: EventBus,
    gateway: Arc<dyn PaymentGateway>,
    gate: Arc<InFlightGate>,
}

impl CheckoutService {
    /// Creates a checkout over `listings`.
    #[must_use]
    pub fn new(
        listings: Vec<Listing>,
        event_bus: EventBus,
        gateway: Arc<dyn PaymentGateway>,
        gate: Arc<InFlightGate>,
    ) -> Self {
        let listings = listings
            .into_iter()
            .map(|listing| (listing.id.clone(), listing))
            .collect();
        Self {
            listings,
            event_bus,
            gateway,
            gate,
        }
    }

    /// Returns every listing ordered by ID.
    #[must_use]
    pub fn listings(&self) -> Vec<Listing> {
        self.listings.values().cloned().collect()
    }

    /// Looks up one listing.
    ///
    /// # Errors
    ///
    /// Returns [`LotteryError::ListingNotFound`] for an unknown ID.
    pub fn listing(&self, listing_id: &str) -> Result<&Listing, LotteryError> {
        self.listings
            .get(listing_id)
            .ok_or_else(|| LotteryError::ListingNotFound(listing_id.to_string()))
    }

    /// Pays the full price of `listing_id` from `buyer`.
    ///
    /// # Errors
    ///
    /// - [`LotteryError::ListingNotFound`] for an unknown listing.
    /// - [`LotteryError::InsufficientFunds`],
    ///   [`LotteryError::GatewayFailure`], [`LotteryError::Unexpected`]
    ///   from the payment.
    pub async fn purchase(
        &self,
        listing_id: &str,
        buyer: ParticipantId,
    ) -> Result<PurchaseOutcome, LotteryError> {
        let listing = self.listing(listing_id)?.clone();

        let Some(_guard) = self.gate.try_enter(buyer.as_str()) else {
            tracing::debug!(listing_id, %buyer, "purchase skipped: operation in flight");
            return Ok(PurchaseOutcome::Skipped);
        };

        let payment = collect_payment(
            self.gateway.as_ref(),
            &buyer,
            &listing.recipient,
            listing.price,
            "purchase this item",
        )
        .await;

        let receipt = match payment {
            Ok(receipt) => receipt,
            Err(err) => {
                self.event_bus
                    .notify(Notification::failure(None, err.to_string()));
                return Err(err);
            }
        };

        let _ = self.event_bus.publish(PoolEvent::PurchaseCompleted {
            listing_id: listing.id.clone(),
            buyer: buyer.clone(),
            amount: listing.price,
            transaction_hash: receipt.transaction_hash.clone(),
            timestamp: Utc::now(),
        });
        self.event_bus.notify(Notification::success(
            None,
            format!(
                "Purchase successful! {} is yours. Transaction: {}",
                listing.title,
                receipt.transaction_hash.as_deref().unwrap_or("pending")
            ),
        ));
        tracing::info!(listing_id, %buyer, price = %listing.price, "purchase completed");

        Ok(PurchaseOutcome::Purchased(PurchaseReceipt {
            listing,
            buyer,
            transaction_hash: receipt.transaction_hash,
        }))
    }
}
