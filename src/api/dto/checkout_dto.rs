//! Storefront DTOs: listings and purchases.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Listing;
use crate::service::PurchaseReceipt;

/// Public view of a listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListingDto {
    /// Listing key.
    pub listing_id: String,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Price as a decimal string.
    pub price: String,
    /// Address receiving the payment.
    pub recipient: String,
}

impl From<&Listing> for ListingDto {
    fn from(listing: &Listing) -> Self {
        Self {
            listing_id: listing.id.clone(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: listing.price.to_string(),
            recipient: listing.recipient.clone(),
        }
    }
}

/// Response body for a successful `POST /listings/{id}/purchase`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseResponse {
    /// Listing bought.
    pub listing_id: String,
    /// Paying wallet.
    pub buyer: String,
    /// Amount paid, as a decimal string.
    pub amount: String,
    /// Hash of the payment.
    pub transaction_hash: Option<String>,
    /// Notification text.
    pub message: String,
}

impl From<PurchaseReceipt> for PurchaseResponse {
    fn from(receipt: PurchaseReceipt) -> Self {
        let message = format!(
            "Purchase successful! {} is yours. Transaction: {}",
            receipt.listing.title,
            receipt.transaction_hash.as_deref().unwrap_or("pending")
        );
        Self {
            listing_id: receipt.listing.id,
            buyer: receipt.buyer.to_string(),
            amount: receipt.listing.price.to_string(),
            transaction_hash: receipt.transaction_hash,
            message,
        }
    }
}
