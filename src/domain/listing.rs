//! Storefront listing sold for a fixed price.

use serde::Serialize;

use super::Amount;

/// An item that can be bought outright with a single payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    /// Stable key (e.g. `dream-mountain-villa`).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Full purchase price.
    pub price: Amount,
    /// Address that receives the payment.
    pub recipient: String,
}
