//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Pagination query parameters for `GET /pools`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Optional status filter (`Filling`, `Almost Full`, `ready_to_spin`, …).
    #[serde(default)]
    pub status: Option<String>,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

/// Body of join and purchase requests.
///
/// When `wallet` is omitted the wallet attached to the payment gateway is
/// used.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct WalletRequest {
    /// Paying wallet address.
    #[serde(default)]
    pub wallet: Option<String>,
}

/// Returned with `202 Accepted` when the caller already has an operation
/// in flight.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SkippedResponse {
    /// Always `skipped`.
    pub status: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl SkippedResponse {
    /// Builds the response for a busy wallet.
    #[must_use]
    pub fn busy(wallet: &str) -> Self {
        Self {
            status: "skipped",
            message: format!("an operation for {wallet} is already in progress"),
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `page` to at least 1 and `per_page` to `1..=100`.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
            status: self.status.clone(),
        }
    }

    /// Computes the metadata for `total` items and the slice bounds
    /// `(skip, take)` of the requested page.
    #[must_use]
    pub fn paginate(&self, total: usize) -> (PaginationMeta, usize, usize) {
        let total = u32::try_from(total).unwrap_or(u32::MAX);
        let total_pages = if total == 0 {
            0
        } else {
            total.div_ceil(self.per_page)
        };
        let skip = (self.page.saturating_sub(1) as usize).saturating_mul(self.per_page as usize);
        let meta = PaginationMeta {
            page: self.page,
            per_page: self.per_page,
            total,
            total_pages,
        };
        (meta, skip, self.per_page as usize)
    }
}
