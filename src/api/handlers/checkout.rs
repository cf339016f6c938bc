//! Storefront handlers: listings and purchase.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use super::resolve_wallet;
use crate::api::dto::{ListingDto, PurchaseResponse, SkippedResponse, WalletRequest};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, LotteryError};
use crate::service::PurchaseOutcome;

/// `GET /listings` — Storefront catalog.
#[utoipa::path(
    get,
    path = "/api/v1/listings",
    tag = "Storefront",
    summary = "List storefront items",
    description = "Returns every item that can be bought outright.",
    responses(
        (status = 200, description = "Listings", body = Vec<ListingDto>),
    )
)]
pub async fn list_listings(State(state): State<AppState>) -> Json<Vec<ListingDto>> {
    Json(
        state
            .checkout_service
            .listings()
            .iter()
            .map(ListingDto::from)
            .collect(),
    )
}

/// `POST /listings/{id}/purchase` — Buy an item for its full price.
///
/// # Errors
///
/// Returns the [`LotteryError`] of the failed purchase.
#[utoipa::path(
    post,
    path = "/api/v1/listings/{id}/purchase",
    tag = "Storefront",
    summary = "Purchase an item",
    description = "Checks the wallet's PYUSD balance against the price, pays the listing recipient and broadcasts the transaction.",
    params(
        ("id" = String, Path, description = "Listing key (e.g. `dream-mountain-villa`)"),
    ),
    request_body(content = WalletRequest, description = "Paying wallet (optional)"),
    responses(
        (status = 200, description = "Purchase completed", body = PurchaseResponse),
        (status = 202, description = "Another operation for this wallet is in flight; nothing done", body = SkippedResponse),
        (status = 404, description = "Listing not found", body = ErrorResponse),
        (status = 422, description = "Insufficient PYUSD balance", body = ErrorResponse),
        (status = 502, description = "Payment rejected or broadcast failed", body = ErrorResponse),
    )
)]
pub async fn purchase(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<WalletRequest>>,
) -> Result<Response, LotteryError> {
    state.checkout_service.listing(&id)?;
    let request = body.map(|Json(req)| req).unwrap_or_default();
    let buyer = resolve_wallet(&state, request.wallet, None).await?;

    let service = Arc::clone(&state.checkout_service);
    let wallet = buyer.to_string();
    let outcome = tokio::spawn(async move { service.purchase(&id, buyer).await })
        .await
        .map_err(|e| LotteryError::Unexpected(format!("purchase task failed: {e}")))??;

    Ok(match outcome {
        PurchaseOutcome::Purchased(receipt) => {
            (StatusCode::OK, Json(PurchaseResponse::from(receipt))).into_response()
        }
        PurchaseOutcome::Skipped => {
            (StatusCode::ACCEPTED, Json(SkippedResponse::busy(&wallet))).into_response()
        }
    })
}

/// Storefront routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/listings", get(list_listings))
        .route("/listings/{id}/purchase", post(purchase))
}
