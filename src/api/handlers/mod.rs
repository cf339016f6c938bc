//! REST endpoint handlers organized by resource.

pub mod checkout;
pub mod pool;
pub mod summary;
pub mod system;

use axum::Router;

use crate::app_state::AppState;
use crate::domain::{Notification, ParticipantId, PoolId};
use crate::error::LotteryError;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(pool::routes())
        .merge(summary::routes())
        .merge(checkout::routes())
}

/// Uses the wallet named in the request, or asks the payment gateway for
/// the attached one.
/// Failures are announced on the bus like a failed join or purchase.
async fn resolve_wallet(
    state: &AppState,
    wallet: Option<String>,
    pool_id: Option<&PoolId>,
) -> Result<ParticipantId, LotteryError> {
    let resolved = match wallet {
        Some(address) => ParticipantId::new(address),
        None => state.pool_service.discover_wallet().await,
    };
    if let Err(err) = &resolved {
        state
            .event_bus
            .notify(Notification::failure(pool_id.cloned(), err.to_string()));
    }
    resolved
}
