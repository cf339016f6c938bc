//! System endpoints: health check and stake configuration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    persistence: bool,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp and whether the event log is enabled.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            persistence: state.persistence.is_some(),
        }),
    )
}

/// Stake settings shown before joining.
#[derive(Debug, Serialize, ToSchema)]
pub struct StakeConfig {
    token: &'static str,
    decimals: u32,
    stake: String,
}

/// `GET /config/stake` — Stake required to join a pool.
#[utoipa::path(
    get,
    path = "/config/stake",
    tag = "System",
    summary = "Stake configuration",
    description = "Returns the stablecoin used for payments and the stake per seat.",
    responses(
        (status = 200, description = "Stake configuration", body = StakeConfig),
    )
)]
pub async fn stake_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(StakeConfig {
            token: "PYUSD",
            decimals: crate::domain::amount::DECIMALS,
            stake: state.pool_service.stake().to_string(),
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/stake", get(stake_handler))
}
