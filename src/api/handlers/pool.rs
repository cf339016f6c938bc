//! Pool handlers: list, get, join, winner selection, history.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use super::resolve_wallet;
use crate::api::dto::{
    HistoryEventDto, HistoryParams, HistoryResponse, JoinPoolResponse, PaginationParams, PoolDto,
    PoolListResponse, SelectWinnerResponse, SkippedResponse, WalletRequest,
};
use crate::app_state::AppState;
use crate::domain::{PoolId, PoolStatus};
use crate::error::{ErrorResponse, LotteryError};
use crate::service::JoinOutcome;

/// Parses a path segment into a [`PoolId`]. A malformed slug cannot name
/// an existing pool, so it is reported as not found.
fn parse_pool_id(raw: String) -> Result<PoolId, LotteryError> {
    PoolId::new(raw.as_str()).map_err(|_| LotteryError::PoolNotFound(raw))
}

/// `GET /pools` — List pools with pagination and optional status filter.
///
/// # Errors
///
/// Returns [`LotteryError::InvalidRequest`] for an unknown status label.
#[utoipa::path(
    get,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "List pools",
    description = "Returns a paginated list of all pools ordered by ID, optionally filtered by status label.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated pool list", body = PoolListResponse),
        (status = 400, description = "Unknown status filter", body = ErrorResponse),
    )
)]
pub async fn list_pools(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PoolListResponse>, LotteryError> {
    let params = params.clamped();
    let status_filter = params
        .status
        .as_deref()
        .map(|raw| {
            PoolStatus::parse(raw)
                .ok_or_else(|| LotteryError::InvalidRequest(format!("unknown pool status: {raw}")))
        })
        .transpose()?;

    let pools = state.pool_service.list_pools(status_filter).await;
    let (pagination, skip, take) = params.paginate(pools.len());
    let data = pools.iter().skip(skip).take(take).map(PoolDto::from).collect();

    Ok(Json(PoolListResponse { data, pagination }))
}

/// `GET /pools/{id}` — Get pool details.
///
/// # Errors
///
/// Returns [`LotteryError::PoolNotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}",
    tag = "Pools",
    summary = "Get pool details",
    description = "Returns the pool's seats, status, round and shortened participant list.",
    params(
        ("id" = String, Path, description = "Pool slug (e.g. `monsoon`)"),
    ),
    responses(
        (status = 200, description = "Pool details", body = PoolDto),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn get_pool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PoolDto>, LotteryError> {
    let pool_id = parse_pool_id(id)?;
    let pool = state.pool_service.get_pool(&pool_id).await?;
    Ok(Json(PoolDto::from(&pool)))
}

/// `POST /pools/{id}/join` — Pay the stake and take a seat.
///
/// The payment runs on its own task, so a client disconnect does not
/// abandon a broadcast halfway.
///
/// # Errors
///
/// Returns the [`LotteryError`] of the failed join (not found, full,
/// insufficient funds, gateway failure).
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/join",
    tag = "Pools",
    summary = "Join a pool",
    description = "Checks the wallet's PYUSD balance, pays the stake to the pool recipient and appends the wallet as a participant. Without `wallet` the gateway's attached wallet is used.",
    params(
        ("id" = String, Path, description = "Pool slug"),
    ),
    request_body(content = WalletRequest, description = "Paying wallet (optional)"),
    responses(
        (status = 200, description = "Seat secured", body = JoinPoolResponse),
        (status = 202, description = "Another operation for this wallet is in flight; nothing done", body = SkippedResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Pool full", body = ErrorResponse),
        (status = 422, description = "Insufficient PYUSD balance", body = ErrorResponse),
        (status = 502, description = "Payment rejected or broadcast failed", body = ErrorResponse),
    )
)]
pub async fn join_pool(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<WalletRequest>>,
) -> Result<Response, LotteryError> {
    let pool_id = parse_pool_id(id)?;
    let request = body.map(|Json(req)| req).unwrap_or_default();
    let participant = resolve_wallet(&state, request.wallet, Some(&pool_id)).await?;

    let service = Arc::clone(&state.pool_service);
    let wallet = participant.to_string();
    let outcome = tokio::spawn(async move { service.join_pool(&pool_id, participant).await })
        .await
        .map_err(|e| LotteryError::Unexpected(format!("join task failed: {e}")))??;

    Ok(match outcome {
        JoinOutcome::Joined(receipt) => {
            (StatusCode::OK, Json(JoinPoolResponse::from(receipt))).into_response()
        }
        JoinOutcome::Skipped => {
            (StatusCode::ACCEPTED, Json(SkippedResponse::busy(&wallet))).into_response()
        }
    })
}

/// `POST /pools/{id}/winner` — Draw the winner of a full pool.
///
/// # Errors
///
/// Returns [`LotteryError::PoolNotFull`] or
/// [`LotteryError::RoundAlreadyDecided`] when a draw is not allowed.
#[utoipa::path(
    post,
    path = "/api/v1/pools/{id}/winner",
    tag = "Pools",
    summary = "Select the winner",
    description = "Draws one participant uniformly at random. Allowed once per full round.",
    params(
        ("id" = String, Path, description = "Pool slug"),
    ),
    responses(
        (status = 200, description = "Winner drawn", body = SelectWinnerResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 409, description = "Pool not full or round already decided", body = ErrorResponse),
    )
)]
pub async fn select_winner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SelectWinnerResponse>, LotteryError> {
    let pool_id = parse_pool_id(id)?;
    let receipt = state.pool_service.select_winner(&pool_id).await?;
    Ok(Json(SelectWinnerResponse::from(receipt)))
}

/// `GET /pools/{id}/history` — Persisted events of a pool.
///
/// # Errors
///
/// Returns [`LotteryError::PersistenceUnavailable`] when the event log is
/// disabled.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{id}/history",
    tag = "Pools",
    summary = "Pool event history",
    description = "Returns the most recent persisted state events of the pool, newest first.",
    params(
        ("id" = String, Path, description = "Pool slug"),
        HistoryParams,
    ),
    responses(
        (status = 200, description = "Event history", body = HistoryResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 503, description = "Persistence disabled", body = ErrorResponse),
    )
)]
pub async fn pool_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, LotteryError> {
    let pool_id = parse_pool_id(id)?;
    let persistence = state
        .persistence
        .as_ref()
        .ok_or(LotteryError::PersistenceUnavailable)?;
    state.pool_service.get_pool(&pool_id).await?;

    let events = persistence
        .load_events(pool_id.as_str(), params.clamped_limit())
        .await?
        .into_iter()
        .map(|e| HistoryEventDto {
            id: e.id,
            event_type: e.event_type,
            payload: e.payload,
            created_at: e.created_at,
        })
        .collect();

    Ok(Json(HistoryResponse {
        pool_id: pool_id.to_string(),
        events,
    }))
}

/// Pool routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools", get(list_pools))
        .route("/pools/{id}", get(get_pool))
        .route("/pools/{id}/join", post(join_pool))
        .route("/pools/{id}/winner", post(select_winner))
        .route("/pools/{id}/history", get(pool_history))
}
