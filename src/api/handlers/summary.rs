//! Cross-pool summary handler.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::SummaryDto;
use crate::app_state::AppState;

/// `GET /summary` — Active pools, completed rounds and total stake.
#[utoipa::path(
    get,
    path = "/api/v1/summary",
    tag = "Pools",
    summary = "Pool summary",
    description = "Recomputed on every request: pools with open seats, pools whose round has a winner, and the PYUSD held across all seats.",
    responses(
        (status = 200, description = "Summary", body = SummaryDto),
    )
)]
pub async fn get_summary(State(state): State<AppState>) -> Json<SummaryDto> {
    let summary = state.pool_service.summary().await;
    Json(SummaryDto::new(summary, state.pool_service.stake()))
}

/// Summary routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/summary", get(get_summary))
}
