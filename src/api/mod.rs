//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; `/health`,
//! `/config/stake` and `/ws` live at the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::error::{ErrorBody, ErrorResponse};
use crate::ws::handler::ws_handler;

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "lottery-pool-gateway",
        description = "Stake-to-enter lottery pools and a storefront, paid in PYUSD through a payment gateway."
    ),
    paths(
        handlers::pool::list_pools,
        handlers::pool::get_pool,
        handlers::pool::join_pool,
        handlers::pool::select_winner,
        handlers::pool::pool_history,
        handlers::summary::get_summary,
        handlers::checkout::list_listings,
        handlers::checkout::purchase,
        handlers::system::health_handler,
        handlers::system::stake_handler,
    ),
    components(schemas(ErrorResponse, ErrorBody)),
    tags(
        (name = "Pools", description = "Pool membership, winner selection and summary"),
        (name = "Storefront", description = "Fixed-price listings"),
        (name = "System", description = "Health and configuration"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST, WebSocket, API docs and the
/// tracing/CORS layers, bound to `state`.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(build_router())
        .route("/ws", get(ws_handler))
        .merge(docs_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(feature = "swagger-ui")]
fn docs_routes() -> Router<AppState> {
    Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_routes() -> Router<AppState> {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    )
}
