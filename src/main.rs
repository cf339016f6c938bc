//! lottery-pool-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use tracing_subscriber::EnvFilter;

use lottery_pool_gateway::api;
use lottery_pool_gateway::app_state::AppState;
use lottery_pool_gateway::config::ServerConfig;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    init_tracing(config.log_json);
    tracing::info!(
        addr = %config.listen_addr,
        payment_mode = ?config.payment_mode,
        stake = %config.stake_amount,
        capacity = config.pool_capacity,
        "starting lottery-pool-gateway"
    );

    let app_state = AppState::from_config(&config).await?;
    let app = api::build_app(app_state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
