//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use anyhow::Context;

use crate::config::{PaymentMode, ServerConfig};
use crate::domain::{
    EventBus, InFlightGate, PoolRegistry, RandomSource, SeededRandom, ThreadRandom, catalog,
};
use crate::payment::{HttpPaymentGateway, PaymentGateway, SimulatedPaymentGateway};
use crate::persistence::{PostgresPersistence, spawn_event_recorder};
use crate::service::{CheckoutService, PoolService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Pool service for all lottery logic.
    pub pool_service: Arc<PoolService>,
    /// Storefront checkout.
    pub checkout_service: Arc<CheckoutService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Event log, when persistence is enabled.
    pub persistence: Option<PostgresPersistence>,
}

impl AppState {
    /// Wires the services described by `config` and seeds the default
    /// pools and listings.
    ///
    /// When persistence is enabled this connects to PostgreSQL, runs the
    /// migrations and spawns the event recorder before any pool is seeded,
    /// so the `pool_created` events are recorded too.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or a migration
    /// fails, or if the seeded catalog is invalid.
    pub async fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let gateway: Arc<dyn PaymentGateway> = match config.payment_mode {
            PaymentMode::Simulated => Arc::new(SimulatedPaymentGateway::new(
                config.simulated_wallet.clone(),
                config.simulated_balance,
            )),
            PaymentMode::Remote => Arc::new(HttpPaymentGateway::new(
                config.payment_bridge_url.clone(),
                config.payment_network.clone(),
                config.rpc_url.clone(),
            )),
        };
        let rng: Arc<dyn RandomSource> = match config.rng_seed {
            Some(seed) => Arc::new(SeededRandom::new(seed)),
            None => Arc::new(ThreadRandom),
        };

        let event_bus = EventBus::new(config.event_bus_capacity);

        let persistence = if config.persistence_enabled {
            let persistence = PostgresPersistence::connect(
                &config.database_url,
                config.database_max_connections,
                config.database_connect_timeout,
            )
            .await
            .context("connecting to the event log database")?;
            persistence
                .migrate()
                .await
                .context("migrating the event log database")?;
            spawn_event_recorder(persistence.clone(), event_bus.subscribe());
            tracing::info!("event log persistence enabled");
            Some(persistence)
        } else {
            None
        };

        let gate = Arc::new(InFlightGate::new());
        let pool_service = PoolService::new(
            Arc::new(PoolRegistry::new()),
            event_bus.clone(),
            Arc::clone(&gateway),
            rng,
            Arc::clone(&gate),
            config.stake_amount,
        );
        for pool in catalog::default_pools(&config.pool_recipient, config.pool_capacity)? {
            pool_service.create_pool(pool).await?;
        }

        let checkout_service = CheckoutService::new(
            catalog::default_listings(&config.house_recipient),
            event_bus.clone(),
            gateway,
            gate,
        );

        Ok(Self {
            pool_service: Arc::new(pool_service),
            checkout_service: Arc::new(checkout_service),
            event_bus,
            persistence,
        })
    }
}
