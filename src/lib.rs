//! # lottery-pool-gateway
//!
//! REST API and WebSocket gateway for stake-to-enter lottery pools paid in
//! PYUSD.
//!
//! Users pay a fixed stake to take a seat in a pool; once every seat is
//! taken one participant is drawn as the winner, and the next join starts
//! a fresh round. A storefront listing can be bought outright through the
//! same payment flow. Wallets, signing and broadcast belong to an external
//! payment gateway; this service is the coordination layer.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── PoolService / CheckoutService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── PoolRegistry, Pool (domain/)
//!     ├── PaymentGateway (payment/)
//!     │
//!     └── PostgreSQL event log (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod payment;
pub mod persistence;
pub mod service;
pub mod ws;
