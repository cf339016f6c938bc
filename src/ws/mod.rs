//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams pool events and notifications
//! to subscribed clients and answers `get_state` / `get_summary` queries.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
