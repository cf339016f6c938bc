//! Persistence layer: PostgreSQL append-only event log.
//!
//! [`PostgresPersistence`] stores serialized [`crate::domain::PoolEvent`]s
//! in the `events` table. The recorder task subscribes to the event bus
//! and appends every state change; the history endpoint reads them back.

pub mod models;
pub mod postgres;
pub mod recorder;

pub use models::StoredEvent;
pub use postgres::PostgresPersistence;
pub use recorder::spawn_event_recorder;
