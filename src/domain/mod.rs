//! Domain layer: pools, participants, amounts, and the event system.
//!
//! This module contains the server-side domain model: the [`Pool`]
//! aggregate and its round state machine, the registry that stores pools
//! behind per-pool locks, the event bus for broadcasting state changes,
//! and the seams the lottery engine depends on (random source, in-flight
//! gate).

pub mod amount;
pub mod catalog;
pub mod event_bus;
pub mod in_flight;
pub mod listing;
pub mod notification;
pub mod participant;
pub mod pool;
pub mod pool_event;
pub mod pool_id;
pub mod pool_registry;
pub mod randomness;

pub use amount::Amount;
pub use event_bus::EventBus;
pub use in_flight::{InFlightGate, InFlightGuard};
pub use listing::Listing;
pub use notification::{NoticeLevel, Notification};
pub use participant::ParticipantId;
pub use pool::{Admission, Pool, PoolStatus};
pub use pool_event::PoolEvent;
pub use pool_id::PoolId;
pub use pool_registry::{PoolRegistry, PoolSummary};
pub use randomness::{RandomSource, SeededRandom, ThreadRandom};
