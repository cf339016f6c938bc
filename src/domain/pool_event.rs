//! Domain events reflecting pool state mutations.
//!
//! Every state change emits a [`PoolEvent`] through the [`super::EventBus`].
//! Events are broadcast to WebSocket subscribers and optionally persisted
//! to the PostgreSQL event log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Amount, Notification, ParticipantId, PoolId, PoolStatus};

/// Domain event emitted after every state mutation or operation outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PoolEvent {
    /// Emitted when a pool is seeded into the registry.
    PoolCreated {
        /// Pool identifier.
        pool_id: PoolId,
        /// Display name.
        name: String,
        /// Seats per round.
        capacity: usize,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a paid participant takes a seat.
    ParticipantJoined {
        /// Pool identifier.
        pool_id: PoolId,
        /// Round the seat belongs to.
        round: u64,
        /// Wallet that paid the stake.
        participant: ParticipantId,
        /// 1-based seat number.
        seat: usize,
        /// Occupied seats after the join.
        entries: usize,
        /// Status after the join.
        status: PoolStatus,
        /// Hash of the stake payment.
        transaction_hash: Option<String>,
        /// Join timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a join clears a decided round and starts a new one.
    RoundRearmed {
        /// Pool identifier.
        pool_id: PoolId,
        /// Number of the new round.
        round: u64,
        /// Winner of the round that was cleared.
        previous_winner: ParticipantId,
        /// Timestamp of the re-arm.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a winner is drawn.
    WinnerSelected {
        /// Pool identifier.
        pool_id: PoolId,
        /// Round that was decided.
        round: u64,
        /// Drawn participant.
        winner: ParticipantId,
        /// Draw timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a storefront listing is paid for.
    PurchaseCompleted {
        /// Listing identifier.
        listing_id: String,
        /// Paying wallet.
        buyer: ParticipantId,
        /// Price paid.
        amount: Amount,
        /// Hash of the payment.
        transaction_hash: Option<String>,
        /// Purchase timestamp.
        timestamp: DateTime<Utc>,
    },

    /// User-facing outcome message.
    Notification(Notification),
}

impl PoolEvent {
    /// Returns the pool ID associated with this event, if any.
    #[must_use]
    pub fn pool_id(&self) -> Option<&PoolId> {
        match self {
            Self::PoolCreated { pool_id, .. }
            | Self::ParticipantJoined { pool_id, .. }
            | Self::RoundRearmed { pool_id, .. }
            | Self::WinnerSelected { pool_id, .. } => Some(pool_id),
            Self::PurchaseCompleted { .. } => None,
            Self::Notification(notice) => notice.pool_id.as_ref(),
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::PoolCreated { .. } => "pool_created",
            Self::ParticipantJoined { .. } => "participant_joined",
            Self::RoundRearmed { .. } => "round_rearmed",
            Self::WinnerSelected { .. } => "winner_selected",
            Self::PurchaseCompleted { .. } => "purchase_completed",
            Self::Notification(_) => "notification",
        }
    }

    /// Returns `true` for events that record a state change worth
    /// persisting (everything except notifications).
    #[must_use]
    pub const fn is_state_change(&self) -> bool {
        !matches!(self, Self::Notification(_))
    }
}
