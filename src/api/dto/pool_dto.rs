//! Pool-related DTOs: pool views, join, winner selection and summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::{Pool, PoolStatus, PoolSummary};
use crate::service::{JoinReceipt, WinnerReceipt};

/// Public view of a pool. Participant addresses are shortened.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PoolDto {
    /// Pool slug.
    pub pool_id: String,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Address receiving the stakes.
    pub recipient: String,
    /// Seats per round.
    pub capacity: usize,
    /// Occupied seats.
    pub entries: usize,
    /// Seats still open to new joins.
    pub open_seats: usize,
    /// Current round (1-based).
    pub round: u64,
    /// Fill/winner status label.
    pub status: PoolStatus,
    /// Participants in join order, shortened for display.
    pub participants: Vec<String>,
    /// Winner of the current round, shortened for display.
    pub last_winner: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Pool> for PoolDto {
    fn from(pool: &Pool) -> Self {
        Self {
            pool_id: pool.id().to_string(),
            name: pool.name().to_string(),
            description: pool.description().to_string(),
            recipient: pool.recipient().to_string(),
            capacity: pool.capacity(),
            entries: pool.entries(),
            open_seats: pool.open_seats(),
            round: pool.round(),
            status: pool.status(),
            participants: pool
                .participants()
                .iter()
                .map(|p| p.shortened())
                .collect(),
            last_winner: pool.last_winner().map(|w| w.shortened()),
            created_at: pool.created_at(),
            updated_at: pool.last_modified_at(),
        }
    }
}

/// Paginated list response for `GET /pools`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolListResponse {
    /// Pools on this page.
    pub data: Vec<PoolDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Response body for a successful `POST /pools/{id}/join`.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinPoolResponse {
    /// Pool joined.
    pub pool_id: String,
    /// Paying wallet (full address).
    pub participant: String,
    /// Round the seat belongs to.
    pub round: u64,
    /// 1-based seat number.
    pub seat: usize,
    /// Occupied seats after the join.
    pub entries: usize,
    /// Seats per round.
    pub capacity: usize,
    /// Status after the join.
    pub status: PoolStatus,
    /// Stake paid, as a decimal string.
    pub stake: String,
    /// Hash of the stake payment.
    pub transaction_hash: Option<String>,
    /// Notification text.
    pub message: String,
}

impl From<JoinReceipt> for JoinPoolResponse {
    fn from(receipt: JoinReceipt) -> Self {
        Self {
            pool_id: receipt.pool_id.to_string(),
            participant: receipt.participant.to_string(),
            round: receipt.round,
            seat: receipt.seat,
            entries: receipt.entries,
            capacity: receipt.capacity,
            status: receipt.status,
            stake: receipt.stake.to_string(),
            transaction_hash: receipt.transaction_hash,
            message: "Payment successful! You secured a seat in the pool!".to_string(),
        }
    }
}

/// Response body for `POST /pools/{id}/winner`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SelectWinnerResponse {
    /// Pool drawn.
    pub pool_id: String,
    /// Round decided.
    pub round: u64,
    /// Winner (full address).
    pub winner: String,
    /// Winner, shortened for display.
    pub winner_display: String,
    /// Always `Winner Selected`.
    pub status: PoolStatus,
    /// Notification text.
    pub message: String,
}

impl From<WinnerReceipt> for SelectWinnerResponse {
    fn from(receipt: WinnerReceipt) -> Self {
        let display = receipt.winner.shortened();
        Self {
            pool_id: receipt.pool_id.to_string(),
            round: receipt.round,
            winner: receipt.winner.to_string(),
            message: format!("Winner selected: {display}. Time to brew!"),
            winner_display: display,
            status: PoolStatus::WinnerSelected,
        }
    }
}

/// Response body for `GET /summary`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryDto {
    /// Pools with at least one free seat.
    pub active_pools: usize,
    /// Pools whose current round has a winner.
    pub completed_rounds: usize,
    /// Total stake held in pools, as a decimal string.
    pub total_staked: String,
    /// Stake per seat, as a decimal string.
    pub stake: String,
}

impl SummaryDto {
    /// Builds the DTO from a computed summary and the configured stake.
    #[must_use]
    pub fn new(summary: PoolSummary, stake: crate::domain::Amount) -> Self {
        Self {
            active_pools: summary.active_pools,
            completed_rounds: summary.completed_rounds,
            total_staked: summary.total_staked.to_string(),
            stake: stake.to_string(),
        }
    }
}

/// One persisted pool event.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryEventDto {
    /// Sequence number in the event log.
    pub id: i64,
    /// Event discriminator (e.g. `participant_joined`).
    pub event_type: String,
    /// Full event payload.
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

/// Query parameters for `GET /pools/{id}/history`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryParams {
    /// Maximum number of events (1–500). Defaults to 50.
    #[serde(default = "default_history_limit")]
    pub limit: u32,
}

fn default_history_limit() -> u32 {
    50
}

impl HistoryParams {
    /// Returns the limit clamped to `1..=500`.
    #[must_use]
    pub fn clamped_limit(&self) -> i64 {
        i64::from(self.limit.clamp(1, 500))
    }
}

/// Response body for `GET /pools/{id}/history`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    /// Pool the history belongs to.
    pub pool_id: String,
    /// Events, most recent first.
    pub events: Vec<HistoryEventDto>,
}
