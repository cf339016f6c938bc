//! Lottery pool aggregate: capacity-bounded admission and winner draws.
//!
//! A [`Pool`] is one prize drum. Participants pay a fixed stake to take a
//! seat; once every seat is taken a winner can be drawn. The first join
//! after a draw starts a fresh round.
//!
//! `participants`, `entries` and `status` are private and only change
//! through [`Pool::refresh`], which recomputes every derived field at once.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{ParticipantId, PoolId, RandomSource};
use crate::error::LotteryError;

/// Display label derived from a pool's fill level and winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub enum PoolStatus {
    /// Seats available, not yet one away from capacity.
    #[serde(rename = "Filling")]
    Filling,
    /// Exactly one seat left.
    #[serde(rename = "Almost Full")]
    AlmostFull,
    /// Every seat taken; a winner can be drawn.
    #[serde(rename = "Ready to Spin")]
    ReadyToSpin,
    /// A winner has been drawn for the current round.
    #[serde(rename = "Winner Selected")]
    WinnerSelected,
}

impl PoolStatus {
    /// Returns the display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Filling => "Filling",
            Self::AlmostFull => "Almost Full",
            Self::ReadyToSpin => "Ready to Spin",
            Self::WinnerSelected => "Winner Selected",
        }
    }

    /// Parses a display label or its snake-case form (`ready_to_spin`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], " ").as_str() {
            "filling" => Some(Self::Filling),
            "almost full" => Some(Self::AlmostFull),
            "ready to spin" => Some(Self::ReadyToSpin),
            "winner selected" => Some(Self::WinnerSelected),
            _ => None,
        }
    }
}

/// Result of a successful admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// 1-based seat number of the admitted participant.
    pub seat: usize,
    /// Round the participant was admitted to.
    pub round: u64,
    /// Winner of the previous round when this admission re-armed the pool.
    pub rearmed_from: Option<ParticipantId>,
}

/// One lottery pool and its current round.
#[derive(Debug, Clone, Serialize)]
pub struct Pool {
    id: PoolId,
    name: String,
    description: String,
    recipient: String,
    capacity: usize,
    participants: Vec<ParticipantId>,
    entries: usize,
    last_winner: Option<ParticipantId>,
    status: PoolStatus,
    round: u64,
    #[serde(skip)]
    reserved_seats: usize,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
}

impl Pool {
    /// Creates an empty pool at round 1.
    ///
    /// # Errors
    ///
    /// Returns [`LotteryError::InvalidRequest`] if `capacity` is zero or
    /// `recipient` is blank.
    pub fn new(
        id: PoolId,
        name: impl Into<String>,
        description: impl Into<String>,
        recipient: impl Into<String>,
        capacity: usize,
    ) -> Result<Self, LotteryError> {
        let recipient = recipient.into();
        if capacity == 0 {
            return Err(LotteryError::InvalidRequest(format!(
                "pool {id} must have a positive capacity"
            )));
        }
        if recipient.trim().is_empty() {
            return Err(LotteryError::InvalidRequest(format!(
                "pool {id} must have a payment recipient"
            )));
        }
        let now = Utc::now();
        let mut pool = Self {
            id,
            name: name.into(),
            description: description.into(),
            recipient,
            capacity,
            participants: Vec::with_capacity(capacity),
            entries: 0,
            last_winner: None,
            status: PoolStatus::Filling,
            round: 1,
            reserved_seats: 0,
            created_at: now,
            last_modified_at: now,
        };
        pool.refresh();
        Ok(pool)
    }

    /// Pool identifier.
    #[must_use]
    pub fn id(&self) -> &PoolId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Address that receives stake payments.
    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Maximum participants per round.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Participants of the current round in join order.
    #[must_use]
    pub fn participants(&self) -> &[ParticipantId] {
        &self.participants
    }

    /// Number of occupied seats.
    #[must_use]
    pub const fn entries(&self) -> usize {
        self.entries
    }

    /// Winner of the current round, if drawn.
    #[must_use]
    pub const fn last_winner(&self) -> Option<&ParticipantId> {
        self.last_winner.as_ref()
    }

    /// Derived display status.
    #[must_use]
    pub const fn status(&self) -> PoolStatus {
        self.status
    }

    /// Current round number, starting at 1.
    #[must_use]
    pub const fn round(&self) -> u64 {
        self.round
    }

    /// Seats currently held by joins whose payment is in flight.
    #[must_use]
    pub const fn reserved_seats(&self) -> usize {
        self.reserved_seats
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Timestamp of the last state change.
    #[must_use]
    pub const fn last_modified_at(&self) -> DateTime<Utc> {
        self.last_modified_at
    }

    /// Returns `true` when every seat of the current round is taken.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.entries >= self.capacity
    }

    /// Returns `true` when a winner has been drawn for the current round.
    #[must_use]
    pub const fn is_decided(&self) -> bool {
        self.last_winner.is_some()
    }

    /// Returns `true` when the pool accepts new entries (round not full,
    /// or decided and waiting to be re-armed).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.entries < self.capacity
    }

    /// Seats a new join could still claim.
    ///
    /// A decided pool offers its full capacity: the next admission starts a
    /// new round.
    #[must_use]
    pub fn open_seats(&self) -> usize {
        let free = if self.is_decided() {
            self.capacity
        } else {
            self.capacity.saturating_sub(self.participants.len())
        };
        free.saturating_sub(self.reserved_seats)
    }

    /// Holds one open seat while the caller's stake payment is in flight.
    ///
    /// # Errors
    ///
    /// Returns [`LotteryError::PoolFull`] if no seat is open.
    pub fn reserve_seat(&mut self) -> Result<(), LotteryError> {
        if self.open_seats() == 0 {
            return Err(LotteryError::PoolFull(self.id.clone()));
        }
        self.reserved_seats += 1;
        Ok(())
    }

    /// Gives back a seat reserved by [`Pool::reserve_seat`].
    pub fn release_seat(&mut self) {
        self.reserved_seats = self.reserved_seats.saturating_sub(1);
    }

    /// Seats `participant`, re-arming the pool first if its round is decided.
    ///
    /// Does not touch reservations; callers holding one release it first.
    ///
    /// # Errors
    ///
    /// Returns [`LotteryError::PoolFull`] if the round has no free seat.
    pub fn admit(&mut self, participant: ParticipantId) -> Result<Admission, LotteryError> {
        let rearmed_from = if self.is_decided() {
            self.participants.clear();
            self.round += 1;
            self.last_winner.take()
        } else {
            None
        };

        if self.participants.len() >= self.capacity {
            return Err(LotteryError::PoolFull(self.id.clone()));
        }
        self.participants.push(participant);
        self.refresh();

        Ok(Admission {
            seat: self.participants.len(),
            round: self.round,
            rearmed_from,
        })
    }

    /// Draws the round's winner uniformly from the seated participants.
    ///
    /// # Errors
    ///
    /// - [`LotteryError::RoundAlreadyDecided`] if a winner is already set.
    /// - [`LotteryError::PoolNotFull`] if capacity has not been reached.
    pub fn draw_winner(&mut self, rng: &dyn RandomSource) -> Result<ParticipantId, LotteryError> {
        if self.is_decided() {
            return Err(LotteryError::RoundAlreadyDecided(self.id.clone()));
        }
        if !self.is_full() {
            return Err(LotteryError::PoolNotFull {
                pool_id: self.id.clone(),
                entries: self.entries,
                capacity: self.capacity,
            });
        }

        let index = rng.next_below(self.participants.len());
        let winner = self
            .participants
            .get(index)
            .cloned()
            .ok_or_else(|| {
                LotteryError::Unexpected(format!(
                    "random source returned index {index} for {} participants",
                    self.participants.len()
                ))
            })?;

        self.last_winner = Some(winner.clone());
        self.refresh();
        Ok(winner)
    }

    /// Recomputes `entries` and `status` from `participants` and
    /// `last_winner`.
    fn refresh(&mut self) {
        self.participants.truncate(self.capacity);
        self.entries = self.participants.len().min(self.capacity);
        self.status = if self.last_winner.is_some() {
            PoolStatus::WinnerSelected
        } else if self.entries >= self.capacity {
            PoolStatus::ReadyToSpin
        } else if self.entries + 1 == self.capacity {
            PoolStatus::AlmostFull
        } else {
            PoolStatus::Filling
        };
        self.last_modified_at = Utc::now();
    }
}
