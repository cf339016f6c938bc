//! Database models for the event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored event row from the `events` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredEvent {
    /// Auto-increment row ID.
    pub id: i64,
    /// Pool the event belongs to; `None` for storefront events.
    pub pool_id: Option<String>,
    /// Event type discriminator (e.g. `"participant_joined"`).
    pub event_type: String,
    /// JSONB payload with the full serialized event.
    pub payload: serde_json::Value,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}
