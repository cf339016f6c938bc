//! User-facing outcome messages.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::PoolId;

/// Whether an operation succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// Operation completed.
    Success,
    /// Operation failed; the message says why.
    Failure,
}

/// Human-readable message emitted after every join, draw or purchase.
///
/// Display-only side channel: nothing reads notifications back.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Success or failure.
    pub level: NoticeLevel,
    /// Pool the operation targeted, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_id: Option<PoolId>,
    /// Message shown to the user.
    pub message: String,
    /// When the outcome was reported.
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Creates a success notification.
    #[must_use]
    pub fn success(pool_id: Option<PoolId>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            pool_id,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a failure notification.
    #[must_use]
    pub fn failure(pool_id: Option<PoolId>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Failure,
            pool_id,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}
