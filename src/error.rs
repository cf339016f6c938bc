//! Gateway error types with HTTP status code mapping.
//!
//! [`LotteryError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Amount, PoolId};
use crate::payment::PaymentError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "Insufficient PYUSD balance. You need at least 1 PYUSD to join.",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request              |
/// | 2000–2099 | Not Found         | 404 Not Found                |
/// | 2100–2199 | Pool State        | 409 Conflict                 |
/// | 3000–3999 | Server            | 500 / 503                    |
/// | 4000–4999 | Payment           | 422 / 502                    |
#[derive(Debug, thiserror::Error)]
pub enum LotteryError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Pool with the given ID was not found.
    #[error("pool not found: {0}")]
    PoolNotFound(String),

    /// Storefront listing with the given ID was not found.
    #[error("listing not found: {0}")]
    ListingNotFound(String),

    /// Join attempted against a pool with no open seat.
    #[error("pool {0} is full")]
    PoolFull(PoolId),

    /// Winner selection attempted before the pool reached capacity.
    #[error("pool {pool_id} is not full yet ({entries}/{capacity})")]
    PoolNotFull {
        /// Pool identifier.
        pool_id: PoolId,
        /// Current entries.
        entries: usize,
        /// Pool capacity.
        capacity: usize,
    },

    /// A winner has already been drawn for the current round.
    #[error("a winner was already selected for pool {0}")]
    RoundAlreadyDecided(PoolId),

    /// Caller balance is below the required amount.
    #[error("Insufficient PYUSD balance. You need at least {required} PYUSD to {action}.")]
    InsufficientFunds {
        /// Amount the operation requires.
        required: Amount,
        /// Balance reported by the payment gateway.
        available: Amount,
        /// What the payment was for (e.g. `"join"`).
        action: &'static str,
    },

    /// The payment gateway refused the authorization or the broadcast.
    #[error("{0}")]
    GatewayFailure(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Persistence is disabled in this deployment.
    #[error("event history is not available: persistence is disabled")]
    PersistenceUnavailable,

    /// Any other failure. The detail is logged, never shown to the user.
    #[error("Unexpected error initiating payment.")]
    Unexpected(String),
}

impl LotteryError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::PoolNotFound(_) => 2001,
            Self::ListingNotFound(_) => 2002,
            Self::PoolFull(_) => 2101,
            Self::PoolNotFull { .. } => 2102,
            Self::RoundAlreadyDecided(_) => 2103,
            Self::Unexpected(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::PersistenceUnavailable => 3002,
            Self::InsufficientFunds { .. } => 4001,
            Self::GatewayFailure(_) => 4002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PoolNotFound(_) | Self::ListingNotFound(_) => StatusCode::NOT_FOUND,
            Self::PoolFull(_) | Self::PoolNotFull { .. } | Self::RoundAlreadyDecided(_) => {
                StatusCode::CONFLICT
            }
            Self::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::GatewayFailure(_) => StatusCode::BAD_GATEWAY,
            Self::PersistenceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::PersistenceError(_) | Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PaymentError> for LotteryError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Rejected(msg) | PaymentError::BroadcastFailed(msg) => {
                Self::GatewayFailure(msg)
            }
            PaymentError::Transport(_) | PaymentError::Malformed(_) => {
                Self::Unexpected(err.to_string())
            }
        }
    }
}

impl IntoResponse for LotteryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let Self::Unexpected(detail) = &self {
            tracing::error!(%detail, "unexpected failure");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn pool_id() -> PoolId {
        let Ok(id) = "monsoon".parse::<PoolId>() else {
            panic!("valid pool id");
        };
        id
    }

    #[test]
    fn insufficient_funds_message_names_the_stake() {
        let err = LotteryError::InsufficientFunds {
            required: Amount::from_whole(1),
            available: Amount::ZERO,
            action: "join",
        };
        assert_eq!(
            err.to_string(),
            "Insufficient PYUSD balance. You need at least 1 PYUSD to join."
        );
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn pool_state_errors_are_conflicts() {
        assert_eq!(
            LotteryError::PoolFull(pool_id()).status_code(),
            StatusCode::CONFLICT
        );
        let not_full = LotteryError::PoolNotFull {
            pool_id: pool_id(),
            entries: 5,
            capacity: 6,
        };
        assert_eq!(not_full.status_code(), StatusCode::CONFLICT);
        assert_eq!(not_full.error_code(), 2102);
    }

    #[test]
    fn unexpected_hides_detail() {
        let err = LotteryError::Unexpected("connection reset by peer".to_string());
        assert!(!err.to_string().contains("connection reset"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn payment_rejection_is_reported_verbatim() {
        let err = LotteryError::from(PaymentError::Rejected("user declined".to_string()));
        assert_eq!(err.to_string(), "user declined");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn payment_transport_failure_is_unexpected() {
        let err = LotteryError::from(PaymentError::Transport("timed out".to_string()));
        assert!(matches!(err, LotteryError::Unexpected(_)));
    }
}
