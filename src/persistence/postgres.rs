//! PostgreSQL implementation of the event log.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::StoredEvent;
use crate::error::LotteryError;

/// PostgreSQL-backed event log using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

fn db_error(err: impl std::fmt::Display) -> LotteryError {
    LotteryError::PersistenceError(err.to_string())
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool to `database_url`.
    ///
    /// # Errors
    ///
    /// Returns a [`LotteryError::PersistenceError`] if the database cannot
    /// be reached within `connect_timeout`.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        connect_timeout: Duration,
    ) -> Result<Self, LotteryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(connect_timeout)
            .connect(database_url)
            .await
            .map_err(db_error)?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations under `migrations/`.
    ///
    /// # Errors
    ///
    /// Returns a [`LotteryError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), LotteryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(db_error)
    }

    /// Appends an event to the event log.
    ///
    /// # Errors
    ///
    /// Returns a [`LotteryError::PersistenceError`] on database failure.
    pub async fn save_event(
        &self,
        pool_id: Option<&str>,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<i64, LotteryError> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO events (pool_id, event_type, payload) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(pool_id)
        .bind(event_type)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    /// Loads the most recent `limit` events of one pool, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`LotteryError::PersistenceError`] on database failure.
    pub async fn load_events(
        &self,
        pool_id: &str,
        limit: i64,
    ) -> Result<Vec<StoredEvent>, LotteryError> {
        sqlx::query_as::<_, StoredEvent>(
            "SELECT id, pool_id, event_type, payload, created_at FROM events \
             WHERE pool_id = $1 ORDER BY id DESC LIMIT $2",
        )
        .bind(pool_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }
}
