//! Concurrent pool storage with per-pool fine-grained locking.
//!
//! [`PoolRegistry`] stores every pool in an ordered map where each entry is
//! individually protected by a [`tokio::sync::RwLock`]. This allows
//! concurrent reads on the same pool and concurrent writes on different
//! pools.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use super::{Amount, Pool, PoolId, PoolStatus};
use crate::error::LotteryError;

/// Aggregate view over all pools, recomputed on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolSummary {
    /// Pools with at least one free seat.
    pub active_pools: usize,
    /// Pools whose current round has a winner.
    pub completed_rounds: usize,
    /// `Σ entries × stake` over all pools.
    pub total_staked: Amount,
}

impl PoolSummary {
    /// Computes the summary from a set of pools.
    #[must_use]
    pub fn from_pools<'a>(pools: impl IntoIterator<Item = &'a Pool>, stake: Amount) -> Self {
        let mut summary = Self {
            active_pools: 0,
            completed_rounds: 0,
            total_staked: Amount::ZERO,
        };
        for pool in pools {
            if pool.is_active() {
                summary.active_pools += 1;
            }
            if pool.is_decided() {
                summary.completed_rounds += 1;
            }
            summary.total_staked = summary
                .total_staked
                .saturating_add(stake.saturating_mul(pool.entries()));
        }
        summary
    }
}

/// Central store for all lottery pools.
///
/// Pools are inserted at startup and never removed during a session.
///
/// # Concurrency
///
/// - Multiple tasks may read the same pool concurrently.
/// - Writes to different pools are concurrent.
/// - Writes to the same pool are serialized.
#[derive(Debug)]
pub struct PoolRegistry {
    pools: RwLock<BTreeMap<PoolId, Arc<RwLock<Pool>>>>,
}

impl PoolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pools: RwLock::new(BTreeMap::new()),
        }
    }

    /// Inserts a new pool into the registry.
    ///
    /// # Errors
    ///
    /// Returns [`LotteryError::InvalidRequest`] if a pool with the same
    /// ID already exists.
    pub async fn insert(&self, pool: Pool) -> Result<PoolId, LotteryError> {
        let pool_id = pool.id().clone();
        let mut map = self.pools.write().await;
        if map.contains_key(&pool_id) {
            return Err(LotteryError::InvalidRequest(format!(
                "pool {pool_id} already exists"
            )));
        }
        map.insert(pool_id.clone(), Arc::new(RwLock::new(pool)));
        Ok(pool_id)
    }

    /// Returns the pool behind its per-pool lock.
    ///
    /// # Errors
    ///
    /// Returns [`LotteryError::PoolNotFound`] if no pool with the given ID
    /// exists.
    pub async fn get(&self, pool_id: &PoolId) -> Result<Arc<RwLock<Pool>>, LotteryError> {
        let map = self.pools.read().await;
        map.get(pool_id)
            .cloned()
            .ok_or_else(|| LotteryError::PoolNotFound(pool_id.to_string()))
    }

    /// Returns snapshots of all pools in ID order, optionally filtered by
    /// status.
    pub async fn list(&self, status_filter: Option<PoolStatus>) -> Vec<Pool> {
        let map = self.pools.read().await;
        let mut pools = Vec::with_capacity(map.len());
        for pool_lock in map.values() {
            let pool = pool_lock.read().await;
            if let Some(filter) = status_filter
                && pool.status() != filter
            {
                continue;
            }
            pools.push(pool.clone());
        }
        pools
    }

    /// Computes the [`PoolSummary`] across every pool.
    pub async fn summary(&self, stake: Amount) -> PoolSummary {
        let pools = self.list(None).await;
        PoolSummary::from_pools(&pools, stake)
    }

    /// Returns the number of pools in the registry.
    pub async fn len(&self) -> usize {
        self.pools.read().await.len()
    }

    /// Returns `true` if the registry contains no pools.
    pub async fn is_empty(&self) -> bool {
        self.pools.read().await.is_empty()
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
