//! Per-connection subscription manager.
//!
//! Tracks which pool IDs a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::PoolId;

/// Manages the set of pool subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed pool IDs. If `subscribe_all` is true, this set is ignored.
    pool_ids: HashSet<PoolId>,
    /// Whether the client subscribes to everything (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds pool IDs to the subscription set and optionally enables the
    /// wildcard.
    pub fn subscribe(&mut self, ids: &[PoolId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.pool_ids.extend(ids.iter().cloned());
    }

    /// Removes pool IDs from the subscription set and optionally disables
    /// the wildcard.
    pub fn unsubscribe(&mut self, ids: &[PoolId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.pool_ids.remove(id);
        }
    }

    /// Returns `true` if an event for `pool_id` should be forwarded.
    ///
    /// Events without a pool (storefront purchases and their
    /// notifications) only reach wildcard subscribers.
    #[must_use]
    pub fn matches(&self, pool_id: Option<&PoolId>) -> bool {
        self.subscribe_all || pool_id.is_some_and(|id| self.pool_ids.contains(id))
    }

    /// Returns the number of explicitly subscribed pool IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.pool_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn id(slug: &str) -> PoolId {
        let Ok(id) = PoolId::new(slug) else {
            panic!("valid id");
        };
        id
    }

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(Some(&id("monsoon"))));
        assert!(!mgr.matches(None));
    }

    #[test]
    fn specific_pool_ignores_others_and_storefront() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[id("monsoon")], false);
        assert!(mgr.matches(Some(&id("monsoon"))));
        assert!(!mgr.matches(Some(&id("cappuccino"))));
        assert!(!mgr.matches(None));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.matches(Some(&id("salawara"))));
        assert!(mgr.matches(None));

        mgr.unsubscribe(&[], true);
        assert!(!mgr.matches(None));
    }

    #[test]
    fn unsubscribe_removes_pool() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[id("baarbara"), id("monsoon")], false);
        assert_eq!(mgr.count(), 2);
        mgr.unsubscribe(&[id("baarbara")], false);
        assert!(!mgr.matches(Some(&id("baarbara"))));
        assert_eq!(mgr.count(), 1);
    }
}
