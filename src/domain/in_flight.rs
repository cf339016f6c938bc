//! Per-caller re-entry gate.
//!
//! A caller may have at most one payment-backed operation running. A second
//! request while the first is pending is skipped, not queued.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Tracks which callers currently have an operation in flight.
#[derive(Debug, Default)]
pub struct InFlightGate {
    active: Mutex<HashSet<String>>,
}

impl InFlightGate {
    /// Creates an empty gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `caller` as busy.
    ///
    /// Returns `None` if the caller already has an operation in flight.
    /// The slot is freed when the returned guard is dropped.
    #[must_use]
    pub fn try_enter(self: &Arc<Self>, caller: &str) -> Option<InFlightGuard> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(caller.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            gate: Arc::clone(self),
            caller: caller.to_string(),
        })
    }

    /// Returns `true` if `caller` has an operation in flight.
    #[must_use]
    pub fn is_busy(&self, caller: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(caller)
    }
}

/// Releases the caller's slot on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    gate: Arc<InFlightGate>,
    caller: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gate
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.caller);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_entry_is_refused_until_release() {
        let gate = Arc::new(InFlightGate::new());
        let first = gate.try_enter("0xalice");
        assert!(first.is_some());
        assert!(gate.is_busy("0xalice"));
        assert!(gate.try_enter("0xalice").is_none());

        drop(first);
        assert!(!gate.is_busy("0xalice"));
        assert!(gate.try_enter("0xalice").is_some());
    }

    #[test]
    fn callers_are_independent() {
        let gate = Arc::new(InFlightGate::new());
        let _alice = gate.try_enter("0xalice");
        assert!(gate.try_enter("0xbob").is_some());
    }
}
