//! Injectable uniform random source for winner selection.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Provider of uniform integers in `0..upper`.
///
/// The lottery engine never reaches for a global generator; the service is
/// handed a `RandomSource` so draws can be seeded or scripted.
pub trait RandomSource: Send + Sync + fmt::Debug {
    /// Returns an index uniformly distributed in `0..upper`.
    ///
    /// `upper` is always greater than zero.
    fn next_below(&self, upper: usize) -> usize;
}

/// Unseeded source backed by the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_below(&self, upper: usize) -> usize {
        rand::thread_rng().gen_range(0..upper)
    }
}

/// Deterministic source for reproducible draws (`RNG_SEED`, tests).
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Creates a source seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_below(&self, upper: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(0..upper)
    }
}

/// Replays a fixed script of indices, wrapping at the end.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ScriptedRandom {
    script: Vec<usize>,
    cursor: Mutex<usize>,
}

#[cfg(test)]
impl ScriptedRandom {
    pub(crate) fn new(script: Vec<usize>) -> Self {
        Self {
            script,
            cursor: Mutex::new(0),
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn next_below(&self, upper: usize) -> usize {
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        let value = self
            .script
            .get(*cursor % self.script.len().max(1))
            .copied()
            .unwrap_or(0);
        *cursor += 1;
        value % upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_sources_repeat() {
        let a = SeededRandom::new(7);
        let b = SeededRandom::new(7);
        let xs: Vec<usize> = (0..32).map(|_| a.next_below(6)).collect();
        let ys: Vec<usize> = (0..32).map(|_| b.next_below(6)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn draws_stay_in_range() {
        let thread = ThreadRandom;
        let seeded = SeededRandom::new(1);
        for upper in 1..20 {
            assert!(thread.next_below(upper) < upper);
            assert!(seeded.next_below(upper) < upper);
        }
    }

    #[test]
    fn scripted_replays_and_wraps() {
        let scripted = ScriptedRandom::new(vec![2, 5]);
        assert_eq!(scripted.next_below(6), 2);
        assert_eq!(scripted.next_below(6), 5);
        assert_eq!(scripted.next_below(6), 2);
        assert_eq!(scripted.next_below(3), 2);
    }
}
