//! Random number sources for party durations and generator waves.
//!
//! The core only needs two draws: a uniform integer in an inclusive range and
//! a Bernoulli trial. Both are behind [`RandomSource`] so a run can be made
//! reproducible with [`SeededRandom`].

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A shareable source of random draws.
pub trait RandomSource: Send + Sync {
    /// Returns a uniformly distributed integer in `[lo, hi]`.
    ///
    /// If `hi <= lo` the result is `lo`.
    fn int_in(&self, lo: u32, hi: u32) -> u32;

    /// Returns `true` with the given probability.
    ///
    /// Probabilities at or below zero never succeed; at or above one always do.
    fn chance(&self, probability: f64) -> bool;
}

/// Draws from the calling thread's RNG.
///
/// Each worker thread gets an independent generator, so no lock is taken.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn int_in(&self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        rand::rng().random_range(lo..=hi)
    }

    fn chance(&self, probability: f64) -> bool {
        match clamp_probability(probability) {
            Some(p) => rand::rng().random_bool(p),
            None => probability >= 1.0,
        }
    }
}

/// A single seeded generator shared by every thread.
///
/// The sequence of draws is fixed by the seed; which thread receives which
/// draw still depends on scheduling.
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
    fn int_in(&self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        self.rng.lock().random_range(lo..=hi)
    }

    fn chance(&self, probability: f64) -> bool {
        match clamp_probability(probability) {
            Some(p) => self.rng.lock().random_bool(p),
            None => probability >= 1.0,
        }
    }
}

/// Returns the probability if it needs an actual draw, `None` if the outcome
/// is already certain (or the input is NaN, which never succeeds).
fn clamp_probability(probability: f64) -> Option<f64> {
    if probability > 0.0 && probability < 1.0 {
        Some(probability)
    } else {
        None
    }
}
