//! Per-worker pacing multiplier.
//!
//! Every simulated unit of work sleeps for `base / productivity`. After each
//! unit the value takes one step of a multiplicative random walk: it is
//! multiplied by a factor drawn uniformly from a [`WalkRange`], then clamped
//! so it never drops below the configured floor.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Inclusive range the per-step factor is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkRange {
    pub low: f64,
    pub high: f64,
}

impl WalkRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// A range that always draws exactly `factor`.
    pub const fn fixed(factor: f64) -> Self {
        Self::new(factor, factor)
    }

    pub fn is_valid(&self) -> bool {
        self.low > 0.0 && self.low <= self.high && self.high.is_finite()
    }

    fn sample(&self, rng: &mut StdRng) -> f64 {
        if self.low == self.high {
            self.low
        } else {
            rng.gen_range(self.low..=self.high)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Productivity {
    value: f64,
    floor: f64,
    rng: StdRng,
}

impl Productivity {
    /// Starts a walk at `initial` (raised to `floor` if below it).
    ///
    /// A `seed` makes the walk reproducible; `None` seeds from entropy.
    pub fn new(initial: f64, floor: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            value: initial.max(floor),
            floor,
            rng,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// How long a unit of work with nominal duration `base` takes right now.
    pub fn pace(&self, base: Duration) -> Duration {
        base.div_f64(self.value)
    }

    /// Takes one step of the walk and returns the new value.
    pub fn perturb(&mut self, range: WalkRange) -> f64 {
        let factor = range.sample(&mut self.rng);
        self.value = (self.value * factor).max(self.floor);
        self.value
    }
}
