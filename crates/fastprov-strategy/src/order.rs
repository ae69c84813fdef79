//! Pool consultation order.
//!
//! Registration order by default. With randomization on, every call
//! produces a fresh uniform permutation of pool indices so that marginal
//! load does not always land on the first registered pool. The registry
//! itself is never reordered.

use std::sync::{Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Produces index sequences over the managed pools.
#[derive(Debug)]
pub struct PoolOrder {
    rng: Mutex<StdRng>,
}

impl PoolOrder {
    /// Seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic ordering, for tests and reproducible simulations.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Indices `0..len` in the order pools should be consulted.
    pub fn sequence(&self, len: usize, randomize: bool) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..len).collect();
        if randomize && len > 1 {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            indices.shuffle(&mut *rng);
        }
        indices
    }
}

impl Default for PoolOrder {
    fn default() -> Self {
        Self::from_os_rng()
    }
}
