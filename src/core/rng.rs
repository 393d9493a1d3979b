//! Seeded randomness for rollouts.
//!
//! The search tree holds one root `SimRng`. Every rollout job receives a
//! child generator split off the root on the controlling thread, so a batch
//! is reproducible from the search seed alone.
//!
//! ```
//! use uct_engine::core::SimRng;
//!
//! let mut root = SimRng::new(42);
//! let mut job = root.fork();
//!
//! assert_ne!(root.gen_index(1_000_000), job.gen_index(1_000_000));
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// ChaCha8 stream handed to [`GameState::rollout`](crate::rules::GameState::rollout).
#[derive(Clone, Debug)]
pub struct SimRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl SimRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Split off a child generator.
    ///
    /// The child's seed is the next word of this stream, so the n-th fork of
    /// a given seed is always the same generator.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        Self::new(self.inner.next_u64())
    }

    /// Seed this generator started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn gen_index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }

    /// Uniform element of `items`, `None` if empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }
}
