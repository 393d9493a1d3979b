//! Search configuration parameters.

use serde::{Deserialize, Serialize};

use crate::scheduler::DEFAULT_WORKER_THREADS;

use super::search::MCTSError;

/// UCT exploration constant used while growing the tree.
pub const DEFAULT_EXPLORATION_CONSTANT: f64 = 1.41;

/// Search configuration parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// UCT exploration constant (default: 1.41).
    /// Higher values favor exploration over exploitation.
    pub exploration_constant: f64,

    /// Iteration cap for one agent move.
    pub max_iterations: u32,

    /// Wall-clock budget in seconds for one agent move.
    /// Checked between iterations, so it can be overrun by one expansion.
    pub max_seconds: f64,

    /// Number of worker threads in the rollout pool.
    pub worker_threads: usize,

    /// Rollouts run in parallel per expansion.
    /// `None` runs one rollout per worker thread.
    pub rollouts_per_expansion: Option<usize>,

    /// Seed for rollout randomness.
    /// Same seed produces the same rollout outcomes.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration_constant: DEFAULT_EXPLORATION_CONSTANT,
            max_iterations: 10_000,
            max_seconds: 15.0,
            worker_threads: DEFAULT_WORKER_THREADS,
            rollouts_per_expansion: None,
            seed: 42,
        }
    }
}

impl SearchConfig {
    /// Set a custom exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Set the per-move search budget.
    pub fn with_budget(mut self, max_iterations: u32, max_seconds: f64) -> Self {
        self.max_iterations = max_iterations;
        self.max_seconds = max_seconds;
        self
    }

    /// Set the rollout pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.worker_threads = workers;
        self
    }

    /// Set the rollout fan-out independently of the pool size.
    pub fn with_rollouts_per_expansion(mut self, rollouts: usize) -> Self {
        self.rollouts_per_expansion = Some(rollouts);
        self
    }

    /// Set a custom seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Rollout fan-out given the actual pool size.
    #[must_use]
    pub fn fan_out(&self, pool_size: usize) -> usize {
        self.rollouts_per_expansion.unwrap_or(pool_size)
    }

    /// Check the configuration for values the search cannot run with.
    pub fn validate(&self) -> Result<(), MCTSError> {
        if self.worker_threads == 0 {
            return Err(MCTSError::InvalidConfig("worker_threads must be at least 1".into()));
        }
        if self.rollouts_per_expansion == Some(0) {
            return Err(MCTSError::InvalidConfig(
                "rollouts_per_expansion must be at least 1".into(),
            ));
        }
        if !(self.exploration_constant >= 0.0) {
            return Err(MCTSError::InvalidConfig(format!(
                "exploration_constant must be non-negative, got {}",
                self.exploration_constant
            )));
        }
        if !(self.max_seconds >= 0.0) {
            return Err(MCTSError::InvalidConfig(format!(
                "max_seconds must be non-negative, got {}",
                self.max_seconds
            )));
        }
        Ok(())
    }
}
