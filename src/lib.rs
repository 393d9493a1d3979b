//! # uct-engine
//!
//! A reusable Monte Carlo Tree Search core for two-player games.
//!
//! ## Design Principles
//!
//! 1. **Game-Agnostic**: The engine is generic over `GameState`. Games supply
//!    moves, transitions, terminal detection and rollouts.
//!
//! 2. **Single Owner**: The tree owns every node, each node owns its state
//!    and move. Parent links are indices, never ownership.
//!
//! 3. **Explicit Resources**: The rollout worker pool is constructed by the
//!    caller and shared by `Arc`, not hidden in a global.
//!
//! ## Architecture
//!
//! - **Single-threaded tree**: selection, expansion, backpropagation and
//!   advance all run on the calling thread.
//!
//! - **Parallel leaves**: each expansion fans a batch of rollouts out to the
//!   worker pool and waits for the whole batch.
//!
//! ## Modules
//!
//! - `core`: Deterministic rollout RNG
//! - `rules`: `GameState` / `GameMove` traits for game implementations
//! - `scheduler`: Worker pool with tagged job groups
//! - `mcts`: Search tree, UCT policy, rollouts, agent
//! - `games`: Reference Tic-Tac-Toe implementation

pub mod core;
pub mod rules;
pub mod scheduler;
pub mod mcts;
pub mod games;

// Re-export commonly used types
pub use crate::core::SimRng;

pub use crate::rules::{GameMove, GameState};

pub use crate::scheduler::{FnJob, Job, JobScheduler, JobTag, SchedulerError};

pub use crate::mcts::{
    Advance, MCTSAgent, MCTSError, MCTSNode, MCTSTree, NodeId, SearchConfig, SearchStats,
    SearchTree, TreeReport, TreeStats,
};
