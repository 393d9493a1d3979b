//! UCT Monte Carlo Tree Search.
//!
//! ## Overview
//!
//! - **Arena tree**: nodes own their state and move; parents are plain
//!   indices, cleared when a node becomes the root
//! - **UCT selection**: win-rates are tracked for player 1 and inverted on
//!   player 2's turns
//! - **Parallel rollouts**: each expansion runs a batch of rollouts on a
//!   shared worker pool and backpropagates the batch once
//! - **Tree reuse**: advancing by a played move keeps that subtree
//!
//! ## Usage
//!
//! ```rust,ignore
//! use uct_engine::mcts::{MCTSAgent, SearchConfig};
//!
//! let config = SearchConfig::default().with_budget(2_000, 5.0);
//! let mut agent = MCTSAgent::new(initial_state, &config)?;
//!
//! let mut opponent_move = None;
//! while let Some(mv) = agent.genmove(opponent_move.as_ref())? {
//!     println!("Agent plays {}", mv);
//!     opponent_move = ask_opponent(agent.current_state());
//! }
//! ```

pub mod agent;
pub mod config;
pub mod node;
pub mod policy;
pub mod rollout;
pub mod search;
pub mod stats;
pub mod tree;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use agent::MCTSAgent;
pub use config::{SearchConfig, DEFAULT_EXPLORATION_CONSTANT};
pub use node::{MCTSNode, NodeId};
pub use policy::{select_best_child, uct_value};
pub use rollout::{run_batch, RolloutJob, RolloutResults};
pub use search::{MCTSError, SearchTree, REPORT_TOP_N};
pub use stats::{ChildSummary, SearchStats, TreeReport};
pub use tree::{Advance, MCTSTree, TreeStats};
