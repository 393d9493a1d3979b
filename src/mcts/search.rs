//! Core UCT search algorithm.
//!
//! Each growth iteration:
//! 1. Selection: descend from the root by UCT to a node with untried moves
//!    (or a terminal node)
//! 2. Expansion: claim the node's next untried move and add the child
//! 3. Rollout: run a batch of parallel playouts from the new child
//! 4. Backpropagation: add the batch's score and count up to the root
//!
//! Only the calling thread touches the tree; workers only see the shared,
//! read-only state being rolled out.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::core::SimRng;
use crate::rules::GameState;
use crate::scheduler::{JobScheduler, SchedulerError};

use super::config::SearchConfig;
use super::node::{MCTSNode, NodeId};
use super::policy;
use super::rollout;
use super::stats::{SearchStats, TreeReport};
use super::tree::{Advance, MCTSTree};

/// Number of root children listed by `print_stats`.
pub const REPORT_TOP_N: usize = 10;

/// Errors that can occur during search.
#[derive(Debug, Error)]
pub enum MCTSError {
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// UCT search tree over a game.
///
/// Owns the node arena and the rollout RNG, and shares the rollout worker
/// pool with whoever created it.
pub struct SearchTree<S: GameState> {
    /// The node arena.
    tree: MCTSTree<S>,

    /// Worker pool running rollouts.
    scheduler: Arc<JobScheduler>,

    /// Root RNG; forked once per rollout job.
    rng: SimRng,

    /// UCT constant used by `grow_tree`.
    exploration_constant: f64,

    /// Rollouts per expansion.
    fan_out: usize,

    /// Statistics of the last `grow_tree`.
    stats: SearchStats,
}

impl<S: GameState> SearchTree<S> {
    /// Create a tree rooted at `initial_state`.
    pub fn new(
        initial_state: S,
        scheduler: Arc<JobScheduler>,
        config: &SearchConfig,
    ) -> Result<Self, MCTSError> {
        config.validate()?;
        let fan_out = config.fan_out(scheduler.worker_count());

        Ok(Self {
            tree: MCTSTree::new(initial_state),
            scheduler,
            rng: SimRng::new(config.seed),
            exploration_constant: config.exploration_constant,
            fan_out,
            stats: SearchStats::default(),
        })
    }

    /// Rollouts run per expansion.
    #[must_use]
    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    /// Root node ID.
    #[must_use]
    pub fn root_id(&self) -> NodeId {
        self.tree.root()
    }

    /// Get a node by ID.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &MCTSNode<S> {
        self.tree.get(id)
    }

    /// The underlying node arena.
    #[must_use]
    pub fn tree(&self) -> &MCTSTree<S> {
        &self.tree
    }

    /// Position at the root.
    #[must_use]
    pub fn current_state(&self) -> &S {
        self.tree.root_node().state()
    }

    /// Descendant counter of the root.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.tree.root_node().size()
    }

    /// Statistics of the last `grow_tree`.
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Tree policy: the node the next expansion should happen at.
    ///
    /// Descends by UCT with constant `c` through fully expanded nodes and
    /// stops at the first node with untried moves, at a terminal node, or at
    /// a node the game gave no moves at all.
    #[must_use]
    pub fn select(&self, c: f64) -> NodeId {
        let mut current = self.tree.root();
        loop {
            let node = self.tree.get(current);
            if node.is_terminal() || !node.is_fully_expanded() {
                return current;
            }
            match policy::select_best_child(&self.tree, current, c) {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Best child of `id` by UCT with constant `c`.
    #[must_use]
    pub fn best_child_of(&self, id: NodeId, c: f64) -> Option<NodeId> {
        policy::select_best_child(&self.tree, id, c)
    }

    /// Root child with the best win-rate for the side to move, no
    /// exploration term.
    #[must_use]
    pub fn select_best_child(&self) -> Option<NodeId> {
        self.best_child_of(self.tree.root(), 0.0)
    }

    /// Expand `id` by its next untried move and roll the new child out.
    ///
    /// On a terminal node no child is created but a rollout still runs, so
    /// the node's visit count keeps growing. Returns the new child, if any.
    pub fn expand(&mut self, id: NodeId) -> Option<NodeId> {
        let node = self.tree.get(id);
        if node.is_terminal() {
            trace!(%id, "expanding terminal node; rollout only");
            self.rollout(id);
            return None;
        }
        if node.is_fully_expanded() {
            warn!(%id, "cannot expand a fully expanded node");
            return None;
        }

        let mv = self.tree.get_mut(id).untried.pop_front()?;
        let Some(next_state) = self.tree.get(id).state().next_state(&mv) else {
            warn!(%id, %mv, "game rejected one of its own actions; dropped");
            return None;
        };

        let child = self
            .tree
            .add_child(id, MCTSNode::new(Some(id), next_state, Some(mv)));
        trace!(parent = %id, %child, "expanded");
        self.rollout(child);
        Some(child)
    }

    /// Run one batch of parallel rollouts at `id` and backpropagate the
    /// aggregate.
    pub fn rollout(&mut self, id: NodeId) {
        let state = Arc::clone(self.tree.get(id).shared_state());
        let (score, count) =
            rollout::run_batch(&self.scheduler, &state, &mut self.rng, self.fan_out);
        self.stats.simulations += count;
        self.tree.backpropagate(id, score, count);
    }

    /// Grow the tree by up to `max_iterations` select+expand steps.
    ///
    /// Stops early once more than `max_seconds` have elapsed (checked after
    /// each iteration) or when nothing is left to expand.
    pub fn grow_tree(&mut self, max_iterations: u32, max_seconds: f64) -> &SearchStats {
        let start = Instant::now();
        self.stats = SearchStats::default();

        for _ in 0..max_iterations {
            let node_id = self.select(self.exploration_constant);
            let node = self.tree.get(node_id);
            if node.is_fully_expanded() && !node.is_terminal() {
                debug!(%node_id, "nothing left to expand");
                break;
            }

            if self.expand(node_id).is_some() {
                self.stats.nodes_expanded += 1;
            }
            self.stats.iterations += 1;

            if start.elapsed().as_secs_f64() > max_seconds {
                break;
            }
        }

        self.stats.elapsed = start.elapsed();
        debug!(
            iterations = self.stats.iterations,
            expanded = self.stats.nodes_expanded,
            simulations = self.stats.simulations,
            rollouts_per_sec = self.stats.rollout_rate(),
            "grew tree"
        );
        &self.stats
    }

    /// Make the child reached by `mv` the new root, pruning everything else.
    ///
    /// Falls back to a fresh root if `mv` was never explored.
    pub fn advance_tree(&mut self, mv: &S::Move) -> Result<Advance, MCTSError> {
        self.tree.advance(mv)
    }

    /// Diagnostic summary of the root and its `top_n` best children.
    #[must_use]
    pub fn report(&self, top_n: usize) -> TreeReport<S::Move> {
        TreeReport::from_tree(&self.tree, top_n)
    }

    /// Print `report(REPORT_TOP_N)` and the last search's counters to
    /// stdout.
    pub fn print_stats(&self) {
        println!("{}", self.report(REPORT_TOP_N));
        println!("Last search:         {}", self.stats);
    }
}

impl<S: GameState> std::fmt::Debug for SearchTree<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchTree")
            .field("nodes", &self.tree.len())
            .field("fan_out", &self.fan_out)
            .field("exploration_constant", &self.exploration_constant)
            .finish_non_exhaustive()
    }
}
