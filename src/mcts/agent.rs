//! Move-generating agent over a search tree.

use std::sync::Arc;

use tracing::debug;

use crate::rules::GameState;
use crate::scheduler::JobScheduler;

use super::config::SearchConfig;
use super::search::{MCTSError, SearchTree};

/// Plays one side of a game with UCT search.
///
/// Each `genmove` advances the tree by the opponent's move, grows it under
/// the configured budget, commits to the best child and keeps that subtree
/// for the next move.
#[derive(Debug)]
pub struct MCTSAgent<S: GameState> {
    tree: SearchTree<S>,
    max_iterations: u32,
    max_seconds: f64,
}

impl<S: GameState> MCTSAgent<S> {
    /// Create an agent with its own rollout pool of
    /// `config.worker_threads` workers.
    pub fn new(initial_state: S, config: &SearchConfig) -> Result<Self, MCTSError> {
        config.validate()?;
        let scheduler = Arc::new(JobScheduler::new(config.worker_threads)?);
        Self::with_scheduler(initial_state, config, scheduler)
    }

    /// Create an agent sharing an existing rollout pool.
    pub fn with_scheduler(
        initial_state: S,
        config: &SearchConfig,
        scheduler: Arc<JobScheduler>,
    ) -> Result<Self, MCTSError> {
        Ok(Self {
            tree: SearchTree::new(initial_state, scheduler, config)?,
            max_iterations: config.max_iterations,
            max_seconds: config.max_seconds,
        })
    }

    /// Generate a move in reply to `opponent_move`.
    ///
    /// Pass `None` when the agent moves first. Returns `Ok(None)` if the
    /// game is already over, is ended by `opponent_move`, or offers no move;
    /// fails only if the game rejects `opponent_move`.
    pub fn genmove(
        &mut self,
        opponent_move: Option<&S::Move>,
    ) -> Result<Option<S::Move>, MCTSError> {
        if self.tree.current_state().is_terminal() {
            return Ok(None);
        }
        if let Some(mv) = opponent_move {
            self.tree.advance_tree(mv)?;
            if self.tree.current_state().is_terminal() {
                return Ok(None);
            }
        }

        self.tree.grow_tree(self.max_iterations, self.max_seconds);
        debug!(size = self.tree.size(), "search finished");

        let Some(best) = self.tree.select_best_child() else {
            return Ok(None);
        };
        let Some(best_move) = self.tree.node(best).mv().cloned() else {
            return Ok(None);
        };
        self.tree.advance_tree(&best_move)?;
        Ok(Some(best_move))
    }

    /// Print statistics of the current tree.
    pub fn feedback(&self) {
        self.tree.print_stats();
    }

    /// Position the agent is currently at.
    #[must_use]
    pub fn current_state(&self) -> &S {
        self.tree.current_state()
    }

    /// The agent's search tree.
    #[must_use]
    pub fn tree(&self) -> &SearchTree<S> {
        &self.tree
    }
}
