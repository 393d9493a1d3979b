//! Search tree node.
//!
//! Nodes live in the `MCTSTree` arena and refer to each other by `NodeId`.
//! A node owns its game state, the move that produced it, and the queue of
//! moves not yet expanded into children. The parent link is a plain index,
//! never used for ownership, and is cleared when the node becomes the root.

use std::collections::VecDeque;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::warn;

use crate::rules::GameState;

/// Index into the `MCTSTree` node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new node ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A node in the search tree.
#[derive(Debug)]
pub struct MCTSNode<S: GameState> {
    /// Parent node (`None` for the root).
    pub(crate) parent: Option<NodeId>,

    /// Position at this node. Shared read-only with in-flight rollout jobs.
    state: Arc<S>,

    /// Move that produced this node from its parent's state.
    mv: Option<S::Move>,

    /// Sum of rollout outcomes at or below this node, from player 1's view.
    pub(crate) score: f64,

    /// Number of rollouts counted at or below this node.
    pub(crate) simulations: u32,

    /// Descendant count, for reporting.
    pub(crate) size: u32,

    /// Cached at construction.
    terminal: bool,

    /// Expanded children, in expansion order.
    pub(crate) children: SmallVec<[NodeId; 8]>,

    /// Moves not yet expanded, consumed front to back.
    pub(crate) untried: VecDeque<S::Move>,
}

impl<S: GameState> MCTSNode<S> {
    /// Create a node for `state`, reached from `parent` by `mv`.
    ///
    /// Terminal states get no untried moves. Duplicate moves from
    /// `actions_to_try` are dropped.
    pub fn new(parent: Option<NodeId>, state: S, mv: Option<S::Move>) -> Self {
        let terminal = state.is_terminal();
        let untried = if terminal {
            VecDeque::new()
        } else {
            distinct_actions(state.actions_to_try())
        };

        Self {
            parent,
            state: Arc::new(state),
            mv,
            score: 0.0,
            simulations: 0,
            size: 0,
            terminal,
            children: SmallVec::new(),
            untried,
        }
    }

    /// Create a root node.
    pub fn root(state: S) -> Self {
        Self::new(None, state, None)
    }

    /// Parent node, if this is not the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Game state at this node.
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    pub(crate) fn shared_state(&self) -> &Arc<S> {
        &self.state
    }

    /// Move that led here (`None` for a root built from an initial state).
    #[must_use]
    pub fn mv(&self) -> Option<&S::Move> {
        self.mv.as_ref()
    }

    /// Cumulative player-1 score.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Number of rollouts counted here.
    #[must_use]
    pub fn simulations(&self) -> u32 {
        self.simulations
    }

    /// Descendant counter.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Is this a terminal game state?
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Terminal, or every move has been expanded.
    #[must_use]
    pub fn is_fully_expanded(&self) -> bool {
        self.terminal || self.untried.is_empty()
    }

    /// Expanded children in expansion order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Moves still waiting to be expanded.
    pub fn untried(&self) -> impl Iterator<Item = &S::Move> + '_ {
        self.untried.iter()
    }

    /// Mean score seen from one side.
    ///
    /// `player1_view == false` inverts the stored player-1 score. `None` if
    /// no rollout has been counted yet.
    #[must_use]
    pub fn win_rate(&self, player1_view: bool) -> Option<f64> {
        if self.simulations == 0 {
            return None;
        }
        let raw = self.score / self.simulations as f64;
        Some(if player1_view { raw } else { 1.0 - raw })
    }
}

fn distinct_actions<M: PartialEq + std::fmt::Display>(actions: VecDeque<M>) -> VecDeque<M> {
    let mut distinct = VecDeque::with_capacity(actions.len());
    for action in actions {
        if distinct.contains(&action) {
            warn!(%action, "duplicate action from actions_to_try dropped");
        } else {
            distinct.push_back(action);
        }
    }
    distinct
}
