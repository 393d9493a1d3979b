//! Arena-based search tree.
//!
//! Nodes are stored in a flat `Vec` and referenced by `NodeId` indices.
//! Pruned subtrees return their slots to a free list, so ids of surviving
//! nodes stay valid across `advance`.

use smallvec::SmallVec;
use tracing::info;

use super::node::{MCTSNode, NodeId};
use super::search::MCTSError;
use crate::rules::GameState;

/// How `MCTSTree::advance` obtained the new root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// An explored child matched the move and kept its statistics.
    Reused(NodeId),
    /// No child matched; a fresh root was built from the successor state.
    Restarted(NodeId),
}

impl Advance {
    /// The new root.
    #[must_use]
    pub fn root(self) -> NodeId {
        match self {
            Advance::Reused(id) | Advance::Restarted(id) => id,
        }
    }
}

/// Arena-based search tree.
///
/// Owns every node; a node's children and parent are arena indices. The
/// tree always has exactly one root.
#[derive(Debug)]
pub struct MCTSTree<S: GameState> {
    /// Node slots; `None` marks a released slot.
    nodes: Vec<Option<MCTSNode<S>>>,

    /// Released slots available for reuse.
    free: Vec<NodeId>,

    /// The root node ID.
    root: NodeId,

    /// Number of live nodes.
    live: usize,
}

impl<S: GameState> MCTSTree<S> {
    /// Create a new tree whose root holds `state`.
    pub fn new(state: S) -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(1024),
            free: Vec::new(),
            root: NodeId::new(0),
            live: 0,
        };
        tree.root = tree.alloc(MCTSNode::root(state));
        tree
    }

    /// Get the root node ID.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get the root node.
    #[must_use]
    pub fn root_node(&self) -> &MCTSNode<S> {
        self.get(self.root)
    }

    /// Get a node by ID.
    ///
    /// Panics if `id` was released by a previous `advance`.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &MCTSNode<S> {
        match self.nodes.get(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("{} is not a live node", id),
        }
    }

    /// Get a mutable node by ID.
    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut MCTSNode<S> {
        match self.nodes.get_mut(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("{} is not a live node", id),
        }
    }

    /// Is `id` a live node of this tree?
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.index()), Some(Some(_)))
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Never true; a tree always has its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Allocate a node, returning its ID.
    fn alloc(&mut self, node: MCTSNode<S>) -> NodeId {
        self.live += 1;
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = Some(node);
                id
            }
            None => {
                let id = NodeId::new(self.nodes.len() as u32);
                self.nodes.push(Some(node));
                id
            }
        }
    }

    /// Allocate `node` and append it to `parent`'s children.
    pub(crate) fn add_child(&mut self, parent: NodeId, node: MCTSNode<S>) -> NodeId {
        let id = self.alloc(node);
        self.get_mut(parent).children.push(id);
        id
    }

    /// Release `id` and everything below it.
    fn release_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes[id.index()].take() {
                stack.extend(node.children.iter().copied());
                self.free.push(id);
                self.live -= 1;
            }
        }
    }

    /// Add `score` and `simulations` to `id` and every ancestor.
    ///
    /// Each ancestor's size counter grows by one.
    pub(crate) fn backpropagate(&mut self, id: NodeId, score: f64, simulations: u32) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.get_mut(node_id);
            node.score += score;
            node.simulations += simulations;
            current = node.parent;
            if let Some(parent) = current {
                self.get_mut(parent).size += 1;
            }
        }
    }

    /// Make the subtree reached by `mv` the new root.
    ///
    /// Every other child of the root is released with its subtree. If no
    /// child was reached by `mv`, the whole tree is replaced by a fresh root
    /// holding the successor state; if the game rejects `mv`, nothing
    /// changes and `MCTSError::IllegalMove` is returned.
    pub fn advance(&mut self, mv: &S::Move) -> Result<Advance, MCTSError> {
        let old_root = self.root;
        let matching = self
            .get(old_root)
            .children
            .iter()
            .copied()
            .find(|&child| self.get(child).mv() == Some(mv));

        match matching {
            Some(next) => {
                let siblings: SmallVec<[NodeId; 8]> =
                    std::mem::take(&mut self.get_mut(old_root).children);
                for child in siblings {
                    if child != next {
                        self.release_subtree(child);
                    }
                }
                self.release_subtree(old_root);
                self.get_mut(next).parent = None;
                self.root = next;
                Ok(Advance::Reused(next))
            }
            None => {
                let state = self
                    .get(old_root)
                    .state()
                    .next_state(mv)
                    .ok_or_else(|| MCTSError::IllegalMove(mv.to_string()))?;
                info!(%mv, "move was not explored; starting a fresh tree");
                self.nodes.clear();
                self.free.clear();
                self.live = 0;
                self.root = self.alloc(MCTSNode::new(None, state, Some(mv.clone())));
                Ok(Advance::Restarted(self.root))
            }
        }
    }

    /// Get statistics about the tree.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            node_count: self.live,
            ..TreeStats::default()
        };

        let mut stack = vec![(self.root, 0u32)];
        while let Some((id, depth)) = stack.pop() {
            let node = self.get(id);
            stats.max_depth = stats.max_depth.max(depth);
            if node.is_terminal() {
                stats.terminal_count += 1;
            }
            if !node.is_fully_expanded() {
                stats.frontier_count += 1;
            }
            stack.extend(node.children.iter().map(|&child| (child, depth + 1)));
        }

        stats
    }

    /// Iterate over all live nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &MCTSNode<S>)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|n| (NodeId::new(i as u32), n)))
    }
}

/// Statistics about the search tree.
#[derive(Clone, Debug, Default)]
pub struct TreeStats {
    /// Total number of live nodes.
    pub node_count: usize,

    /// Deepest node below the root (root = 0).
    pub max_depth: u32,

    /// Number of terminal nodes.
    pub terminal_count: usize,

    /// Nodes that still have untried moves.
    pub frontier_count: usize,
}
