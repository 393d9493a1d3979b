//! UCT child selection.
//!
//! Scores are stored from player 1's point of view, so a node where player 2
//! is to move ranks its children by the inverted win-rate.

use super::node::NodeId;
use super::tree::MCTSTree;
use crate::rules::GameState;

/// UCT value of a child.
///
/// Formula: `win_rate + c * sqrt(ln(N) / n)` for `c > 0`, plain `win_rate`
/// for `c == 0`.
#[must_use]
pub fn uct_value(win_rate: f64, parent_simulations: u32, child_simulations: u32, c: f64) -> f64 {
    if c > 0.0 {
        win_rate + c * ((parent_simulations as f64).ln() / child_simulations as f64).sqrt()
    } else {
        win_rate
    }
}

/// Pick the child of `id` with the greatest UCT value.
///
/// Returns `None` without children and the sole child without comparing.
/// Ties go to the child expanded first. A child with no counted rollouts
/// is always tried first when `c > 0` and is skipped when `c == 0`.
#[must_use]
pub fn select_best_child<S: GameState>(tree: &MCTSTree<S>, id: NodeId, c: f64) -> Option<NodeId> {
    let node = tree.get(id);
    match node.children() {
        [] => None,
        [only] => Some(*only),
        children => {
            let player1_view = node.state().player1_turn();
            let mut best: Option<(NodeId, f64)> = None;

            for &child_id in children {
                let child = tree.get(child_id);
                let value = match child.win_rate(player1_view) {
                    Some(win_rate) => {
                        uct_value(win_rate, node.simulations(), child.simulations(), c)
                    }
                    None if c > 0.0 => f64::INFINITY,
                    None => continue,
                };
                if best.map_or(true, |(_, best_value)| value > best_value) {
                    best = Some((child_id, value));
                }
            }

            best.map(|(child_id, _)| child_id).or_else(|| children.first().copied())
        }
    }
}
