//! Search statistics and root diagnostics.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::tree::MCTSTree;
use crate::rules::GameState;

/// Counters of the most recent `grow_tree`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    pub iterations: u32,

    /// Children added to the tree.
    pub nodes_expanded: u32,

    /// Rollouts that reported a score.
    pub simulations: u32,

    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

impl SearchStats {
    /// Iterations per second of wall-clock time, 0 before any timing.
    #[must_use]
    pub fn iteration_rate(&self) -> f64 {
        per_second(self.iterations, self.elapsed)
    }

    /// Counted rollouts per second of wall-clock time.
    #[must_use]
    pub fn rollout_rate(&self) -> f64 {
        per_second(self.simulations, self.elapsed)
    }
}

fn per_second(count: u32, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        f64::from(count) / secs
    } else {
        0.0
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} iterations, {} expanded, {} rollouts in {:.1} ms ({:.0} rollouts/s)",
            self.iterations,
            self.nodes_expanded,
            self.simulations,
            self.elapsed.as_secs_f64() * 1_000.0,
            self.rollout_rate()
        )
    }
}

/// One root child in a `TreeReport`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildSummary<M> {
    /// Move leading to the child.
    pub mv: M,

    /// Win-rate for the side to move at the root.
    pub win_rate: f64,

    /// Rollouts counted at the child.
    pub simulations: u32,
}

/// Snapshot of the root for diagnostics.
#[derive(Clone, Debug)]
pub struct TreeReport<M> {
    /// Descendant counter of the root.
    pub size: u32,

    /// Rollouts counted at the root.
    pub simulations: u32,

    /// Number of expanded root children.
    pub branching_factor: usize,

    /// Player 1's win-rate at the root (`None` before any rollout).
    pub player1_win_rate: Option<f64>,

    /// Best root children for the side to move, best first.
    pub top: Vec<ChildSummary<M>>,
}

impl<M: Clone> TreeReport<M> {
    /// Summarize the root of `tree`, keeping the `top_n` best children.
    ///
    /// Children are ranked by the same perspective-aware win-rate used for
    /// final move selection; equal win-rates keep expansion order. Children
    /// without rollouts are left out.
    pub fn from_tree<S>(tree: &MCTSTree<S>, top_n: usize) -> Self
    where
        S: GameState<Move = M>,
    {
        let root = tree.root_node();
        let player1_view = root.state().player1_turn();

        let mut ranked: Vec<ChildSummary<M>> = root
            .children()
            .iter()
            .map(|&id| tree.get(id))
            .filter_map(|child| {
                let win_rate = child.win_rate(player1_view)?;
                Some(ChildSummary {
                    mv: child.mv()?.clone(),
                    win_rate,
                    simulations: child.simulations(),
                })
            })
            .collect();
        ranked.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
        ranked.truncate(top_n);

        Self {
            size: root.size(),
            simulations: root.simulations(),
            branching_factor: root.children().len(),
            player1_win_rate: root.win_rate(true),
            top: ranked,
        }
    }
}

impl<M: fmt::Display> fmt::Display for TreeReport<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tree size:           {}", self.size)?;
        writeln!(f, "Simulations:         {}", self.simulations)?;
        writeln!(f, "Branching factor:    {}", self.branching_factor)?;
        match self.player1_win_rate {
            Some(rate) => writeln!(f, "Player 1 win rate:   {:.2}%", rate * 100.0)?,
            None => writeln!(f, "Player 1 win rate:   n/a")?,
        }
        write!(f, "Best moves:")?;
        for (rank, child) in self.top.iter().enumerate() {
            write!(
                f,
                "\n  {:>2}. {:<12} {:>6.2}% over {} simulations",
                rank + 1,
                child.mv.to_string(),
                child.win_rate * 100.0,
                child.simulations
            )?;
        }
        Ok(())
    }
}
