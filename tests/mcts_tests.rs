//! Search integration tests using Tic-Tac-Toe.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use uct_engine::games::{Mark, TicTacToe, TicTacToeMove};
use uct_engine::mcts::{uct_value, Advance, MCTSAgent, MCTSError, NodeId, SearchConfig, SearchTree};
use uct_engine::scheduler::JobScheduler;
use uct_engine::GameState;

fn play_all(moves: &[(u8, u8)]) -> TicTacToe {
    moves.iter().fold(TicTacToe::new(), |state, &(row, col)| {
        let mv = TicTacToeMove::new(row, col, state.turn());
        state.next_state(&mv).unwrap()
    })
}

fn search_tree(state: TicTacToe, config: &SearchConfig) -> SearchTree<TicTacToe> {
    let scheduler = Arc::new(JobScheduler::new(config.worker_threads).unwrap());
    SearchTree::new(state, scheduler, config).unwrap()
}

// =============================================================================
// Growth
// =============================================================================

#[test]
fn test_grow_tree_counts() {
    let config = SearchConfig::default()
        .with_workers(2)
        .with_rollouts_per_expansion(3);
    let mut tree = search_tree(TicTacToe::new(), &config);

    let stats = tree.grow_tree(40, f64::INFINITY).clone();

    assert_eq!(stats.iterations, 40);
    assert_eq!(stats.nodes_expanded, 40);
    assert_eq!(stats.simulations, 120);
    assert!(stats.elapsed > Duration::ZERO);
    assert!(stats.rollout_rate() > 0.0);
    assert!(stats.rollout_rate() >= stats.iteration_rate());
    assert_eq!(tree.size(), 40);
    assert_eq!(tree.tree().len(), 41);
    assert_eq!(tree.node(tree.root_id()).simulations(), 120);
}

#[test]
fn test_root_children_expanded_first() {
    let config = SearchConfig::default().with_workers(2);
    let mut tree = search_tree(TicTacToe::new(), &config);

    tree.grow_tree(9, f64::INFINITY);

    let root = tree.node(tree.root_id());
    assert_eq!(root.children().len(), 9);
    assert!(root.is_fully_expanded());
    for &child in root.children() {
        assert!(tree.node(child).children().is_empty());
    }
}

#[test]
fn test_search_deterministic_with_seed() {
    let config = SearchConfig::default().with_workers(3).with_seed(12345);
    let mut first = search_tree(TicTacToe::new(), &config);
    let mut second = search_tree(TicTacToe::new(), &config);

    first.grow_tree(150, f64::INFINITY);
    second.grow_tree(150, f64::INFINITY);

    let summary = |tree: &SearchTree<TicTacToe>| -> Vec<(TicTacToeMove, f64, u32)> {
        tree.node(tree.root_id())
            .children()
            .iter()
            .map(|&id| {
                let child = tree.node(id);
                (*child.mv().unwrap(), child.score(), child.simulations())
            })
            .collect()
    };
    assert_eq!(summary(&first), summary(&second));
}

#[test]
fn test_time_budget_stops_search() {
    let config = SearchConfig::default().with_workers(2);
    let mut tree = search_tree(TicTacToe::new(), &config);

    let stats = tree.grow_tree(u32::MAX, 0.0);

    assert_eq!(stats.iterations, 1);
}

#[test]
fn test_winning_move_found() {
    // x x _ / o o _ / _ _ _, x to move
    let state = play_all(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
    let config = SearchConfig::default().with_workers(2);
    let mut tree = search_tree(state, &config);

    tree.grow_tree(300, f64::INFINITY);

    let best = tree.select_best_child().unwrap();
    assert_eq!(tree.node(best).mv(), Some(&TicTacToeMove::new(0, 2, Mark::X)));
    assert_eq!(tree.node(best).win_rate(true), Some(1.0));
}

#[test]
fn test_winning_move_found_for_o() {
    // o o _ / x x _ / x _ _, o to move
    let state = play_all(&[(1, 0), (0, 0), (1, 1), (0, 1), (2, 0)]);
    let config = SearchConfig::default().with_workers(2);
    let mut tree = search_tree(state, &config);

    tree.grow_tree(300, f64::INFINITY);

    let best = tree.select_best_child().unwrap();
    assert_eq!(tree.node(best).mv(), Some(&TicTacToeMove::new(0, 2, Mark::O)));
}

#[test]
fn test_terminal_root_only_rolls_out() {
    let state = play_all(&[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
    let config = SearchConfig::default()
        .with_workers(2)
        .with_rollouts_per_expansion(2);
    let mut tree = search_tree(state, &config);

    let stats = tree.grow_tree(5, f64::INFINITY).clone();

    assert_eq!(stats.nodes_expanded, 0);
    assert_eq!(tree.tree().len(), 1);
    let root = tree.node(tree.root_id());
    assert_eq!(root.simulations(), 10);
    assert_eq!(root.win_rate(true), Some(1.0));
}

// =============================================================================
// Advancing
// =============================================================================

#[test]
fn test_advance_keeps_explored_subtree() {
    let config = SearchConfig::default().with_workers(2);
    let mut tree = search_tree(TicTacToe::new(), &config);
    tree.grow_tree(100, f64::INFINITY);

    let center = TicTacToeMove::new(1, 1, Mark::X);
    let child = tree
        .node(tree.root_id())
        .children()
        .iter()
        .copied()
        .find(|&id| tree.node(id).mv() == Some(&center))
        .unwrap();
    let sims = tree.node(child).simulations();
    let size = tree.node(child).size();

    let advance = tree.advance_tree(&center).unwrap();

    assert_eq!(advance, Advance::Reused(child));
    assert_eq!(tree.root_id(), child);
    assert_eq!(tree.node(child).simulations(), sims);
    assert_eq!(tree.size(), size);
    assert_eq!(tree.tree().len(), size as usize + 1);
    assert!(tree.node(child).parent().is_none());
    assert_eq!(tree.current_state().turn(), Mark::O);
}

#[test]
fn test_advance_unexplored_move_restarts() {
    let config = SearchConfig::default().with_workers(2);
    let mut tree = search_tree(TicTacToe::new(), &config);

    let mv = TicTacToeMove::new(2, 2, Mark::X);
    let advance = tree.advance_tree(&mv).unwrap();

    assert!(matches!(advance, Advance::Restarted(_)));
    assert_eq!(tree.tree().len(), 1);
    assert_eq!(tree.node(tree.root_id()).mv(), Some(&mv));
    assert_eq!(tree.current_state().mark_at(2, 2), Some(Mark::X));
}

#[test]
fn test_restart_after_growth_reuses_arena() {
    let config = SearchConfig::default().with_workers(2);
    let mut tree = search_tree(TicTacToe::new(), &config);
    tree.grow_tree(3, f64::INFINITY);

    // Only the first three cells were expanded
    let mv = TicTacToeMove::new(2, 2, Mark::X);
    let advance = tree.advance_tree(&mv).unwrap();

    assert_eq!(advance, Advance::Restarted(NodeId::new(0)));
    assert_eq!(tree.tree().len(), 1);
    assert_eq!(tree.size(), 0);
    assert_eq!(tree.node(tree.root_id()).simulations(), 0);
    assert!(tree.node(tree.root_id()).children().is_empty());
    assert_eq!(tree.current_state().turn(), Mark::O);

    tree.grow_tree(20, f64::INFINITY);

    assert_eq!(tree.tree().len(), 21);
    assert_eq!(tree.size(), 20);
    assert_eq!(tree.node(tree.root_id()).simulations(), 40);
    assert_eq!(tree.node(tree.root_id()).children().len(), 8);
}

#[test]
fn test_advance_illegal_move_leaves_tree() {
    let config = SearchConfig::default().with_workers(2);
    let mut tree = search_tree(TicTacToe::new(), &config);
    tree.grow_tree(20, f64::INFINITY);
    let root = tree.root_id();

    let result = tree.advance_tree(&TicTacToeMove::new(0, 0, Mark::O));

    assert!(matches!(result, Err(MCTSError::IllegalMove(_))));
    assert_eq!(tree.root_id(), root);
    assert_eq!(tree.size(), 20);
}

// =============================================================================
// Agent
// =============================================================================

#[test]
fn test_agent_plays_full_game() {
    let config = SearchConfig::default()
        .with_workers(2)
        .with_budget(200, 10.0);
    let mut agent = MCTSAgent::new(TicTacToe::new(), &config).unwrap();
    let mut opponent_move: Option<TicTacToeMove> = None;
    let mut plies = 0;

    while let Some(mv) = agent.genmove(opponent_move.as_ref()).unwrap() {
        assert_eq!(mv.mark, Mark::X);
        plies += 1;
        // Opponent always takes the first free cell
        opponent_move = agent.current_state().legal_moves().next();
        if opponent_move.is_none() {
            break;
        }
        plies += 1;
    }

    assert!(agent.current_state().is_terminal());
    assert!(plies <= 9);
    assert!(agent.current_state().outcome().is_some());
}

#[test]
fn test_agents_share_scheduler() {
    let scheduler = Arc::new(JobScheduler::new(2).unwrap());
    let config = SearchConfig::default().with_budget(30, 10.0);
    let mut x =
        MCTSAgent::with_scheduler(TicTacToe::new(), &config, Arc::clone(&scheduler)).unwrap();
    let mut o =
        MCTSAgent::with_scheduler(TicTacToe::new(), &config, Arc::clone(&scheduler)).unwrap();

    let first = x.genmove(None).unwrap().unwrap();
    let reply = o.genmove(Some(&first)).unwrap().unwrap();

    assert_eq!(reply.mark, Mark::O);
    assert_eq!(x.tree().fan_out(), 2);
    assert_eq!(o.current_state().turn(), Mark::X);
}

#[test]
fn test_report_lists_best_moves() {
    let config = SearchConfig::default().with_workers(2);
    let mut tree = search_tree(TicTacToe::new(), &config);
    tree.grow_tree(60, f64::INFINITY);

    let report = tree.report(3);
    let text = report.to_string();

    assert_eq!(report.top.len(), 3);
    assert!(report.top[0].win_rate >= report.top[1].win_rate);
    assert!(report.top[1].win_rate >= report.top[2].win_rate);
    assert!(text.contains("Best moves:"));
    assert!(text.contains(&report.top[0].mv.to_string()));
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_simulations_conserved(iterations in 1u32..60, fan_out in 1usize..5) {
        let config = SearchConfig::default()
            .with_workers(2)
            .with_rollouts_per_expansion(fan_out);
        let mut tree = search_tree(TicTacToe::new(), &config);

        tree.grow_tree(iterations, f64::INFINITY);

        let root = tree.node(tree.root_id());
        let child_sims: u32 = root.children().iter().map(|&id| tree.node(id).simulations()).sum();
        prop_assert_eq!(root.simulations(), iterations * fan_out as u32);
        prop_assert_eq!(child_sims, root.simulations());
        prop_assert_eq!(tree.size() as usize, tree.tree().len() - 1);
    }

    #[test]
    fn prop_win_rates_bounded(iterations in 1u32..60) {
        let config = SearchConfig::default().with_workers(2);
        let mut tree = search_tree(TicTacToe::new(), &config);

        tree.grow_tree(iterations, f64::INFINITY);

        for (_, node) in tree.tree().iter() {
            if let Some(rate) = node.win_rate(true) {
                prop_assert!((0.0..=1.0).contains(&rate));
            }
            prop_assert!(node.score() <= f64::from(node.simulations()));
        }
    }

    #[test]
    fn prop_uct_grows_with_parent_visits(
        win_rate in 0.0f64..=1.0,
        child in 1u32..1_000,
        extra in 1u32..1_000,
        c in 0.1f64..3.0,
    ) {
        let parent = child + extra;
        let wider = uct_value(win_rate, parent + 1, child, c);
        prop_assert!(wider > uct_value(win_rate, parent, child, c));
        prop_assert!(uct_value(win_rate, parent, child, c) >= win_rate);
    }
}
