//! Game capability traits for search.
//!
//! Games implement `GameState` (and provide a `GameMove` type) to define:
//! - Which moves are worth trying from a position
//! - How a move produces the next position
//! - Terminal detection and randomized playouts
//!
//! The search engine calls into these traits but never interprets
//! game-specific concepts directly.

use std::collections::VecDeque;
use std::fmt;

use crate::core::SimRng;

/// A move in some game.
///
/// Moves are opaque to the engine. Equality matches an externally supplied
/// move against the children of the root when the tree is advanced, and
/// `Display` renders it for diagnostics. Rendering must be stable: the same
/// move renders identically on every call.
pub trait GameMove: Clone + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static {}

impl<T> GameMove for T where
    T: Clone + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static
{
}

/// A two-player game position.
///
/// Scores are always reported from player 1's point of view: `1.0` means
/// player 1 wins, `0.0` means player 1 loses, `0.5` is a draw or unknown.
///
/// ## Implementation Notes
///
/// - `actions_to_try`: Consumed front to back; order it best-first if the
///   game has a move-ordering heuristic
/// - `next_state`: Must not mutate `self`; return `None` for illegal moves
/// - `rollout`: Called from worker threads on a shared `&self`, possibly
///   several times concurrently; copy before simulating
/// - `is_terminal`: Evaluated once per node and cached
pub trait GameState: Send + Sync + Sized + 'static {
    /// Move type of this game.
    type Move: GameMove;

    /// Moves to consider from this position, in the order they should be
    /// expanded.
    fn actions_to_try(&self) -> VecDeque<Self::Move>;

    /// Position reached by playing `mv`.
    ///
    /// Returns `None` if `mv` is illegal here.
    fn next_state(&self, mv: &Self::Move) -> Option<Self>;

    /// Play one randomized game out from this position.
    ///
    /// Returns player 1's win probability in `[0, 1]`.
    fn rollout(&self, rng: &mut SimRng) -> f64;

    /// Is the game over?
    fn is_terminal(&self) -> bool;

    /// Is player 1 to move?
    fn player1_turn(&self) -> bool;
}
