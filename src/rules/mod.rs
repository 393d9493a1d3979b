//! Game interface for search.
//!
//! Games implement `GameState` to define:
//! - Candidate moves for each position
//! - How moves produce new positions
//! - Terminal detection and rollouts
//!
//! The search engine is generic over `GameState` and never interprets
//! game-specific concepts directly.

pub mod state;

pub use state::{GameMove, GameState};
