//! Reference games.
//!
//! Tic-Tac-Toe exercises the engine end to end in tests, benches and the
//! demo.

pub mod tictactoe;

pub use tictactoe::{Mark, Outcome, TicTacToe, TicTacToeMove};
