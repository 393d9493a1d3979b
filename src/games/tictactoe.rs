//! Tic-Tac-Toe on a 3x3 board.
//!
//! `X` moves first and is player 1 for the search. Rollouts play uniformly
//! random moves to the end and score 1.0 for an `X` win, 0.5 for a draw and
//! 0.0 for an `O` win.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::SimRng;
use crate::rules::GameState;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// A player's mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The other player's mark.
    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "x"),
            Mark::O => write!(f, "o"),
        }
    }
}

/// Result of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win(Mark),
    Draw,
}

impl Outcome {
    /// Rollout value for player 1 (`X`).
    #[must_use]
    pub fn score(self) -> f64 {
        match self {
            Outcome::Win(Mark::X) => 1.0,
            Outcome::Draw => 0.5,
            Outcome::Win(Mark::O) => 0.0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win(mark) => write!(f, "{} wins", mark),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

/// Placing `mark` at (`row`, `col`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicTacToeMove {
    pub row: u8,
    pub col: u8,
    pub mark: Mark,
}

impl TicTacToeMove {
    pub fn new(row: u8, col: u8, mark: Mark) -> Self {
        Self { row, col, mark }
    }

    fn cell(&self) -> Option<usize> {
        (self.row < 3 && self.col < 3).then(|| usize::from(self.row) * 3 + usize::from(self.col))
    }
}

impl fmt::Display for TicTacToeMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.mark, self.row, self.col)
    }
}

/// Board position with the side to move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicTacToe {
    board: [Option<Mark>; 9],
    turn: Mark,
    outcome: Option<Outcome>,
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToe {
    /// Empty board, `X` to move.
    pub fn new() -> Self {
        Self {
            board: [None; 9],
            turn: Mark::X,
            outcome: None,
        }
    }

    /// Mark at (`row`, `col`), `None` if empty or off the board.
    #[must_use]
    pub fn mark_at(&self, row: u8, col: u8) -> Option<Mark> {
        TicTacToeMove::new(row, col, self.turn)
            .cell()
            .and_then(|cell| self.board[cell])
    }

    /// Side to move.
    #[must_use]
    pub fn turn(&self) -> Mark {
        self.turn
    }

    /// Result, once the game is over.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Legal moves for the side to move, in board order.
    pub fn legal_moves(&self) -> impl Iterator<Item = TicTacToeMove> + '_ {
        let turn = self.turn;
        let finished = self.outcome.is_some();
        self.board
            .iter()
            .enumerate()
            .filter(move |(_, mark)| !finished && mark.is_none())
            .map(move |(cell, _)| TicTacToeMove::new((cell / 3) as u8, (cell % 3) as u8, turn))
    }

    /// Uniformly random legal move, `None` once the game is over.
    pub fn random_move(&self, rng: &mut SimRng) -> Option<TicTacToeMove> {
        let moves: Vec<TicTacToeMove> = self.legal_moves().collect();
        rng.choose(&moves).copied()
    }

    fn play(&mut self, cell: usize) {
        self.board[cell] = Some(self.turn);
        self.outcome = self.calculate_outcome();
        self.turn = self.turn.opponent();
    }

    fn calculate_outcome(&self) -> Option<Outcome> {
        for line in LINES {
            if let Some(mark) = self.board[line[0]] {
                if line.iter().all(|&cell| self.board[cell] == Some(mark)) {
                    return Some(Outcome::Win(mark));
                }
            }
        }
        if self.board.iter().all(Option::is_some) {
            return Some(Outcome::Draw);
        }
        None
    }
}

impl GameState for TicTacToe {
    type Move = TicTacToeMove;

    fn actions_to_try(&self) -> VecDeque<TicTacToeMove> {
        self.legal_moves().collect()
    }

    fn next_state(&self, mv: &TicTacToeMove) -> Option<Self> {
        if self.outcome.is_some() || mv.mark != self.turn {
            return None;
        }
        let cell = mv.cell()?;
        if self.board[cell].is_some() {
            return None;
        }
        let mut next = self.clone();
        next.play(cell);
        Some(next)
    }

    fn rollout(&self, rng: &mut SimRng) -> f64 {
        let mut state = self.clone();
        let mut empty: Vec<usize> = (0..9).filter(|&cell| state.board[cell].is_none()).collect();
        loop {
            if let Some(outcome) = state.outcome {
                return outcome.score();
            }
            if empty.is_empty() {
                return Outcome::Draw.score();
            }
            let pick = rng.gen_index(empty.len());
            state.play(empty.swap_remove(pick));
        }
    }

    fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    fn player1_turn(&self) -> bool {
        self.turn == Mark::X
    }
}

impl fmt::Display for TicTacToe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            if row > 0 {
                writeln!(f, "---+---+---")?;
            }
            let cells: Vec<String> = (0..3)
                .map(|col| match self.board[row * 3 + col] {
                    Some(mark) => mark.to_string(),
                    None => " ".to_string(),
                })
                .collect();
            writeln!(f, " {} | {} | {}", cells[0], cells[1], cells[2])?;
        }
        Ok(())
    }
}
