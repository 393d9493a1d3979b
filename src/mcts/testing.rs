//! Scripted game used by the search unit tests.

use std::collections::VecDeque;
use std::fmt;

use crate::core::SimRng;
use crate::rules::GameState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pick(pub u32);

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pick-{}", self.0)
    }
}

/// Game lasting `remaining` plies with `branching` moves per ply and a fixed
/// rollout value.
#[derive(Clone, Debug, PartialEq)]
pub struct CountdownState {
    pub remaining: u32,
    pub branching: u32,
    pub player1: bool,
    pub value: f64,
    first_move: Option<u32>,
    favored: Option<u32>,
    duplicate_actions: bool,
    rollout_panics: bool,
}

impl CountdownState {
    pub fn new(remaining: u32, branching: u32) -> Self {
        Self {
            remaining,
            branching,
            player1: true,
            value: 0.5,
            first_move: None,
            favored: None,
            duplicate_actions: false,
            rollout_panics: false,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    /// Rollouts below first move `favored` always win for player 1.
    pub fn with_favored_move(mut self, favored: u32) -> Self {
        self.favored = Some(favored);
        self
    }

    pub fn with_player2_to_move(mut self) -> Self {
        self.player1 = false;
        self
    }

    pub fn with_duplicate_actions(mut self) -> Self {
        self.duplicate_actions = true;
        self
    }

    pub fn with_rollout_panic(mut self) -> Self {
        self.rollout_panics = true;
        self
    }
}

impl GameState for CountdownState {
    type Move = Pick;

    fn actions_to_try(&self) -> VecDeque<Pick> {
        let mut actions: VecDeque<Pick> = (0..self.branching).map(Pick).collect();
        if self.duplicate_actions {
            actions.extend((0..self.branching).map(Pick));
        }
        actions
    }

    fn next_state(&self, mv: &Pick) -> Option<Self> {
        if self.remaining == 0 || mv.0 >= self.branching {
            return None;
        }
        Some(Self {
            remaining: self.remaining - 1,
            player1: !self.player1,
            first_move: self.first_move.or(Some(mv.0)),
            ..self.clone()
        })
    }

    fn rollout(&self, _rng: &mut SimRng) -> f64 {
        if self.rollout_panics {
            panic!("rollout failed");
        }
        match (self.favored, self.first_move) {
            (Some(favored), Some(first)) if favored == first => 1.0,
            _ => self.value,
        }
    }

    fn is_terminal(&self) -> bool {
        self.remaining == 0
    }

    fn player1_turn(&self) -> bool {
        self.player1
    }
}
