//! Match runner: turn order, action budget, termination
//!
//! A [`Game`] is an iterator of [`Step`]s, one per action slot. It ends after
//! yielding the terminal step, and cannot be restarted.

use crate::action::Action;
use crate::board::{Position, BOARD_SIZE};
use crate::cancel::CancelToken;
use crate::state::{GameState, StateError};
use crate::strategy::Strategy;
use crate::unit::{Player, Unit};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Actions granted per turn
pub const ACTIONS_PER_TURN: u8 = 2;

/// Turn limit before the match is decided on remaining health
pub const DEFAULT_MAX_TURNS: u32 = 100;

/// Starting rows of the two squads
const HOME_ROWS: [i8; 2] = [0, BOARD_SIZE - 1];

// ============================================================================
// TYPES
// ============================================================================

/// Match configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOptions {
    pub max_turns: u32,
    pub actions_per_turn: u8,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            actions_per_turn: ACTIONS_PER_TURN,
        }
    }
}

impl GameOptions {
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }
}

/// Match status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Over { winner: Player },
}

/// What happened in one action slot
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub turn: u32,
    pub player: Player,
    /// `None` when no unit of the player could act, or on a turn-limit step
    pub action: Option<Action>,
    pub is_over: bool,
    pub winner: Option<Player>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("{player} fields {size} units, more than the {max} starting cells")]
    SquadTooLarge { player: Player, size: usize, max: usize },
    #[error("{0} has no units")]
    EmptySquad(Player),
    #[error("invalid setup: {0}")]
    State(#[from] StateError),
    #[error("game cancelled")]
    Cancelled,
    #[error("game ended without a result after {steps} steps")]
    Unterminated { steps: u32 },
    #[error("game aborted: {0}")]
    Aborted(String),
}

// ============================================================================
// TERMINATION
// ============================================================================

/// Winner if one side has no units left
pub fn elimination_winner(state: &GameState) -> Option<Player> {
    let one = state.unit_count(Player::One);
    let two = state.unit_count(Player::Two);
    match (one, two) {
        (0, 0) => None,
        (_, 0) => Some(Player::One),
        (0, _) => Some(Player::Two),
        _ => None,
    }
}

/// Side with more health left. Ties go to `Player::One`.
pub fn health_winner(state: &GameState) -> Player {
    if state.total_health(Player::Two) > state.total_health(Player::One) {
        Player::Two
    } else {
        Player::One
    }
}

// ============================================================================
// GAME
// ============================================================================

/// A match between two squads driven by two strategies
pub struct Game {
    state: GameState,
    order: [Player; 2],
    strategies: [Box<dyn Strategy>; 2],
    options: GameOptions,
    turn: u32,
    action_index: u8,
    status: GameStatus,
    finished: bool,
    cancel: Option<CancelToken>,
}

impl Game {
    /// Set up a match: squads on opposite home rows at shuffled columns,
    /// turn order shuffled. `strategies` are indexed by player.
    pub fn new<R: Rng>(
        squad_one: &[Unit],
        squad_two: &[Unit],
        strategies: [Box<dyn Strategy>; 2],
        options: GameOptions,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let mut placements = Vec::with_capacity(squad_one.len() + squad_two.len());
        for (player, squad) in [(Player::One, squad_one), (Player::Two, squad_two)] {
            if squad.is_empty() {
                return Err(GameError::EmptySquad(player));
            }
            let max = BOARD_SIZE as usize;
            if squad.len() > max {
                return Err(GameError::SquadTooLarge { player, size: squad.len(), max });
            }

            let mut columns: Vec<i8> = (0..BOARD_SIZE).collect();
            columns.shuffle(rng);
            let row = HOME_ROWS[player.index()];
            for (unit, &x) in squad.iter().zip(&columns) {
                placements.push((player, unit.clone(), Position::new(x, row)));
            }
        }

        let mut order = Player::BOTH;
        order.shuffle(rng);

        Ok(Self::from_state(GameState::new(&placements)?, order, strategies, options))
    }

    /// Start from an existing state with a fixed turn order
    pub fn from_state(
        state: GameState,
        order: [Player; 2],
        strategies: [Box<dyn Strategy>; 2],
        options: GameOptions,
    ) -> Self {
        let status = match elimination_winner(&state) {
            Some(winner) => GameStatus::Over { winner },
            None => GameStatus::InProgress,
        };
        Self {
            state,
            order,
            strategies,
            options,
            turn: 0,
            action_index: 0,
            status,
            finished: false,
            cancel: None,
        }
    }

    /// Stop yielding steps once `token` is cancelled
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Turns started so far
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn order(&self) -> [Player; 2] {
        self.order
    }

    /// Drive the match to the end and return the winner
    pub fn play_out(&mut self) -> Result<Player, GameError> {
        let mut steps = 0;
        for step in self.by_ref() {
            steps += 1;
            if let Some(winner) = step.winner {
                return Ok(winner);
            }
        }
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(GameError::Cancelled);
        }
        match self.status {
            GameStatus::Over { winner } => Ok(winner),
            GameStatus::InProgress => Err(GameError::Unterminated { steps }),
        }
    }

    fn finish(&mut self, player: Player, action: Option<Action>, winner: Player) -> Step {
        self.status = GameStatus::Over { winner };
        self.finished = true;
        Step {
            turn: self.turn,
            player,
            action,
            is_over: true,
            winner: Some(winner),
        }
    }
}

impl Iterator for Game {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if self.finished {
            return None;
        }
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            self.finished = true;
            return None;
        }

        let player = self.order[(self.turn % 2) as usize];
        if let GameStatus::Over { winner } = self.status {
            return Some(self.finish(player, None, winner));
        }
        if self.turn >= self.options.max_turns {
            let winner = health_winner(&self.state);
            return Some(self.finish(player, None, winner));
        }

        if self.action_index == 0 {
            self.state.begin_turn(player, self.options.actions_per_turn);
        }

        let action = self.strategies[player.index()].select_action(&self.state, player);
        if let Some(action) = &action {
            self.state = action.apply(&self.state);
        }
        self.state.consume_action();

        let step_turn = self.turn;
        self.action_index += 1;
        if self.action_index >= self.options.actions_per_turn {
            self.action_index = 0;
            self.turn += 1;
        }

        if let Some(winner) = elimination_winner(&self.state) {
            let mut step = self.finish(player, action, winner);
            step.turn = step_turn;
            return Some(step);
        }

        Some(Step {
            turn: step_turn,
            player,
            action,
            is_over: false,
            winner: None,
        })
    }
}
