//! Game runner - executes single games
//!
//! Level 3 - Step-level implementation

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use escarmouche_core::game::{elimination_winner, health_winner};
use escarmouche_core::{CancelToken, Game, GameError, Player, SimContext, Unit};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::TournamentConfig;

/// How a finished game was decided
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The loser has no units left
    Elimination,
    /// Turn limit or step cap reached; more remaining health wins
    Health,
}

/// Outcome of a single game
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOutcome {
    pub winner: Player,
    pub decision: Decision,
    /// Action slots played
    pub steps: u32,
    /// Turns started
    pub turns: u32,
}

/// Plays matches between squads under one tournament configuration
#[derive(Clone, Debug)]
pub struct GameRunner {
    ctx: Arc<SimContext>,
    config: TournamentConfig,
}

impl GameRunner {
    pub fn new(ctx: Arc<SimContext>, config: TournamentConfig) -> Self {
        Self { ctx, config }
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    /// Play `first` (as player one) against `second` until a winner is known.
    ///
    /// The match is abandoned with [`GameError::Cancelled`] once `cancel`
    /// trips; the token is checked between actions.
    pub fn play(
        &self,
        first: &[Unit],
        second: &[Unit],
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<GameOutcome, GameError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let strategies = [
            self.config.ai.first.build(self.ctx.clone(), rng.gen()),
            self.config.ai.second.build(self.ctx.clone(), rng.gen()),
        ];
        let mut game = Game::new(first, second, strategies, self.config.game, &mut rng)?
            .with_cancel(cancel.clone());

        let mut steps = 0;
        while let Some(step) = game.next() {
            steps += 1;
            if step.is_over {
                let winner = step
                    .winner
                    .ok_or(GameError::Unterminated { steps })?;
                let decision = if elimination_winner(game.state()).is_some() {
                    Decision::Elimination
                } else {
                    Decision::Health
                };
                return Ok(GameOutcome { winner, decision, steps, turns: game.turn() });
            }
            if steps >= self.config.max_sim_steps {
                return Ok(GameOutcome {
                    winner: health_winner(game.state()),
                    decision: Decision::Health,
                    steps,
                    turns: game.turn(),
                });
            }
        }

        if cancel.is_cancelled() {
            Err(GameError::Cancelled)
        } else {
            Err(GameError::Unterminated { steps })
        }
    }

    /// Like [`GameRunner::play`], but a panic inside the match becomes
    /// [`GameError::Aborted`]
    pub fn play_guarded(
        &self,
        first: &[Unit],
        second: &[Unit],
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<GameOutcome, GameError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.play(first, second, seed, cancel)))
            .unwrap_or_else(|payload| Err(GameError::Aborted(panic_message(payload))))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic".to_string()
    }
}
