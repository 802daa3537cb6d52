//! Escarmouche Tournament - Squad balance measured by round-robin play
//!
//! This crate provides the tournament infrastructure:
//! - Single matches with a step cap and health tiebreak
//! - Parallel round robin over a bounded worker pool
//! - Win-share concentration (HHI)
//! - Fitness of a cost model from freshly generated squads
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_round_robin, FitnessEvaluator::evaluate (orchestration)
//! - Level 2: dispatch, worker loop, tally (phases)
//! - Level 3: GameRunner::play (steps)
//! - Level 4: utilities, configuration

mod config;
mod error;
mod fitness;
mod game_runner;
mod tournament;

pub use config::{AiConfig, EvalConfig, TournamentConfig, DEFAULT_MAX_SIM_STEPS};
pub use error::TournamentError;
pub use fitness::{herfindahl_index, FitnessEvaluator, FitnessResult};
pub use game_runner::{Decision, GameOutcome, GameRunner};
pub use tournament::{pairings, run_round_robin, worker_count, SquadRecord, TournamentResult};
