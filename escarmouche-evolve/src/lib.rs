//! Escarmouche Evolve - Genetic search for balanced cost models
//!
//! This crate provides the balance search:
//! - Gene layout and per-gene bounds of the 8-parameter cost model
//! - Selection (tournament) and elitism
//! - Uniform crossover and bounded mutation
//! - The generation state machine over a pluggable fitness oracle
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: evolve, Evolver::run (orchestration)
//! - Level 2: evaluate, reproduce (phases)
//! - Level 3: tournament_select, crossover, mutate (operators)
//! - Level 4: genes, bounds, configuration

mod config;
mod crossover;
mod error;
mod evolver;
mod genome;
mod mutation;
mod oracle;
mod selection;
mod stats;

pub use config::EvolutionConfig;
pub use crossover::crossover;
pub use error::EvolveError;
pub use evolver::{EvolutionResult, Evolver, Phase};
pub use genome::{in_bounds, Gene, GeneBounds, Individual, Range};
pub use mutation::mutate;
pub use oracle::{FitnessOracle, TournamentOracle};
pub use selection::{select_elite, tournament_select};
pub use stats::GenerationStats;

use escarmouche_core::CancelToken;

/// Run a full balance search and return the best cost model seen
pub fn evolve<O: FitnessOracle>(
    config: EvolutionConfig,
    oracle: O,
    seed: u64,
    cancel: &CancelToken,
) -> Result<EvolutionResult, EvolveError> {
    Evolver::new(config, oracle, seed)?.run(cancel, |_| {})
}
