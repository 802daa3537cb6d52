//! Generation loop: Seed -> Evaluate -> Select/Reproduce -> (repeat | Converged)
//!
//! Level 1 - Orchestration and Level 2 - Phases

use escarmouche_core::CancelToken;
use escarmouche_tournament::TournamentError;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EvolutionConfig;
use crate::crossover::crossover;
use crate::error::EvolveError;
use crate::genome::Individual;
use crate::mutation::mutate;
use crate::oracle::FitnessOracle;
use crate::selection::{select_elite, tournament_select};
use crate::stats::GenerationStats;

/// Where the generation loop stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No population yet
    Seed,
    /// Population bred, waiting to be scored
    Evaluate,
    /// Threshold or generation cap reached
    Converged,
}

/// Outcome of a complete run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Fittest individual seen in any generation
    pub best: Individual,
    pub history: Vec<GenerationStats>,
}

impl EvolutionResult {
    pub fn generations(&self) -> usize {
        self.history.len()
    }
}

/// Evolves cost models against a fitness oracle, one generation per call
pub struct Evolver<O> {
    config: EvolutionConfig,
    oracle: O,
    rng: ChaCha8Rng,
    population: Vec<Individual>,
    generation: usize,
    phase: Phase,
    best: Option<Individual>,
    history: Vec<GenerationStats>,
}

impl<O: FitnessOracle> Evolver<O> {
    pub fn new(config: EvolutionConfig, oracle: O, seed: u64) -> Result<Self, EvolveError> {
        config.validate()?;
        if let Some(squads) = oracle.squads_per_eval() {
            if squads != config.squads_per_eval {
                return Err(EvolveError::InvalidConfig(format!(
                    "oracle generates {squads} squads per evaluation, config asks for {}",
                    config.squads_per_eval
                )));
            }
        }
        Ok(Self {
            config,
            oracle,
            rng: ChaCha8Rng::seed_from_u64(seed),
            population: Vec::new(),
            generation: 0,
            phase: Phase::Seed,
            best: None,
            history: Vec::new(),
        })
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Converged
    }

    /// Generations evaluated so far
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    // ========================================================================
    // Level 1 - Orchestration
    // ========================================================================

    /// Evaluate the current generation and breed the next one.
    ///
    /// The returned stats have `converged` set on the final generation;
    /// calling again after that is [`EvolveError::Finished`].
    pub fn next_generation(&mut self, cancel: &CancelToken) -> Result<GenerationStats, EvolveError> {
        match self.phase {
            Phase::Converged => return Err(EvolveError::Finished),
            Phase::Seed => {
                self.seed_population();
                self.phase = Phase::Evaluate;
            }
            Phase::Evaluate => {}
        }

        self.evaluate_population(cancel)?;

        let mut stats = GenerationStats::from_population(
            self.generation,
            &self.population,
            self.config.convergence_threshold,
        );
        self.track_best();
        self.generation += 1;

        if stats.converged || self.generation >= self.config.max_generations {
            stats.converged = true;
            self.phase = Phase::Converged;
        } else {
            self.population = self.reproduce();
        }

        info!(
            generation = stats.generation,
            best = stats.best,
            average = stats.average,
            worst = stats.worst,
            converged = stats.converged,
            "generation evaluated"
        );
        self.history.push(stats.clone());
        Ok(stats)
    }

    /// Run until converged, reporting each generation to `on_generation`
    pub fn run(
        &mut self,
        cancel: &CancelToken,
        mut on_generation: impl FnMut(&GenerationStats),
    ) -> Result<EvolutionResult, EvolveError> {
        while !self.is_finished() {
            let stats = self.next_generation(cancel)?;
            on_generation(&stats);
        }
        let best = self
            .best
            .clone()
            .ok_or_else(|| EvolveError::InvalidConfig("no generation was evaluated".into()))?;
        Ok(EvolutionResult {
            best,
            history: self.history.clone(),
        })
    }

    // ========================================================================
    // Level 2 - Phases
    // ========================================================================

    fn seed_population(&mut self) {
        self.population = (0..self.config.population_size)
            .map(|_| Individual::random(&mut self.rng))
            .collect();
    }

    /// Score every individual in order; the first failure aborts the
    /// generation
    fn evaluate_population(&mut self, cancel: &CancelToken) -> Result<(), EvolveError> {
        for (index, individual) in self.population.iter_mut().enumerate() {
            if cancel.is_cancelled() {
                return Err(EvolveError::Cancelled);
            }
            individual.fitness = self
                .oracle
                .evaluate(&individual.costs, cancel)
                .map_err(|source| match source {
                    TournamentError::Cancelled => EvolveError::Cancelled,
                    source => EvolveError::Evaluation { index, source },
                })?;
            debug!(generation = self.generation, index, fitness = individual.fitness, "individual scored");
        }
        Ok(())
    }

    fn track_best(&mut self) {
        let current = self
            .population
            .iter()
            .max_by(|a, b| a.fitness.partial_cmp(&b.fitness).unwrap_or(std::cmp::Ordering::Equal));
        if let Some(current) = current {
            if self.best.as_ref().map_or(true, |best| current.fitness > best.fitness) {
                self.best = Some(current.clone());
            }
        }
    }

    /// Elites verbatim, then mutated crossover children of tournament winners
    fn reproduce(&mut self) -> Vec<Individual> {
        let size = self.config.population_size;
        let mut next: Vec<Individual> = select_elite(&self.population, self.config.elitism)
            .into_iter()
            .map(|i| self.population[i].clone())
            .collect();

        while next.len() < size {
            let a = tournament_select(&self.population, self.config.tournament_size, &mut self.rng).costs;
            let b = tournament_select(&self.population, self.config.tournament_size, &mut self.rng).costs;
            let (x, y) = crossover(&a, &b, self.config.crossover_rate, &mut self.rng);

            next.push(Individual::new(mutate(&x, self.config.mutation_rate, &mut self.rng)));
            if next.len() < size {
                next.push(Individual::new(mutate(&y, self.config.mutation_rate, &mut self.rng)));
            }
        }
        next
    }
}
