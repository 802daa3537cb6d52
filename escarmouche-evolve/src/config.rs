//! Evolution configuration
//!
//! Level 4 - Utilities and configuration

use serde::{Deserialize, Serialize};

use crate::error::EvolveError;

/// Evolution configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// Per-gene mutation probability
    pub mutation_rate: f64,
    /// Per-gene swap probability during crossover
    pub crossover_rate: f64,
    /// Individuals carried over unchanged each generation
    pub elitism: usize,
    pub tournament_size: usize,
    /// Squads generated for each fitness evaluation
    pub squads_per_eval: usize,
    /// Generations evaluated at most
    pub max_generations: usize,
    /// Converged once the best fitness reaches `1 - convergence_threshold`
    pub convergence_threshold: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            elitism: 5,
            tournament_size: 3,
            squads_per_eval: 10,
            max_generations: 100,
            convergence_threshold: 0.001,
        }
    }
}

impl EvolutionConfig {
    pub fn with_population(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    pub fn with_elitism(mut self, elitism: usize) -> Self {
        self.elitism = elitism;
        self
    }

    pub fn with_squads_per_eval(mut self, squads: usize) -> Self {
        self.squads_per_eval = squads;
        self
    }

    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Reject configurations the generation loop cannot run
    pub fn validate(&self) -> Result<(), EvolveError> {
        let invalid = |msg: String| Err(EvolveError::InvalidConfig(msg));
        if self.population_size == 0 {
            return invalid("population size must be at least 1".into());
        }
        if self.elitism > self.population_size {
            return invalid(format!(
                "elitism {} exceeds population size {}",
                self.elitism, self.population_size
            ));
        }
        if self.tournament_size == 0 {
            return invalid("tournament size must be at least 1".into());
        }
        if self.squads_per_eval < 2 {
            return invalid(format!(
                "squads per evaluation must be at least 2, got {}",
                self.squads_per_eval
            ));
        }
        if self.max_generations == 0 {
            return invalid("max generations must be at least 1".into());
        }
        for (name, rate) in [
            ("mutation rate", self.mutation_rate),
            ("crossover rate", self.crossover_rate),
            ("convergence threshold", self.convergence_threshold),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return invalid(format!("{name} must be in [0, 1], got {rate}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvolutionConfig::default();
        assert_eq!(config.population_size, 50);
        assert_eq!(config.elitism, 5);
        assert_eq!(config.tournament_size, 3);
        assert_eq!(config.squads_per_eval, 10);
        assert_eq!(config.max_generations, 100);
        assert_eq!(config.crossover_rate, 0.8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_single_squad() {
        let err = EvolutionConfig::default().with_squads_per_eval(1).validate();
        assert!(matches!(err, Err(EvolveError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_oversized_elite() {
        let config = EvolutionConfig::default().with_population(4).with_elitism(5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_rates() {
        assert!(EvolutionConfig::default().with_mutation_rate(1.5).validate().is_err());
        assert!(EvolutionConfig::default().with_crossover_rate(-0.1).validate().is_err());
        assert!(EvolutionConfig::default().with_max_generations(0).validate().is_err());
    }
}
