//! Per-generation statistics

use std::fmt;

use escarmouche_core::Costs;
use serde::{Deserialize, Serialize};

use crate::genome::Individual;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Zero-based generation index
    pub generation: usize,
    pub best: f64,
    pub average: f64,
    pub worst: f64,
    pub best_costs: Costs,
    /// Set on the last generation of a run
    pub converged: bool,
}

impl GenerationStats {
    /// Summarize an evaluated population. `converged` reports whether the
    /// best fitness is within `threshold` of 1.
    pub fn from_population(generation: usize, population: &[Individual], threshold: f64) -> Self {
        let mut best: Option<&Individual> = None;
        let mut worst = f64::INFINITY;
        let mut total = 0.0;
        for individual in population {
            if best.map_or(true, |b| individual.fitness > b.fitness) {
                best = Some(individual);
            }
            worst = worst.min(individual.fitness);
            total += individual.fitness;
        }

        match best {
            Some(best) => Self {
                generation,
                best: best.fitness,
                average: total / population.len() as f64,
                worst,
                best_costs: best.costs,
                converged: best.fitness >= 1.0 - threshold,
            },
            None => Self {
                generation,
                best: 0.0,
                average: 0.0,
                worst: 0.0,
                best_costs: Costs::default(),
                converged: false,
            },
        }
    }
}

impl fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Gen {}: Best={:.4}, Avg={:.4}, Worst={:.4}, Converged={}",
            self.generation, self.best, self.average, self.worst, self.converged
        )
    }
}
