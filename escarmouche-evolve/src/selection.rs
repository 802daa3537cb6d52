//! Selection operators for genetic algorithms
//!
//! Implements tournament selection where individuals compete
//! in small tournaments, with the winner being selected for breeding.

use rand::Rng;

use crate::genome::Individual;

/// Tournament selection: draw `tournament_size` individuals uniformly (with
/// replacement) and return the fittest. The first drawn wins ties.
///
/// `population` must not be empty.
pub fn tournament_select<'a, R: Rng>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual {
    debug_assert!(!population.is_empty(), "population cannot be empty");

    let mut best = &population[rng.gen_range(0..population.len())];
    for _ in 1..tournament_size {
        let candidate = &population[rng.gen_range(0..population.len())];
        if candidate.fitness > best.fitness {
            best = candidate;
        }
    }
    best
}

/// Select the top N individuals by fitness (elitism).
///
/// Returns indices sorted by fitness, best first.
pub fn select_elite(population: &[Individual], n: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..population.len()).collect();
    indices.sort_by(|&a, &b| {
        population[b]
            .fitness
            .partial_cmp(&population[a].fitness)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices.truncate(n);
    indices
}
