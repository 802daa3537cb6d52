//! Uniform crossover of cost models

use escarmouche_core::Costs;
use rand::Rng;

use crate::genome::Gene;

/// Uniform crossover: each gene is swapped between the two children
/// independently with probability `rate`.
pub fn crossover<R: Rng>(a: &Costs, b: &Costs, rate: f64, rng: &mut R) -> (Costs, Costs) {
    let mut first = *a;
    let mut second = *b;
    for gene in Gene::ALL {
        if rng.gen::<f64>() < rate {
            std::mem::swap(gene.get_mut(&mut first), gene.get_mut(&mut second));
        }
    }
    (first, second)
}
