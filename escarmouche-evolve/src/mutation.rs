//! Bounded mutation of cost models

use escarmouche_core::Costs;
use rand::Rng;

use crate::genome::Gene;

/// Perturb each gene with probability `rate` by uniform noise of the gene's
/// width centred on zero. Every gene is clamped to its valid range
/// afterwards, mutated or not.
pub fn mutate<R: Rng>(costs: &Costs, rate: f64, rng: &mut R) -> Costs {
    let mut mutated = *costs;
    for gene in Gene::ALL {
        let bounds = gene.bounds();
        let value = gene.get_mut(&mut mutated);
        if rng.gen::<f64>() < rate {
            *value += (rng.gen::<f64>() - 0.5) * bounds.noise;
        }
        *value = bounds.valid.clamp(*value);
    }
    mutated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::in_bounds;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_rate_zero_keeps_valid_costs() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let costs = Costs::default();
        assert_eq!(mutate(&costs, 0.0, &mut rng), costs);
    }

    #[test]
    fn test_noise_is_bounded_by_half_width() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let costs = Costs::default();
        for _ in 0..100 {
            let mutated = mutate(&costs, 1.0, &mut rng);
            for gene in Gene::ALL {
                let delta = (gene.get(&mutated) - gene.get(&costs)).abs();
                assert!(delta <= gene.bounds().noise / 2.0 + 1e-12, "{gene}: {delta}");
            }
        }
    }

    #[test]
    fn test_out_of_range_input_is_pulled_back() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut costs = Costs::default();
        costs.power_exponent = 7.0;
        costs.max_total = -3.0;
        let mutated = mutate(&costs, 0.0, &mut rng);
        assert_eq!(mutated.power_exponent, 2.0);
        assert_eq!(mutated.max_total, 10.0);
        assert!(in_bounds(&mutated));
    }
}
