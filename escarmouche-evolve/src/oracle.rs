//! Fitness oracle seam between the generation loop and the simulator

use escarmouche_core::{CancelToken, Costs};
use escarmouche_tournament::{FitnessEvaluator, TournamentError};

/// Scores one cost model; higher is better, 1 is perfect balance
pub trait FitnessOracle {
    fn evaluate(&mut self, costs: &Costs, cancel: &CancelToken) -> Result<f64, TournamentError>;

    /// Squads generated per evaluation, when the oracle generates any
    fn squads_per_eval(&self) -> Option<usize> {
        None
    }
}

impl<F> FitnessOracle for F
where
    F: FnMut(&Costs, &CancelToken) -> Result<f64, TournamentError>,
{
    fn evaluate(&mut self, costs: &Costs, cancel: &CancelToken) -> Result<f64, TournamentError> {
        self(costs, cancel)
    }
}

/// Round-robin fitness with a fresh seed per evaluation
pub struct TournamentOracle {
    evaluator: FitnessEvaluator,
    seed: u64,
    evaluations: u64,
}

impl TournamentOracle {
    pub fn new(evaluator: FitnessEvaluator, seed: u64) -> Self {
        Self { evaluator, seed, evaluations: 0 }
    }

    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    /// Evaluations performed so far
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }
}

impl FitnessOracle for TournamentOracle {
    fn evaluate(&mut self, costs: &Costs, cancel: &CancelToken) -> Result<f64, TournamentError> {
        let seed = self.seed.wrapping_add(self.evaluations.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        self.evaluations += 1;
        Ok(self.evaluator.evaluate(costs, seed, cancel)?.fitness)
    }

    fn squads_per_eval(&self) -> Option<usize> {
        Some(self.evaluator.config().squads)
    }
}
