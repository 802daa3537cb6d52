//! Fitness of a cost model: balance of a round robin between generated squads
//!
//! Level 1 - Orchestration and Level 4 - Utilities

use std::sync::Arc;

use escarmouche_core::{
    ranker_for, CancelToken, Costs, FuzzyError, SimContext, SquadGenerator, SquadSource, Unit,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::config::EvalConfig;
use crate::error::TournamentError;
use crate::game_runner::GameRunner;
use crate::tournament::{run_round_robin, TournamentResult};

/// Result of evaluating one cost model
#[derive(Clone, Debug)]
pub struct FitnessResult {
    /// 1 - HHI, in [0, 1]; 1 is perfect balance
    pub fitness: f64,
    pub tournament: TournamentResult,
}

/// Scores cost models by generating squads under them and playing them off
pub struct FitnessEvaluator {
    ctx: Arc<SimContext>,
    source: Arc<dyn SquadSource>,
    config: EvalConfig,
}

impl FitnessEvaluator {
    pub fn new(ctx: Arc<SimContext>, source: Arc<dyn SquadSource>, config: EvalConfig) -> Self {
        Self { ctx, source, config }
    }

    /// Built-in context and squad generator
    pub fn standard(config: EvalConfig) -> Result<Self, FuzzyError> {
        let ctx = Arc::new(SimContext::standard()?);
        let generator = SquadGenerator::new(ranker_for(ctx.catalog.clone())?);
        Ok(Self::new(ctx, Arc::new(generator), config))
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn context(&self) -> &Arc<SimContext> {
        &self.ctx
    }

    /// Generate the configured number of squads under `costs`, in parallel.
    /// Squad `i` always comes from the same seed for a given `seed`.
    pub fn generate_squads(&self, costs: &Costs, seed: u64) -> Result<Vec<Vec<Unit>>, TournamentError> {
        self.config.validate()?;
        let budget = self.config.max_rank_points;
        let max_size = self.config.max_squad_size;
        let squads = (0..self.config.squads)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(squad_seed(seed, i));
                self.source.generate_squad(budget, max_size, costs, &mut rng)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(squads)
    }

    /// Fitness of `costs`: 1 - HHI of a round robin between fresh squads
    pub fn evaluate(
        &self,
        costs: &Costs,
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<FitnessResult, TournamentError> {
        self.config.validate()?;
        if cancel.is_cancelled() {
            return Err(TournamentError::Cancelled);
        }

        let squads = self.generate_squads(costs, seed)?;
        let runner = GameRunner::new(
            self.ctx.clone(),
            self.config.tournament.clone().with_seed(seed),
        );
        let tournament = run_round_robin(&squads, &runner, cancel)?;
        debug!(fitness = tournament.fitness(), hhi = tournament.hhi, "cost model evaluated");

        Ok(FitnessResult {
            fitness: tournament.fitness(),
            tournament,
        })
    }
}

/// Normalized Herfindahl-Hirschman index of win shares.
///
/// `(sum(s^2) - 1/N) / (1 - 1/N)` clamped to [0, 1]: 0 when every squad
/// won equally often, 1 when a single squad won everything. Fewer than two
/// squads, or no wins at all, count as perfectly even.
pub fn herfindahl_index(wins: &[u32]) -> f64 {
    let n = wins.len();
    let total: u64 = wins.iter().map(|&w| u64::from(w)).sum();
    if n < 2 || total == 0 {
        return 0.0;
    }

    let total = total as f64;
    let raw: f64 = wins
        .iter()
        .map(|&w| {
            let share = f64::from(w) / total;
            share * share
        })
        .sum();
    let baseline = 1.0 / n as f64;
    ((raw - baseline) / (1.0 - baseline)).clamp(0.0, 1.0)
}

fn squad_seed(base: u64, index: usize) -> u64 {
    base.wrapping_add((index as u64).wrapping_mul(0xD1B5_4A32_D192_ED03))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TournamentConfig;
    use escarmouche_core::{GenError, Stats};

    /// Hands out copies of fixed squads, cycling by the first rng draw
    struct FixedSquads(Vec<Vec<Unit>>);

    impl SquadSource for FixedSquads {
        fn generate_squad(
            &self,
            _budget: u32,
            _max_size: usize,
            _costs: &Costs,
            rng: &mut ChaCha8Rng,
        ) -> Result<Vec<Unit>, GenError> {
            use rand::Rng;
            let i = rng.gen_range(0..self.0.len());
            Ok(self.0[i].clone())
        }
    }

    struct Failing;

    impl SquadSource for Failing {
        fn generate_squad(
            &self,
            budget: u32,
            _max_size: usize,
            _costs: &Costs,
            _rng: &mut ChaCha8Rng,
        ) -> Result<Vec<Unit>, GenError> {
            Err(GenError::EmptySquad { budget })
        }
    }

    fn evaluator(source: Arc<dyn SquadSource>, squads: usize) -> FitnessEvaluator {
        let config = EvalConfig::new(squads)
            .with_tournament(TournamentConfig::default().with_workers(2));
        FitnessEvaluator::new(Arc::new(SimContext::standard().unwrap()), source, config)
    }

    #[test]
    fn test_hhi_even_is_zero() {
        assert_eq!(herfindahl_index(&[3, 3, 3, 3]), 0.0);
        assert_eq!(herfindahl_index(&[1, 1]), 0.0);
    }

    #[test]
    fn test_hhi_monopoly_is_one() {
        assert!((herfindahl_index(&[12, 0, 0, 0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hhi_grows_with_concentration() {
        let even = herfindahl_index(&[4, 4, 4]);
        let skewed = herfindahl_index(&[6, 4, 2]);
        let very = herfindahl_index(&[10, 1, 1]);
        assert!(even < skewed);
        assert!(skewed < very);
    }

    #[test]
    fn test_hhi_degenerate_inputs() {
        assert_eq!(herfindahl_index(&[]), 0.0);
        assert_eq!(herfindahl_index(&[5]), 0.0);
        assert_eq!(herfindahl_index(&[0, 0, 0]), 0.0);
    }

    #[test]
    fn test_evaluate_with_fixed_squads() {
        let squads = vec![
            vec![Unit::new(Stats::new(3, 2, 2, 2))],
            vec![Unit::new(Stats::new(2, 1, 3, 1)), Unit::new(Stats::new(2, 1, 1, 1))],
        ];
        let eval = evaluator(Arc::new(FixedSquads(squads)), 3);
        let result = eval.evaluate(&Costs::default(), 5, &CancelToken::new()).unwrap();

        assert_eq!(result.tournament.completed_games, 6);
        assert!((0.0..=1.0).contains(&result.fitness));
        assert_eq!(result.fitness, 1.0 - result.tournament.hhi);
    }

    #[test]
    fn test_generated_squads_are_reproducible() {
        let eval = FitnessEvaluator::standard(EvalConfig::new(4)).unwrap();
        let a = eval.generate_squads(&Costs::default(), 17).unwrap();
        let b = eval.generate_squads(&Costs::default(), 17).unwrap();
        assert_eq!(a.len(), 4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fewer_than_two_squads_is_a_config_error() {
        let eval = evaluator(Arc::new(Failing), 1);
        let err = eval.evaluate(&Costs::default(), 0, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, TournamentError::NotEnoughSquads(1)));
    }

    #[test]
    fn test_oversized_squads_rejected_before_any_game() {
        let big = vec![Unit::new(Stats::new(2, 1, 1, 1)); 12];
        let config = EvalConfig::new(3).with_budget(30, 12);
        let eval = FitnessEvaluator::new(
            Arc::new(SimContext::standard().unwrap()),
            Arc::new(FixedSquads(vec![big])),
            config,
        );
        let err = eval.evaluate(&Costs::default(), 0, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, TournamentError::InvalidConfig(_)));
        assert!(eval.generate_squads(&Costs::default(), 0).is_err());
    }

    #[test]
    fn test_generation_failure_propagates() {
        let eval = evaluator(Arc::new(Failing), 3);
        let err = eval.evaluate(&Costs::default(), 0, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, TournamentError::Generation(GenError::EmptySquad { budget: 30 })));
    }

    #[test]
    fn test_cancelled_evaluation() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let eval = evaluator(Arc::new(Failing), 3);
        let err = eval.evaluate(&Costs::default(), 0, &cancel).unwrap_err();
        assert!(err.is_cancelled());
    }
}
