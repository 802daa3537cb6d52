//! Shared read-only collaborators of a simulation

use crate::ability::{AbilityCatalog, AbilityRegistry};
use crate::action::Action;
use crate::cost::Costs;
use crate::fuzzy::{FuzzyEngine, FuzzyError, RuleEngine};
use crate::movegen::legal_actions;
use crate::rank::Ranker;
use crate::state::GameState;
use crate::unit::{PlayerUnit, Unit};
use std::fmt;
use std::sync::Arc;

/// Everything a match needs besides its state: the ability registry and
/// catalog, the strategic rule engine, and the reference cost model used to
/// judge how valuable a unit is. Built once, shared behind an `Arc`.
pub struct SimContext {
    pub registry: AbilityRegistry,
    pub catalog: Arc<AbilityCatalog>,
    pub strategy_engine: Arc<dyn RuleEngine>,
    pub costs: Costs,
}

impl SimContext {
    pub fn new(
        registry: AbilityRegistry,
        catalog: Arc<AbilityCatalog>,
        strategy_engine: Arc<dyn RuleEngine>,
        costs: Costs,
    ) -> Self {
        Self { registry, catalog, strategy_engine, costs }
    }

    /// Built-in abilities, built-in strategy rules, default costs
    pub fn standard() -> Result<Self, FuzzyError> {
        Ok(Self::new(
            AbilityRegistry::standard(),
            Arc::new(AbilityCatalog::builtin()),
            Arc::new(FuzzyEngine::strategy()?),
            Costs::default(),
        ))
    }

    /// Legal actions of a unit under this context's registry
    pub fn legal_actions(&self, state: &GameState, unit: &PlayerUnit) -> Vec<Action> {
        legal_actions(state, unit, &self.registry)
    }

    /// Unit cost relative to the per-unit cap, in [0, 1]
    pub fn unit_value(&self, unit: &Unit) -> f64 {
        if self.costs.max_total <= 0.0 {
            return 1.0;
        }
        let cost = self
            .costs
            .total_cost(&unit.stats, self.catalog.cost_of(&unit.abilities));
        (cost / self.costs.max_total).min(1.0)
    }
}

impl fmt::Debug for SimContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimContext")
            .field("registry", &self.registry)
            .field("costs", &self.costs)
            .finish()
    }
}

/// Build a ranker that prices abilities from the same catalog
pub fn ranker_for(catalog: Arc<AbilityCatalog>) -> Result<Ranker, FuzzyError> {
    Ok(Ranker::new(Arc::new(FuzzyEngine::ranking()?), catalog))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Stats;

    #[test]
    fn test_unit_value_is_capped() {
        let ctx = SimContext::standard().unwrap();
        let small = ctx.unit_value(&Unit::new(Stats::new(1, 1, 1, 1)));
        assert!((small - 8.0 / 30.0).abs() < 1e-9);
        let huge = ctx.unit_value(&Unit::new(Stats::new(20, 5, 5, 5)));
        assert_eq!(huge, 1.0);
    }
}
