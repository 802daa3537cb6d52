//! Unit ranking: cost-based tier assignment through fuzzy inference

use crate::ability::AbilityCatalog;
use crate::cost::Costs;
use crate::fuzzy::{FuzzyError, RuleEngine, Values};
use crate::unit::{AbilityId, Stats};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Ordinal unit tier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Trooper,
    Veteran,
    Elite,
    Champion,
    Paragon,
}

impl Rank {
    pub const ALL: [Rank; 5] = [
        Rank::Trooper,
        Rank::Veteran,
        Rank::Elite,
        Rank::Champion,
        Rank::Paragon,
    ];

    /// Term name used by the ranking rules
    pub fn name(self) -> &'static str {
        match self {
            Rank::Trooper => "trooper",
            Rank::Veteran => "veteran",
            Rank::Elite => "elite",
            Rank::Champion => "champion",
            Rank::Paragon => "paragon",
        }
    }

    /// Squad budget points a unit of this rank consumes
    pub fn point_cost(self) -> u32 {
        match self {
            Rank::Trooper => 1,
            Rank::Veteran => 3,
            Rank::Elite => 6,
            Rank::Champion => 10,
            Rank::Paragon => 15,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankError {
    #[error("could not evaluate unit: {0}")]
    Inference(#[from] FuzzyError),
    #[error("no rank fits a unit costing {0}")]
    NoRank(f64),
}

/// Cost and rank of a unit
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub cost: f64,
    pub rank: Rank,
}

/// Rates units under a cost model
#[derive(Clone)]
pub struct Ranker {
    engine: Arc<dyn RuleEngine>,
    catalog: Arc<AbilityCatalog>,
}

impl Ranker {
    pub fn new(engine: Arc<dyn RuleEngine>, catalog: Arc<AbilityCatalog>) -> Self {
        Self { engine, catalog }
    }

    pub fn catalog(&self) -> &AbilityCatalog {
        &self.catalog
    }

    /// Cost of a unit under `costs`, abilities priced from the catalog
    pub fn cost(&self, stats: &Stats, abilities: &[AbilityId], costs: &Costs) -> f64 {
        costs.total_cost(stats, self.catalog.cost_of(abilities))
    }

    /// Cost and rank of a unit. On equal truth the higher rank wins.
    pub fn evaluate(
        &self,
        stats: &Stats,
        abilities: &[AbilityId],
        costs: &Costs,
    ) -> Result<Evaluation, RankError> {
        let cost = self.cost(stats, abilities, costs);

        let mut values = Values::new();
        values.insert("cost".to_string(), cost);
        values.insert("expertise".to_string(), abilities.len() as f64);
        let inference = self.engine.infer(&values)?;

        let mut best: Option<(Rank, f64)> = None;
        for rank in Rank::ALL {
            let truth = inference.truth("rank", rank.name());
            if truth > 0.0 && best.map_or(true, |(_, t)| truth >= t) {
                best = Some((rank, truth));
            }
        }

        best.map(|(rank, _)| Evaluation { cost, rank })
            .ok_or(RankError::NoRank(cost))
    }
}

impl fmt::Debug for Ranker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ranker").field("catalog", &self.catalog).finish()
    }
}
