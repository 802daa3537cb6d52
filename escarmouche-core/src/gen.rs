//! Procedural unit and squad generation under a cost model

use crate::ability::{CHARGE, DEFENSIVE_STANCE, ENERGY_TRAIT};
use crate::cost::Costs;
use crate::rank::{Evaluation, Rank, RankError, Ranker};
use crate::unit::{AbilityId, Stats, Unit};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Most abilities a generated unit may carry
pub const MAX_ABILITIES: usize = 2;

pub const DEFAULT_MAX_RANK_POINTS: u32 = 30;
pub const DEFAULT_MAX_SQUAD_SIZE: usize = 6;

// ============================================================================
// ARCHETYPES
// ============================================================================

/// Weighting profile biasing stat and ability allocation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    pub name: String,
    pub weight_health: u32,
    pub weight_reach: u32,
    pub weight_move: u32,
    pub weight_power: u32,
    /// Chance in percent, per upgrade round, of also picking up an ability
    pub weight_ability: u32,
    pub abilities: Vec<AbilityId>,
}

impl Archetype {
    fn new(name: &str, weights: [u32; 4], weight_ability: u32, abilities: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            weight_health: weights[0],
            weight_reach: weights[1],
            weight_move: weights[2],
            weight_power: weights[3],
            weight_ability,
            abilities: abilities.iter().map(|&id| AbilityId::from(id)).collect(),
        }
    }

    fn stat_weights(&self) -> [u32; 4] {
        [self.weight_health, self.weight_reach, self.weight_move, self.weight_power]
    }
}

/// The stock archetypes
pub fn default_archetypes() -> Vec<Archetype> {
    vec![
        Archetype::new("balanced", [25, 25, 25, 25], 15, &[CHARGE, ENERGY_TRAIT, DEFENSIVE_STANCE]),
        Archetype::new("tank", [60, 10, 15, 15], 20, &[DEFENSIVE_STANCE]),
        Archetype::new("sniper", [15, 40, 15, 30], 20, &[ENERGY_TRAIT]),
        Archetype::new("skirmisher", [20, 20, 40, 20], 20, &[CHARGE]),
        Archetype::new("bruiser", [35, 15, 20, 30], 15, &[CHARGE, DEFENSIVE_STANCE]),
        Archetype::new("glass_cannon", [10, 30, 15, 45], 10, &[ENERGY_TRAIT]),
    ]
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenError {
    #[error(transparent)]
    Rank(#[from] RankError),
    #[error("archetype {0:?} has no stat weight")]
    InvalidArchetype(String),
    #[error("no archetypes to generate from")]
    NoArchetypes,
    #[error("budget of {budget} points buys no unit")]
    EmptySquad { budget: u32 },
}

// ============================================================================
// GENERATION
// ============================================================================

/// Produces squads as plain unit templates
pub trait SquadSource: Send + Sync {
    fn generate_squad(
        &self,
        budget: u32,
        max_size: usize,
        costs: &Costs,
        rng: &mut ChaCha8Rng,
    ) -> Result<Vec<Unit>, GenError>;
}

/// A generated unit with its evaluation
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedUnit {
    pub unit: Unit,
    pub evaluation: Evaluation,
    pub archetype: String,
}

/// Random generator driven by archetypes and fuzzy ranking
#[derive(Clone, Debug)]
pub struct SquadGenerator {
    ranker: Ranker,
    archetypes: Vec<Archetype>,
}

#[derive(Clone, Copy)]
enum Upgrade {
    Health,
    Reach,
    Move,
    Power,
}

impl Upgrade {
    const ORDER: [Upgrade; 4] = [Upgrade::Health, Upgrade::Reach, Upgrade::Move, Upgrade::Power];

    fn slot(self, stats: &mut Stats) -> &mut i32 {
        match self {
            Upgrade::Health => &mut stats.health,
            Upgrade::Reach => &mut stats.reach,
            Upgrade::Move => &mut stats.move_range,
            Upgrade::Power => &mut stats.power,
        }
    }
}

impl SquadGenerator {
    pub fn new(ranker: Ranker) -> Self {
        Self::with_archetypes(ranker, default_archetypes())
    }

    pub fn with_archetypes(ranker: Ranker, archetypes: Vec<Archetype>) -> Self {
        Self { ranker, archetypes }
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    /// Grow a unit from 1/1/1/1 toward `target` rank.
    ///
    /// Each round raises one stat picked by archetype weight and may add an
    /// archetype ability. A round that pushes the unit over `max_total` or
    /// past the target rank is undone. Stops on reaching the target or after
    /// `max_total` rounds, so the result can fall short of the target.
    pub fn random_unit(
        &self,
        target: Rank,
        archetype: &Archetype,
        costs: &Costs,
        rng: &mut ChaCha8Rng,
    ) -> Result<GeneratedUnit, GenError> {
        let weights = WeightedIndex::new(archetype.stat_weights())
            .map_err(|_| GenError::InvalidArchetype(archetype.name.clone()))?;

        let mut stats = Stats::new(1, 1, 1, 1);
        let mut abilities: Vec<AbilityId> = Vec::new();
        let mut evaluation = self.ranker.evaluate(&stats, &abilities, costs)?;

        let max_rounds = costs.max_total.max(0.0) as usize;
        for _ in 0..max_rounds {
            if evaluation.rank >= target {
                break;
            }

            let upgrade = Upgrade::ORDER[weights.sample(rng)];
            *upgrade.slot(&mut stats) += 1;

            let mut added = false;
            if abilities.len() < MAX_ABILITIES && rng.gen_range(0..100) < archetype.weight_ability {
                let candidates: Vec<&AbilityId> = archetype
                    .abilities
                    .iter()
                    .filter(|id| !abilities.contains(id))
                    .collect();
                if !candidates.is_empty() {
                    let pick = candidates[rng.gen_range(0..candidates.len())].clone();
                    abilities.push(pick);
                    added = true;
                }
            }

            let candidate = self.ranker.evaluate(&stats, &abilities, costs)?;
            if candidate.cost > costs.max_total || candidate.rank > target {
                *upgrade.slot(&mut stats) -= 1;
                if added {
                    abilities.pop();
                }
                continue;
            }
            evaluation = candidate;
        }

        Ok(GeneratedUnit {
            unit: Unit { stats, abilities },
            evaluation,
            archetype: archetype.name.clone(),
        })
    }

    /// Spend up to `budget` rank points on at most `max_size` units
    pub fn random_squad(
        &self,
        budget: u32,
        max_size: usize,
        costs: &Costs,
        rng: &mut ChaCha8Rng,
    ) -> Result<Vec<GeneratedUnit>, GenError> {
        if self.archetypes.is_empty() {
            return Err(GenError::NoArchetypes);
        }

        let mut remaining = budget;
        let mut squad = Vec::new();
        while squad.len() < max_size {
            let affordable: Vec<Rank> = Rank::ALL
                .into_iter()
                .filter(|r| r.point_cost() <= remaining)
                .collect();
            if affordable.is_empty() {
                break;
            }

            let target = affordable[rng.gen_range(0..affordable.len())];
            let archetype = &self.archetypes[rng.gen_range(0..self.archetypes.len())];
            let generated = self.random_unit(target, archetype, costs, rng)?;
            remaining = remaining.saturating_sub(generated.evaluation.rank.point_cost());
            squad.push(generated);
        }

        if squad.is_empty() {
            return Err(GenError::EmptySquad { budget });
        }
        Ok(squad)
    }
}

impl SquadSource for SquadGenerator {
    fn generate_squad(
        &self,
        budget: u32,
        max_size: usize,
        costs: &Costs,
        rng: &mut ChaCha8Rng,
    ) -> Result<Vec<Unit>, GenError> {
        let squad = self.random_squad(budget, max_size, costs, rng)?;
        Ok(squad.into_iter().map(|g| g.unit).collect())
    }
}
