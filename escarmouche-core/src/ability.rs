//! Ability catalog and ability-action registry
//!
//! The catalog holds static descriptions and costs. The registry maps an
//! ability id to the generator that produces its candidate actions for a
//! unit in a given state. Both are plain values: build one, pass it where it
//! is needed.

use crate::action::{AbilityEffect, Action, EffectOp};
use crate::movegen::{reachable_positions, reachable_targets};
use crate::state::{Counter, GameState};
use crate::unit::{AbilityId, PlayerUnit};
use anyhow::Context;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// BUILT-IN ABILITIES
// ============================================================================

pub const CHARGE: &str = "00000-charge";
pub const ENERGY_TRAIT: &str = "00001-energy-trait";
pub const DEFENSIVE_STANCE: &str = "00002-defensive-stance";

/// Damage dealt by the strike at the end of a charge
pub const CHARGE_DAMAGE: i32 = 1;

/// Fixed reach and damage of the energy trait
pub const ENERGY_TRAIT_REACH: i32 = 3;
pub const ENERGY_TRAIT_DAMAGE: i32 = 2;

// ============================================================================
// CATALOG
// ============================================================================

/// Static description of an ability
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub id: AbilityId,
    pub label: String,
    pub description: String,
    pub cost: f64,
}

impl Ability {
    pub fn new(id: &str, label: &str, description: &str, cost: f64) -> Self {
        Self {
            id: AbilityId::from(id),
            label: label.to_string(),
            description: description.to_string(),
            cost,
        }
    }
}

/// Lookup table of known abilities
#[derive(Clone, Debug, Default)]
pub struct AbilityCatalog {
    abilities: FxHashMap<AbilityId, Ability>,
}

impl AbilityCatalog {
    pub fn new(abilities: impl IntoIterator<Item = Ability>) -> Self {
        Self {
            abilities: abilities.into_iter().map(|a| (a.id.clone(), a)).collect(),
        }
    }

    /// The three abilities the simulator ships with
    pub fn builtin() -> Self {
        Self::new([
            Ability::new(
                CHARGE,
                "Charge",
                "Move, then strike an enemy in reach from the new cell for 1 damage.",
                4.0,
            ),
            Ability::new(
                ENERGY_TRAIT,
                "Energy Trait",
                "Hit an enemy within 3 cells in sight for 2 damage.",
                5.0,
            ),
            Ability::new(
                DEFENSIVE_STANCE,
                "Defensive Stance",
                "Brace. The next hit against this unit deals 1 less damage.",
                3.0,
            ),
        ])
    }

    /// Parse a JSON array of abilities
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let abilities: Vec<Ability> = serde_json::from_str(json)?;
        Ok(Self::new(abilities))
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading ability catalog {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("parsing ability catalog {}", path.display()))
    }

    pub fn lookup(&self, id: &str) -> Option<&Ability> {
        self.abilities.get(&AbilityId::from(id))
    }

    /// Summed cost of the given abilities; unknown ids cost nothing
    pub fn cost_of(&self, ids: &[AbilityId]) -> f64 {
        ids.iter()
            .filter_map(|id| self.abilities.get(id))
            .map(|a| a.cost)
            .sum()
    }

    /// Abilities sorted by id
    pub fn iter(&self) -> impl Iterator<Item = &Ability> {
        let mut all: Vec<&Ability> = self.abilities.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all.into_iter()
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Produces the candidate actions of one ability for one unit
pub trait AbilityGenerator: Send + Sync {
    fn possible_actions(&self, state: &GameState, unit: &PlayerUnit) -> Vec<Action>;
}

impl<F> AbilityGenerator for F
where
    F: Fn(&GameState, &PlayerUnit) -> Vec<Action> + Send + Sync,
{
    fn possible_actions(&self, state: &GameState, unit: &PlayerUnit) -> Vec<Action> {
        self(state, unit)
    }
}

/// Ability id -> action generator
#[derive(Default)]
pub struct AbilityRegistry {
    generators: FxHashMap<AbilityId, Box<dyn AbilityGenerator>>,
}

impl AbilityRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in generators
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(CHARGE, charge_actions);
        registry.register(ENERGY_TRAIT, energy_trait_actions);
        registry.register(DEFENSIVE_STANCE, defensive_stance_actions);
        registry
    }

    /// Add or replace the generator for an ability
    pub fn register(&mut self, id: impl Into<AbilityId>, generator: impl AbilityGenerator + 'static) {
        self.generators.insert(id.into(), Box::new(generator));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.generators.contains_key(&AbilityId::from(id))
    }

    /// Candidate actions from every ability the unit has, in the unit's
    /// ability order. Abilities without a generator contribute nothing.
    pub fn possible_actions(&self, state: &GameState, unit: &PlayerUnit) -> Vec<Action> {
        let mut actions = Vec::new();
        for id in &unit.unit.abilities {
            match self.generators.get(id) {
                Some(generator) => actions.extend(generator.possible_actions(state, unit)),
                None => tracing::trace!(ability = %id, "no generator registered"),
            }
        }
        actions
    }
}

impl std::fmt::Debug for AbilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&AbilityId> = self.generators.keys().collect();
        ids.sort();
        f.debug_struct("AbilityRegistry").field("abilities", &ids).finish()
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

fn ability_available(state: &GameState, unit: &PlayerUnit) -> bool {
    state.is_alive(unit.id) && state.counter(unit.id, Counter::RoundAbilities) == 0
}

/// Every (destination, target) pair: move within the unit's move range,
/// then hit an enemy in reach from the new cell
pub fn charge_actions(state: &GameState, unit: &PlayerUnit) -> Vec<Action> {
    let Some(from) = state.position(unit.id) else {
        return vec![];
    };
    if !ability_available(state, unit) {
        return vec![];
    }

    let stats = unit.stats();
    let mut actions = Vec::new();
    for to in reachable_positions(state, from, stats.move_range) {
        // Look for targets as if already standing on the destination
        let mut moved = state.clone();
        moved.relocate(unit.id, to);
        for target in reachable_targets(&moved, unit.owner, to, stats.reach) {
            actions.push(Action::Ability {
                unit: unit.id,
                effect: AbilityEffect::new(
                    CHARGE,
                    vec![
                        EffectOp::Relocate { to },
                        EffectOp::Damage { target, amount: CHARGE_DAMAGE },
                    ],
                ),
            });
        }
    }
    actions
}

/// A ranged hit on any enemy within the trait's fixed reach
pub fn energy_trait_actions(state: &GameState, unit: &PlayerUnit) -> Vec<Action> {
    let Some(from) = state.position(unit.id) else {
        return vec![];
    };
    if !ability_available(state, unit) {
        return vec![];
    }

    reachable_targets(state, unit.owner, from, ENERGY_TRAIT_REACH)
        .into_iter()
        .map(|target| Action::Ability {
            unit: unit.id,
            effect: AbilityEffect::new(
                ENERGY_TRAIT,
                vec![EffectOp::Damage { target, amount: ENERGY_TRAIT_DAMAGE }],
            ),
        })
        .collect()
}

/// Raise a stance, unless one is already up
pub fn defensive_stance_actions(state: &GameState, unit: &PlayerUnit) -> Vec<Action> {
    if !ability_available(state, unit) || state.counter(unit.id, Counter::DefensiveStance) > 0 {
        return vec![];
    }
    vec![Action::Ability {
        unit: unit.id,
        effect: AbilityEffect::new(
            DEFENSIVE_STANCE,
            vec![EffectOp::SetCounter { counter: Counter::DefensiveStance, value: 1 }],
        ),
    }]
}
