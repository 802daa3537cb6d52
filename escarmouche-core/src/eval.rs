//! Position evaluation and per-unit strategic context

use crate::board::Position;
use crate::context::SimContext;
use crate::fuzzy::{FuzzyError, Inference, RuleEngine, Values};
use crate::state::{Counter, GameState};
use crate::unit::{Player, PlayerUnit};
use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Distance used when no enemy is left
pub const NO_ENEMY_DISTANCE: f64 = 100.0;

/// Proximity bonus per unit is `(PROXIMITY_RANGE - distance) * PROXIMITY_WEIGHT`
const PROXIMITY_RANGE: f64 = 10.0;
const PROXIMITY_WEIGHT: f64 = 0.1;

/// Enemies further than this pose no threat
const THREAT_RANGE: f64 = 10.0;

/// Power at which an enemy counts as fully dangerous
const THREAT_POWER_SCALE: f64 = 5.0;

// ============================================================================
// STATE EVALUATION
// ============================================================================

/// Score a state from `player`'s point of view (higher is better).
///
/// Own health plus raised stances, minus enemy health, plus a small bonus
/// per own unit for standing close to its nearest enemy.
pub fn evaluate_state(state: &GameState, player: Player) -> f64 {
    let mut score = 0.0;

    for unit in state.units() {
        let health = state.health(unit.id) as f64;
        if unit.owner == player {
            score += health;
            score += state.counter(unit.id, Counter::DefensiveStance).max(0) as f64;
        } else {
            score -= health;
        }
    }

    for unit in state.units_of(player) {
        if let Some(distance) = nearest_enemy_distance(state, unit) {
            score += (PROXIMITY_RANGE - distance) * PROXIMITY_WEIGHT;
        }
    }

    score
}

/// Euclidean distance from a unit to its closest enemy
pub fn nearest_enemy_distance(state: &GameState, unit: &PlayerUnit) -> Option<f64> {
    let pos = state.position(unit.id)?;
    nearest_enemy_distance_from(state, unit.owner, pos)
}

/// Euclidean distance from `pos` to the closest enemy of `player`
pub fn nearest_enemy_distance_from(state: &GameState, player: Player, pos: Position) -> Option<f64> {
    state
        .enemies_of(player)
        .filter_map(|enemy| state.position(enemy.id))
        .map(|enemy_pos| pos.distance_to(enemy_pos))
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
}

/// Number of enemies of `player` within `radius` of `pos`
pub fn enemies_within(state: &GameState, player: Player, pos: Position, radius: f64) -> usize {
    state
        .enemies_of(player)
        .filter_map(|enemy| state.position(enemy.id))
        .filter(|&enemy_pos| pos.distance_to(enemy_pos) <= radius)
        .count()
}

/// Mean cell of `player`'s enemies
pub fn enemy_centroid(state: &GameState, player: Player) -> Option<(f64, f64)> {
    let cells: Vec<Position> = state
        .enemies_of(player)
        .filter_map(|enemy| state.position(enemy.id))
        .collect();
    if cells.is_empty() {
        return None;
    }
    let n = cells.len() as f64;
    let x = cells.iter().map(|p| p.x as f64).sum::<f64>() / n;
    let y = cells.iter().map(|p| p.y as f64).sum::<f64>() / n;
    Some((x, y))
}

// ============================================================================
// STRATEGIC CONTEXT
// ============================================================================

/// How dangerous the strongest enemy is to a unit with `health` left at
/// `distance` from it, in [0, 1]
pub fn enemy_threat(health: i32, max_enemy_power: i32, distance: f64) -> f64 {
    if distance > THREAT_RANGE {
        return 0.0;
    }
    let proximity = 1.0 - distance / THREAT_RANGE;
    let power = max_enemy_power as f64 / THREAT_POWER_SCALE;
    let fragility = 1.0 + (1.0 - health as f64 / 10.0);
    ((proximity * power * fragility) / 2.0).clamp(0.0, 1.0)
}

/// Fuzzy inputs describing one unit's tactical situation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategicContext {
    pub health_ratio: f64,
    pub distance_to_enemy: f64,
    pub enemy_threat: f64,
    pub unit_value: f64,
}

impl StrategicContext {
    pub fn for_unit(state: &GameState, unit: &PlayerUnit, ctx: &SimContext) -> Self {
        let health = state.health(unit.id);
        let max_health = unit.stats().health.max(1);
        let distance = nearest_enemy_distance(state, unit).unwrap_or(NO_ENEMY_DISTANCE);
        let max_enemy_power = state
            .enemies_of(unit.owner)
            .map(|e| e.stats().power)
            .max()
            .unwrap_or(0);

        Self {
            health_ratio: health as f64 / max_health as f64,
            distance_to_enemy: distance,
            enemy_threat: enemy_threat(health, max_enemy_power, distance),
            unit_value: ctx.unit_value(&unit.unit),
        }
    }

    pub fn values(&self) -> Values {
        let mut values = Values::new();
        values.insert("health_ratio".to_string(), self.health_ratio);
        values.insert("distance_to_enemy".to_string(), self.distance_to_enemy);
        values.insert("enemy_threat".to_string(), self.enemy_threat);
        values.insert("unit_value".to_string(), self.unit_value);
        values
    }
}

// ============================================================================
// STRATEGIC DECISION
// ============================================================================

const AGGRESSION_TERMS: &[(&str, f64)] = &[
    ("defensive", 0.1),
    ("cautious", 0.3),
    ("balanced", 0.5),
    ("aggressive", 0.7),
    ("reckless", 0.9),
];

const POSITIONING_TERMS: &[(&str, f64)] = &[
    ("retreat", 0.1),
    ("hold", 0.3),
    ("advance", 0.6),
    ("charge", 0.9),
];

const RISK_TERMS: &[(&str, f64)] = &[
    ("risk_averse", 0.1),
    ("conservative", 0.3),
    ("moderate", 0.5),
    ("bold", 0.7),
];

/// Crisp preferences, each in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategicDecision {
    pub aggression: f64,
    pub positioning_preference: f64,
    pub risk_tolerance: f64,
}

impl StrategicDecision {
    pub const NEUTRAL: Self = Self {
        aggression: 0.5,
        positioning_preference: 0.5,
        risk_tolerance: 0.5,
    };

    /// Defuzzify an inference result
    pub fn from_inference(inference: &Inference) -> Self {
        Self {
            aggression: defuzzify(inference, "aggression", AGGRESSION_TERMS),
            positioning_preference: defuzzify(inference, "positioning_preference", POSITIONING_TERMS),
            risk_tolerance: defuzzify(inference, "risk_tolerance", RISK_TERMS),
        }
    }

    /// Run the strategic rules for a context
    pub fn infer(engine: &dyn RuleEngine, context: &StrategicContext) -> Result<Self, FuzzyError> {
        Ok(Self::from_inference(&engine.infer(&context.values())?))
    }
}

/// Truth-weighted mean of the term centres; 0.5 if nothing fired
fn defuzzify(inference: &Inference, variable: &str, terms: &[(&str, f64)]) -> f64 {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for &(term, centre) in terms {
        let truth = inference.truth(variable, term);
        weighted += truth * centre;
        total += truth;
    }
    if total > 0.0 {
        weighted / total
    } else {
        0.5
    }
}
