//! One-ply action selection
//!
//! Both strategies enumerate every legal action of every unit the player
//! controls, apply it to a private copy of the state, score the result and
//! keep the best. Units are scanned in id order and actions in generation
//! order; the first action to reach the maximum wins.

use crate::action::{Action, ActionKind};
use crate::context::SimContext;
use crate::eval::{
    enemies_within, enemy_centroid, evaluate_state, StrategicContext, StrategicDecision,
};
use crate::state::GameState;
use crate::unit::{Player, PlayerUnit};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Relative half-width of the multiplicative score jitter
pub const JITTER: f64 = 0.1;

/// Radius inside which a cautious attacker counts nearby enemies
const CROWD_RADIUS: f64 = 2.0;

/// Radius a risk-averse mover wants clear of enemies
const SAFETY_RADIUS: f64 = 3.0;

// ============================================================================
// STRATEGY TRAIT
// ============================================================================

/// Chooses the next action of a player
pub trait Strategy: Send {
    /// Best action for `player`, or `None` if none of its units can act
    fn select_action(&mut self, state: &GameState, player: Player) -> Option<Action>;
}

/// Which built-in strategy to use
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Base evaluation only
    Greedy,
    /// Base evaluation biased by fuzzy preferences, with jitter
    #[default]
    Fuzzy,
}

impl StrategyKind {
    /// Instantiate the strategy with its own seeded rng
    pub fn build(self, ctx: Arc<SimContext>, seed: u64) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Greedy => Box::new(GreedyStrategy::new(ctx)),
            StrategyKind::Fuzzy => Box::new(FuzzyStrategy::with_seed(ctx, seed)),
        }
    }
}

// ============================================================================
// GREEDY
// ============================================================================

/// Picks the action whose resulting state evaluates best
pub struct GreedyStrategy {
    ctx: Arc<SimContext>,
}

impl GreedyStrategy {
    pub fn new(ctx: Arc<SimContext>) -> Self {
        Self { ctx }
    }
}

impl Strategy for GreedyStrategy {
    fn select_action(&mut self, state: &GameState, player: Player) -> Option<Action> {
        let mut best: Option<(f64, Action)> = None;
        for unit in state.units_of(player) {
            for action in self.ctx.legal_actions(state, unit) {
                let score = evaluate_state(&action.apply(state), player);
                if best.as_ref().map_or(true, |(s, _)| score > *s) {
                    best = Some((score, action));
                }
            }
        }
        best.map(|(_, action)| action)
    }
}

// ============================================================================
// FUZZY
// ============================================================================

/// One-ply search biased per unit by fuzzy strategic preferences
pub struct FuzzyStrategy {
    ctx: Arc<SimContext>,
    jitter: f64,
    rng: ChaCha8Rng,
}

impl FuzzyStrategy {
    pub fn new(ctx: Arc<SimContext>) -> Self {
        Self::with_seed(ctx, 42)
    }

    pub fn with_seed(ctx: Arc<SimContext>, seed: u64) -> Self {
        Self {
            ctx,
            jitter: JITTER,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Disable the random jitter, making play fully deterministic
    pub fn without_jitter(mut self) -> Self {
        self.jitter = 0.0;
        self
    }

    /// Preferences of one unit. Falls back to neutral if inference fails.
    pub fn decide(&self, state: &GameState, unit: &PlayerUnit) -> StrategicDecision {
        let context = StrategicContext::for_unit(state, unit, &self.ctx);
        match StrategicDecision::infer(self.ctx.strategy_engine.as_ref(), &context) {
            Ok(decision) => decision,
            Err(e) => {
                tracing::debug!(unit = %unit.id, error = %e, "strategic inference failed");
                StrategicDecision::NEUTRAL
            }
        }
    }

    fn jitter_factor(&mut self) -> f64 {
        if self.jitter == 0.0 {
            return 1.0;
        }
        1.0 + (self.rng.gen::<f64>() - 0.5) * 2.0 * self.jitter
    }
}

impl Strategy for FuzzyStrategy {
    fn select_action(&mut self, state: &GameState, player: Player) -> Option<Action> {
        let mut best: Option<(f64, Action)> = None;

        let units: Vec<&PlayerUnit> = state.units_of(player).collect();
        for unit in units {
            let decision = self.decide(state, unit);
            for action in self.ctx.legal_actions(state, unit) {
                let next = action.apply(state);
                let base = evaluate_state(&next, player);
                let score = (base + action_modifier(&next, &action, unit, &decision))
                    * self.jitter_factor();
                if best.as_ref().map_or(true, |(s, _)| score > *s) {
                    best = Some((score, action));
                }
            }
        }

        best.map(|(_, action)| action)
    }
}

// ============================================================================
// SCORE MODIFIERS
// ============================================================================

/// Additive bias of an action given the acting unit's preferences.
/// `next` is the state after the action.
pub fn action_modifier(
    next: &GameState,
    action: &Action,
    unit: &PlayerUnit,
    decision: &StrategicDecision,
) -> f64 {
    match action.kind() {
        ActionKind::Attack => attack_modifier(next, unit, decision),
        ActionKind::Move => move_modifier(next, unit, decision),
        ActionKind::Ability => match action {
            Action::Ability { effect, .. } if effect.is_defensive() => defensive_modifier(decision),
            Action::Ability { effect, .. } if effect.is_offensive() => offensive_modifier(decision),
            _ => 0.0,
        },
    }
}

fn attack_modifier(next: &GameState, unit: &PlayerUnit, decision: &StrategicDecision) -> f64 {
    let mut bonus = decision.aggression * 50.0;
    if decision.risk_tolerance > 0.6 {
        bonus += 20.0;
    }
    if decision.aggression < 0.4 {
        if let Some(pos) = next.position(unit.id) {
            if enemies_within(next, unit.owner, pos, CROWD_RADIUS) > 1 {
                bonus -= 30.0;
            }
        }
    }
    if decision.positioning_preference > 0.6 {
        bonus += 15.0;
    }
    bonus
}

fn move_modifier(next: &GameState, unit: &PlayerUnit, decision: &StrategicDecision) -> f64 {
    let Some(pos) = next.position(unit.id) else {
        return 0.0;
    };
    let mut bonus = 0.0;

    if let Some((cx, cy)) = enemy_centroid(next, unit.owner) {
        let dx = pos.x as f64 - cx;
        let dy = pos.y as f64 - cy;
        let distance = (dx * dx + dy * dy).sqrt();
        if decision.positioning_preference > 0.6 && distance < 6.0 {
            bonus += 25.0;
        } else if decision.positioning_preference < 0.4 && distance > 4.0 {
            bonus += 25.0;
        }
    }

    if decision.risk_tolerance < 0.4 && enemies_within(next, unit.owner, pos, SAFETY_RADIUS) == 0 {
        bonus += 20.0;
    }

    if decision.aggression > 0.6 {
        let in_reach = enemies_within(next, unit.owner, pos, unit.stats().reach as f64);
        bonus += in_reach as f64 * 15.0;
    }

    bonus
}

fn defensive_modifier(decision: &StrategicDecision) -> f64 {
    let mut bonus = 0.0;
    if decision.aggression < 0.5 {
        bonus += 30.0;
    }
    if decision.risk_tolerance < 0.4 {
        bonus += 20.0;
    }
    bonus
}

fn offensive_modifier(decision: &StrategicDecision) -> f64 {
    let mut bonus = 0.0;
    if decision.aggression > 0.6 {
        bonus += 35.0;
    }
    if decision.risk_tolerance > 0.6 {
        bonus += 25.0;
    }
    bonus
}
