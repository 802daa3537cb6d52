//! Actions: pure state transformers
//!
//! Every action captures all of its parameters up front. Applying it clones
//! the input state and returns the modified clone.

use crate::board::Position;
use crate::state::{Counter, GameState};
use crate::unit::{AbilityId, UnitId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One primitive step of an ability effect
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EffectOp {
    /// Move the acting unit to a cell
    Relocate { to: Position },
    /// Damage a unit through the shared damage primitive
    Damage { target: UnitId, amount: i32 },
    /// Set a counter on the acting unit
    SetCounter { counter: Counter, value: i32 },
}

/// Inspectable description of what an ability does when used
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityEffect {
    pub ability: AbilityId,
    pub ops: Vec<EffectOp>,
}

impl AbilityEffect {
    pub fn new(ability: impl Into<AbilityId>, ops: Vec<EffectOp>) -> Self {
        Self { ability: ability.into(), ops }
    }

    /// Total nominal damage across all damage ops
    pub fn nominal_damage(&self) -> i32 {
        self.ops
            .iter()
            .map(|op| match op {
                EffectOp::Damage { amount, .. } => *amount,
                _ => 0,
            })
            .sum()
    }

    /// Deals damage to someone
    pub fn is_offensive(&self) -> bool {
        self.nominal_damage() > 0
    }

    /// Only sets up protection for the acting unit
    pub fn is_defensive(&self) -> bool {
        !self.is_offensive()
            && self.ops.iter().any(|op| {
                matches!(
                    op,
                    EffectOp::SetCounter { counter: Counter::DefensiveStance, .. }
                )
            })
    }

    /// Interpret the effect on `state` for the acting unit
    fn run(&self, unit: UnitId, state: &mut GameState) {
        for op in &self.ops {
            match *op {
                EffectOp::Relocate { to } => state.relocate(unit, to),
                EffectOp::Damage { target, amount } => {
                    state.apply_damage(target, amount);
                }
                EffectOp::SetCounter { counter, value } => state.set_counter(unit, counter, value),
            }
        }
        state.inc_counter(unit, Counter::RoundAbilities, 1);
    }
}

/// Kind of action, used for scoring
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Move,
    Attack,
    Ability,
}

/// A fully specified action
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Move { unit: UnitId, to: Position },
    Attack { unit: UnitId, target: UnitId },
    Ability { unit: UnitId, effect: AbilityEffect },
}

impl Action {
    /// Acting unit
    pub fn unit(&self) -> UnitId {
        match self {
            Action::Move { unit, .. } | Action::Attack { unit, .. } | Action::Ability { unit, .. } => {
                *unit
            }
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Move { .. } => ActionKind::Move,
            Action::Attack { .. } => ActionKind::Attack,
            Action::Ability { .. } => ActionKind::Ability,
        }
    }

    /// Apply to a copy of `state`.
    ///
    /// Total: an action whose unit is gone leaves the copy unchanged.
    pub fn apply(&self, state: &GameState) -> GameState {
        let mut next = state.clone();
        if !next.is_alive(self.unit()) {
            return next;
        }

        match self {
            Action::Move { unit, to } => next.relocate(*unit, *to),
            Action::Attack { unit, target } => {
                let power = state.unit(*unit).map_or(0, |u| u.stats().power);
                next.apply_damage(*target, power);
                next.inc_counter(*unit, Counter::RoundAttacks, 1);
            }
            Action::Ability { unit, effect } => effect.run(*unit, &mut next),
        }
        next
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move { unit, to } => write!(f, "unit {unit} moves to {to}"),
            Action::Attack { unit, target } => write!(f, "unit {unit} attacks unit {target}"),
            Action::Ability { unit, effect } => {
                write!(f, "unit {unit} uses {}", effect.ability)?;
                for op in &effect.ops {
                    match op {
                        EffectOp::Relocate { to } => write!(f, ", moving to {to}")?,
                        EffectOp::Damage { target, amount } => {
                            write!(f, ", dealing {amount} to unit {target}")?
                        }
                        EffectOp::SetCounter { counter, value } => {
                            write!(f, ", setting {} to {value}", counter.name())?
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{Player, Stats, Unit};

    fn skirmish() -> GameState {
        GameState::new(&[
            (Player::One, Unit::new(Stats::new(3, 1, 2, 2)), Position::new(1, 1)),
            (Player::Two, Unit::new(Stats::new(3, 1, 1, 1)), Position::new(2, 1)),
        ])
        .unwrap()
    }

    #[test]
    fn test_move_does_not_touch_input() {
        let state = skirmish();
        let next = Action::Move { unit: UnitId(0), to: Position::new(1, 3) }.apply(&state);
        assert_eq!(state.position(UnitId(0)), Some(Position::new(1, 1)));
        assert_eq!(next.position(UnitId(0)), Some(Position::new(1, 3)));
        assert!(next.validate().is_ok());
    }

    #[test]
    fn test_attack_uses_power_and_marks_round() {
        let state = skirmish();
        let next = Action::Attack { unit: UnitId(0), target: UnitId(1) }.apply(&state);
        assert_eq!(next.health(UnitId(1)), 1);
        assert_eq!(next.counter(UnitId(0), Counter::RoundAttacks), 1);
        assert_eq!(state.health(UnitId(1)), 3);
    }

    #[test]
    fn test_ability_runs_ops_in_order() {
        let state = skirmish();
        let effect = AbilityEffect::new(
            "00000-charge",
            vec![
                EffectOp::Relocate { to: Position::new(2, 2) },
                EffectOp::Damage { target: UnitId(1), amount: 1 },
            ],
        );
        let next = Action::Ability { unit: UnitId(0), effect }.apply(&state);
        assert_eq!(next.position(UnitId(0)), Some(Position::new(2, 2)));
        assert_eq!(next.health(UnitId(1)), 2);
        assert_eq!(next.counter(UnitId(0), Counter::RoundAbilities), 1);
    }

    #[test]
    fn test_effect_classification() {
        let stance = AbilityEffect::new(
            "00002-defensive-stance",
            vec![EffectOp::SetCounter { counter: Counter::DefensiveStance, value: 1 }],
        );
        assert!(stance.is_defensive());
        assert!(!stance.is_offensive());

        let blast = AbilityEffect::new(
            "00001-energy-trait",
            vec![EffectOp::Damage { target: UnitId(1), amount: 2 }],
        );
        assert!(blast.is_offensive());
        assert_eq!(blast.nominal_damage(), 2);
    }

    #[test]
    fn test_dead_actor_is_noop() {
        let mut state = skirmish();
        state.apply_damage(UnitId(0), 10);
        let next = Action::Attack { unit: UnitId(0), target: UnitId(1) }.apply(&state);
        assert_eq!(next.health(UnitId(1)), 3);
    }

    #[test]
    fn test_description() {
        let action = Action::Attack { unit: UnitId(0), target: UnitId(1) };
        assert_eq!(action.to_string(), "unit #0 attacks unit #1");
    }
}
