//! Property tests for the simulation layer

use escarmouche_core::ability::AbilityRegistry;
use escarmouche_core::board::cells_between;
use escarmouche_core::movegen::{can_move_to, possible_moves};
use escarmouche_core::{
    has_line_of_sight, legal_actions, reachable_positions, Action, Counter, GameState, Player,
    Position, Stats, Unit, UnitId,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn position() -> impl Strategy<Value = Position> {
    (0i8..8, 0i8..8).prop_map(|(x, y)| Position::new(x, y))
}

/// Actor at a fixed cell plus a scatter of obstacles/enemies
fn crowded_state() -> impl Strategy<Value = GameState> {
    (
        1i32..4,
        1i32..4,
        prop::collection::hash_set(position(), 0..20),
        any::<bool>(),
    )
        .prop_map(|(move_range, reach, cells, stance)| {
            let actor = Position::new(3, 3);
            let mut placements = vec![(
                Player::One,
                Unit::new(Stats::new(3, reach, move_range, 2))
                    .with_ability("00000-charge")
                    .with_ability("00001-energy-trait"),
                actor,
            )];
            for (i, cell) in cells.into_iter().filter(|c| *c != actor).enumerate() {
                let owner = if i % 3 == 0 { Player::One } else { Player::Two };
                placements.push((owner, Unit::new(Stats::new(2, 1, 1, 1)), cell));
            }
            let mut state = GameState::new(&placements).unwrap();
            if stance {
                for id in 1..placements.len() {
                    state.set_counter(UnitId(id as u16), Counter::DefensiveStance, 1);
                }
            }
            state
        })
}

/// Independent check: shortest path length to `to` through free cells,
/// single steps to any of the 8 neighbours
fn path_length(state: &GameState, from: Position, to: Position) -> Option<i32> {
    let mut seen = HashSet::from([from]);
    let mut frontier = vec![from];
    let mut steps = 0;
    while !frontier.is_empty() {
        if frontier.contains(&to) {
            return Some(steps);
        }
        let mut next = Vec::new();
        for cell in frontier {
            for dir in 0..8 {
                let n = cell.neighbor(dir);
                if n.is_valid() && !state.is_occupied(n) && seen.insert(n) {
                    next.push(n);
                }
            }
        }
        frontier = next;
        steps += 1;
    }
    None
}

proptest! {
    #[test]
    fn prop_line_of_sight_is_symmetric(state in crowded_state(), a in position(), b in position()) {
        prop_assert_eq!(has_line_of_sight(&state, a, b), has_line_of_sight(&state, b, a));
        prop_assert_eq!(cells_between(a, b), cells_between(b, a));
    }

    #[test]
    fn prop_moves_are_legal(state in crowded_state()) {
        let actor = state.unit(UnitId(0)).unwrap().clone();
        let from = state.position(actor.id).unwrap();
        for action in possible_moves(&state, &actor) {
            let Action::Move { to, .. } = action else {
                panic!("non-move from possible_moves");
            };
            prop_assert!(to.is_valid());
            prop_assert!(!state.is_occupied(to));
            let length = path_length(&state, from, to);
            prop_assert!(length.is_some_and(|l| l <= actor.stats().move_range));
        }
    }

    #[test]
    fn prop_reachable_cells_are_exactly_the_short_paths(state in crowded_state()) {
        let actor = state.unit(UnitId(0)).unwrap().clone();
        let from = state.position(actor.id).unwrap();
        let range = actor.stats().move_range;
        let reachable: HashSet<Position> =
            reachable_positions(&state, from, range).into_iter().collect();
        for cell in Position::all().filter(|c| *c != from) {
            let short = path_length(&state, from, cell).is_some_and(|l| l <= range);
            prop_assert_eq!(reachable.contains(&cell), short, "cell {}", cell);
        }
    }

    #[test]
    fn prop_damage_is_conserved(state in crowded_state()) {
        let registry = AbilityRegistry::standard();
        let actor = state.unit(UnitId(0)).unwrap().clone();
        for action in legal_actions(&state, &actor, &registry) {
            let (target, nominal) = match &action {
                Action::Attack { target, .. } => (*target, actor.stats().power),
                Action::Ability { effect, .. } => {
                    let target = effect.ops.iter().find_map(|op| match op {
                        escarmouche_core::EffectOp::Damage { target, .. } => Some(*target),
                        _ => None,
                    });
                    match target {
                        Some(t) => (t, effect.nominal_damage()),
                        None => continue,
                    }
                }
                Action::Move { .. } => continue,
            };

            let stance = state.counter(target, Counter::DefensiveStance) > 0;
            let expected = if stance { nominal - 1 } else { nominal };
            let before = state.health(target);
            let next = action.apply(&state);

            if next.is_alive(target) {
                prop_assert_eq!(before - next.health(target), expected);
                prop_assert_eq!(next.counter(target, Counter::DefensiveStance), 0);
            } else {
                prop_assert!(expected >= before);
            }
            prop_assert!(next.validate().is_ok());
        }
    }

    #[test]
    fn prop_step_into_neighbour_only_needs_a_free_cell(state in crowded_state(), a in position(), dir in 0usize..8) {
        let b = a.neighbor(dir);
        prop_assert_eq!(can_move_to(&state, a, b), b.is_valid() && !state.is_occupied(b));
    }
}
