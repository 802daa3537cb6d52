//! Legal action generation: pathfinding, line of sight, reach

use crate::ability::AbilityRegistry;
use crate::action::Action;
use crate::board::{cells_between, Position, CELL_COUNT, DIRECTIONS};
use crate::state::{Counter, GameState};
use crate::unit::{Player, PlayerUnit, UnitId};
use std::collections::VecDeque;

// ============================================================================
// GEOMETRY QUERIES
// ============================================================================

/// True if no occupied cell lies strictly between `from` and `to`.
/// Symmetric in its endpoints.
pub fn has_line_of_sight(state: &GameState, from: Position, to: Position) -> bool {
    cells_between(from, to)
        .into_iter()
        .all(|cell| !state.is_occupied(cell))
}

/// Whether a single step from `current` into `next` is allowed
pub fn can_move_to(state: &GameState, current: Position, next: Position) -> bool {
    next.is_valid() && !state.is_occupied(next) && has_line_of_sight(state, current, next)
}

/// Cells reachable from `start` in at most `move_range` steps.
///
/// Breadth-first over the 8 neighbours; every step costs 1, diagonals
/// included. The start cell is not part of the result. Order is BFS order,
/// so it is stable for a given state.
pub fn reachable_positions(state: &GameState, start: Position, move_range: i32) -> Vec<Position> {
    let mut visited = [false; CELL_COUNT];
    let mut reachable = Vec::new();
    if !start.is_valid() || move_range <= 0 {
        return reachable;
    }

    let mut queue = VecDeque::new();
    visited[start.index()] = true;
    queue.push_back((start, 0));

    while let Some((current, steps)) = queue.pop_front() {
        if steps >= move_range {
            continue;
        }
        for direction in 0..DIRECTIONS.len() {
            let next = current.neighbor(direction);
            if !next.is_valid() || visited[next.index()] {
                continue;
            }
            if !can_move_to(state, current, next) {
                continue;
            }
            visited[next.index()] = true;
            reachable.push(next);
            queue.push_back((next, steps + 1));
        }
    }

    reachable
}

/// Enemy units of `player` within Euclidean `reach` of `from` and in sight.
///
/// Scans the square around `from` row by row, so the order is stable.
pub fn reachable_targets(
    state: &GameState,
    player: Player,
    from: Position,
    reach: i32,
) -> Vec<UnitId> {
    let mut targets = Vec::new();
    if reach <= 0 {
        return targets;
    }

    let span = reach.min(i8::MAX as i32) as i8;
    for dy in -span..=span {
        for dx in -span..=span {
            let pos = Position::new(from.x.saturating_add(dx), from.y.saturating_add(dy));
            if !pos.is_valid() || pos == from {
                continue;
            }
            let Some(target) = state.unit_at(pos) else {
                continue;
            };
            if target.owner == player {
                continue;
            }
            if from.within_reach(pos, reach) && has_line_of_sight(state, from, pos) {
                targets.push(target.id);
            }
        }
    }

    targets
}

// ============================================================================
// PER-UNIT ACTIONS
// ============================================================================

/// Moves to every reachable cell
pub fn possible_moves(state: &GameState, unit: &PlayerUnit) -> Vec<Action> {
    let Some(from) = state.position(unit.id) else {
        return vec![];
    };
    reachable_positions(state, from, unit.stats().move_range)
        .into_iter()
        .map(|to| Action::Move { unit: unit.id, to })
        .collect()
}

/// Attacks on every target in reach
pub fn possible_attacks(state: &GameState, unit: &PlayerUnit) -> Vec<Action> {
    let Some(from) = state.position(unit.id) else {
        return vec![];
    };
    reachable_targets(state, unit.owner, from, unit.stats().reach)
        .into_iter()
        .map(|target| Action::Attack { unit: unit.id, target })
        .collect()
}

/// Every legal action for one unit: moves, then attacks if it has not
/// attacked this round, then ability actions if it has not used an ability
/// this round
pub fn legal_actions(state: &GameState, unit: &PlayerUnit, registry: &AbilityRegistry) -> Vec<Action> {
    if !state.is_alive(unit.id) {
        return vec![];
    }

    let mut actions = possible_moves(state, unit);
    if state.counter(unit.id, Counter::RoundAttacks) == 0 {
        actions.extend(possible_attacks(state, unit));
    }
    if state.counter(unit.id, Counter::RoundAbilities) == 0 {
        actions.extend(registry.possible_actions(state, unit));
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{Stats, Unit};

    fn unit(health: i32, reach: i32, move_range: i32, power: i32) -> Unit {
        Unit::new(Stats::new(health, reach, move_range, power))
    }

    fn lone(pos: Position, move_range: i32) -> GameState {
        GameState::new(&[(Player::One, unit(3, 1, move_range, 1), pos)]).unwrap()
    }

    #[test]
    fn test_open_board_reachability() {
        let state = lone(Position::new(3, 3), 1);
        let reachable = reachable_positions(&state, Position::new(3, 3), 1);
        assert_eq!(reachable.len(), 8);

        let state = lone(Position::new(3, 3), 2);
        assert_eq!(reachable_positions(&state, Position::new(3, 3), 2).len(), 24);
    }

    #[test]
    fn test_corner_reachability() {
        let state = lone(Position::new(0, 0), 1);
        let reachable = reachable_positions(&state, Position::new(0, 0), 1);
        assert_eq!(reachable.len(), 3);
        assert!(!reachable.contains(&Position::new(0, 0)));
    }

    #[test]
    fn test_obstacle_is_not_reachable() {
        let state = GameState::new(&[
            (Player::One, unit(3, 1, 2, 1), Position::new(1, 1)),
            (Player::Two, unit(3, 1, 1, 1), Position::new(2, 1)),
        ])
        .unwrap();

        let reachable = reachable_positions(&state, Position::new(1, 1), 2);
        assert!(!reachable.contains(&Position::new(2, 1)));
        assert!(reachable.contains(&Position::new(2, 2))); // diagonal around it
        assert!(reachable.contains(&Position::new(3, 1))); // around via (2,0) or (2,2)
    }

    #[test]
    fn test_walled_in_unit_cannot_move() {
        let mut placements = vec![(Player::One, unit(3, 1, 3, 1), Position::new(0, 0))];
        for pos in [Position::new(1, 0), Position::new(0, 1), Position::new(1, 1)] {
            placements.push((Player::Two, unit(1, 1, 1, 1), pos));
        }
        let state = GameState::new(&placements).unwrap();
        assert!(reachable_positions(&state, Position::new(0, 0), 3).is_empty());
    }

    #[test]
    fn test_line_of_sight_blocked_by_unit_between() {
        let state = lone(Position::new(2, 2), 1);
        assert!(!has_line_of_sight(&state, Position::new(1, 1), Position::new(3, 3)));
        assert!(!has_line_of_sight(&state, Position::new(3, 3), Position::new(1, 1)));
        assert!(has_line_of_sight(&state, Position::new(1, 1), Position::new(3, 1)));
        // Endpoints never block
        assert!(has_line_of_sight(&state, Position::new(2, 2), Position::new(5, 2)));
    }

    #[test]
    fn test_can_move_to() {
        let state = lone(Position::new(2, 2), 1);
        assert!(can_move_to(&state, Position::new(1, 1), Position::new(3, 1)));
        assert!(!can_move_to(&state, Position::new(1, 1), Position::new(3, 3)));
        assert!(!can_move_to(&state, Position::new(1, 1), Position::new(-1, 1)));
        assert!(!can_move_to(&state, Position::new(1, 1), Position::new(2, 2)));
    }

    #[test]
    fn test_targets_respect_reach_and_ownership() {
        let state = GameState::new(&[
            (Player::One, unit(3, 2, 1, 1), Position::new(0, 0)),
            (Player::One, unit(3, 1, 1, 1), Position::new(1, 0)),
            (Player::Two, unit(3, 1, 1, 1), Position::new(0, 2)),
            (Player::Two, unit(3, 1, 1, 1), Position::new(2, 2)),
        ])
        .unwrap();

        let targets = reachable_targets(&state, Player::One, Position::new(0, 0), 2);
        assert_eq!(targets, vec![UnitId(2)]); // (2,2) is sqrt(8) away
    }

    #[test]
    fn test_targets_need_line_of_sight() {
        let state = GameState::new(&[
            (Player::One, unit(3, 3, 1, 1), Position::new(0, 0)),
            (Player::Two, unit(3, 1, 1, 1), Position::new(1, 0)),
            (Player::Two, unit(3, 1, 1, 1), Position::new(2, 0)),
        ])
        .unwrap();

        let targets = reachable_targets(&state, Player::One, Position::new(0, 0), 3);
        assert_eq!(targets, vec![UnitId(1)]);
    }

    #[test]
    fn test_attacks_gated_by_round_counter() {
        let mut state = GameState::new(&[
            (Player::One, unit(3, 1, 1, 1), Position::new(0, 0)),
            (Player::Two, unit(3, 1, 1, 1), Position::new(1, 0)),
        ])
        .unwrap();
        let registry = AbilityRegistry::new();
        let attacker = state.unit(UnitId(0)).unwrap().clone();

        let before = legal_actions(&state, &attacker, &registry);
        assert!(before.iter().any(|a| matches!(a, Action::Attack { .. })));

        state.set_counter(UnitId(0), Counter::RoundAttacks, 1);
        let after = legal_actions(&state, &attacker, &registry);
        assert!(after.iter().all(|a| !matches!(a, Action::Attack { .. })));
        assert_eq!(after.len(), 2); // (0,1) and (1,1)
    }
}
