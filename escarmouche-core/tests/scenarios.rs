//! End-to-end scenarios over the public API

use escarmouche_core::ability::{AbilityCatalog, DEFENSIVE_STANCE, ENERGY_TRAIT};
use escarmouche_core::{
    ranker_for, Action, Costs, Counter, FuzzyStrategy, Game, GameOptions, GameState, Player,
    Position, SimContext, SquadGenerator, SquadSource, Stats, Unit, UnitId,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// A braced defender next to an attacker hitting for 2
fn braced_duel() -> GameState {
    let mut state = GameState::new(&[
        (Player::One, Unit::new(Stats::new(3, 1, 1, 2)), Position::new(2, 2)),
        (
            Player::Two,
            Unit::new(Stats::new(4, 1, 1, 1)).with_ability(DEFENSIVE_STANCE),
            Position::new(2, 3),
        ),
    ])
    .unwrap();
    state.set_counter(UnitId(1), Counter::DefensiveStance, 1);
    state
}

// ============================================================================
// DEFENSIVE STANCE
// ============================================================================

#[test]
fn test_stance_absorbs_one_point_of_an_attack() {
    let state = braced_duel();
    let next = Action::Attack { unit: UnitId(0), target: UnitId(1) }.apply(&state);

    assert_eq!(next.health(UnitId(1)), 3);
    assert_eq!(next.counter(UnitId(1), Counter::DefensiveStance), 0);
    // Input untouched
    assert_eq!(state.health(UnitId(1)), 4);
    assert_eq!(state.counter(UnitId(1), Counter::DefensiveStance), 1);
}

#[test]
fn test_stance_absorbs_ability_damage_too() {
    let mut state = GameState::new(&[
        (
            Player::One,
            Unit::new(Stats::new(3, 1, 1, 1)).with_ability(ENERGY_TRAIT),
            Position::new(2, 0),
        ),
        (Player::Two, Unit::new(Stats::new(4, 1, 1, 1)), Position::new(2, 3)),
    ])
    .unwrap();
    state.set_counter(UnitId(1), Counter::DefensiveStance, 1);

    let ctx = SimContext::standard().unwrap();
    let caster = state.unit(UnitId(0)).unwrap().clone();
    let actions = ctx.legal_actions(&state, &caster);
    let blast = actions
        .iter()
        .find(|a| matches!(a, Action::Ability { .. }))
        .expect("energy trait in range");

    let next = blast.apply(&state);
    assert_eq!(next.health(UnitId(1)), 3); // 2 - 1
    assert_eq!(next.counter(UnitId(1), Counter::DefensiveStance), 0);
}

#[test]
fn test_stance_is_raised_and_not_stacked() {
    let ctx = SimContext::standard().unwrap();
    let state = GameState::new(&[(
        Player::One,
        Unit::new(Stats::new(3, 1, 1, 1)).with_ability(DEFENSIVE_STANCE),
        Position::new(0, 0),
    )])
    .unwrap();
    let unit = state.unit(UnitId(0)).unwrap().clone();

    let raise = ctx
        .legal_actions(&state, &unit)
        .into_iter()
        .find(|a| matches!(a, Action::Ability { .. }))
        .unwrap();
    let mut braced = raise.apply(&state);
    assert_eq!(braced.counter(UnitId(0), Counter::DefensiveStance), 1);

    // New round: ability use resets, stance still up, so nothing to raise
    braced.begin_turn(Player::One, 2);
    assert!(ctx
        .legal_actions(&braced, &unit)
        .iter()
        .all(|a| !matches!(a, Action::Ability { .. })));
}

// ============================================================================
// FULL MATCHES
// ============================================================================

#[test]
fn test_generated_squads_play_to_a_result() {
    let ctx = Arc::new(SimContext::standard().unwrap());
    let catalog = Arc::new(AbilityCatalog::builtin());
    let generator = SquadGenerator::new(ranker_for(catalog).unwrap());
    let costs = Costs::default();
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    for round in 0..3u64 {
        let a = generator.generate_squad(30, 6, &costs, &mut rng).unwrap();
        let b = generator.generate_squad(30, 6, &costs, &mut rng).unwrap();
        let mut game = Game::new(
            &a,
            &b,
            [
                Box::new(FuzzyStrategy::with_seed(ctx.clone(), round)),
                Box::new(FuzzyStrategy::with_seed(ctx.clone(), round + 100)),
            ],
            GameOptions::default(),
            &mut rng,
        )
        .unwrap();

        let mut steps = 0;
        let mut last = None;
        for step in game.by_ref() {
            steps += 1;
            assert!(step.turn <= GameOptions::default().max_turns);
            last = Some(step);
        }
        let last = last.unwrap();
        assert!(last.is_over);
        assert!(last.winner.is_some());
        assert!(steps <= 2 * GameOptions::default().max_turns as usize + 1);
        assert!(game.state().validate().is_ok());
    }
}
