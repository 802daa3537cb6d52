//! Integration tests for the Escarmouche balancer
//!
//! Tests the full stack: squad generation, matches, round robin, evolution,
//! and the `escarmouche` binary itself

use std::path::PathBuf;
use std::process::Command;

use escarmouche_core::{CancelToken, Costs};
use escarmouche_evolve::{in_bounds, EvolutionConfig, Evolver, TournamentOracle};
use escarmouche_tournament::{
    run_round_robin, EvalConfig, FitnessEvaluator, GameRunner, TournamentConfig,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn evaluator(squads: usize) -> FitnessEvaluator {
    let eval = EvalConfig::new(squads).with_tournament(TournamentConfig::default().with_workers(2));
    FitnessEvaluator::standard(eval).unwrap()
}

fn escarmouche(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_escarmouche"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("escarmouche-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

// ============================================================================
// LIBRARY STACK
// ============================================================================

#[test]
fn test_two_squad_round_robin() {
    let eval = evaluator(2);
    let squads = eval.generate_squads(&Costs::default(), 2024).unwrap();
    let runner = GameRunner::new(eval.context().clone(), eval.config().tournament.clone());
    let result = run_round_robin(&squads, &runner, &CancelToken::new()).unwrap();

    assert_eq!(result.completed_games, 2);
    assert_eq!(result.records[0].games, 2);
    assert_eq!(result.records[1].games, 2);
    assert!((0.0..=1.0).contains(&result.fitness()));
}

#[test]
fn test_short_balance_search() {
    let config = EvolutionConfig::default()
        .with_population(10)
        .with_elitism(2)
        .with_max_generations(5)
        .with_squads_per_eval(2);
    let oracle = TournamentOracle::new(evaluator(config.squads_per_eval), 77);
    let mut evolver = Evolver::new(config, oracle, 77).unwrap();

    let mut generations = 0;
    let result = evolver.run(&CancelToken::new(), |_| generations += 1).unwrap();

    assert!(generations <= 5);
    assert_eq!(result.generations(), generations);
    assert!((0.0..=1.0).contains(&result.best.fitness));
    assert!(in_bounds(&result.best.costs));
}

// ============================================================================
// BINARY
// ============================================================================

#[test]
fn test_simulate_prints_a_winner() {
    let output = escarmouche(&["--seed", "3", "simulate", "--quiet"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Winner: player"), "{stdout}");
}

#[test]
fn test_tournament_json() {
    let output = escarmouche(&["--seed", "5", "tournament", "--squads", "3", "--workers", "2", "--json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["completed_games"], 6);
    assert_eq!(json["records"].as_array().unwrap().len(), 3);
}

#[test]
fn test_balance_writes_report() {
    let dir = scratch_dir("balance");
    let output = escarmouche(&[
        "--seed",
        "9",
        "balance",
        "--population",
        "4",
        "--elitism",
        "1",
        "--squads",
        "2",
        "--max-generations",
        "2",
        "--workers",
        "2",
        "--no-progress",
        "--output",
        dir.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Best cost model"));

    let report = std::fs::read_dir(&dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .find(|path| path.extension().is_some_and(|ext| ext == "json"))
        .expect("report file");
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(report).unwrap()).unwrap();
    assert_eq!(json["seed"], 9);
    assert!(json["best"]["fitness"].as_f64().is_some());
    assert!(json["history"].as_array().unwrap().len() <= 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_invalid_balance_config_fails() {
    let output = escarmouche(&["balance", "--squads", "1", "--no-progress"]);
    assert!(!output.status.success());
}

#[test]
fn test_oversized_squads_fail_up_front() {
    for command in ["tournament", "balance"] {
        let output = escarmouche(&[command, "--squad-size", "12", "--squads", "2"]);
        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("squad size must be between 1 and 8"), "{stderr}");
    }
}
