//! Balance command - evolve a cost model toward even win shares
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), run_search(), print_summary(), save_results()
//! - Level 3: progress bar, cost comparison
//! - Level 4: file I/O, formatting utilities

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use escarmouche_core::{CancelToken, Costs};
use escarmouche_evolve::{
    EvolutionConfig, EvolutionResult, Evolver, Gene, GenerationStats, Individual, TournamentOracle,
};
use escarmouche_tournament::{AiConfig, EvalConfig, FitnessEvaluator, TournamentConfig};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::common::{cancel_after, resolve_seed, DataArgs, StrategyArg};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BalanceArgs {
    /// Population size
    #[arg(long, default_value = "100")]
    pub population: usize,

    /// Squads generated per fitness evaluation
    #[arg(long, default_value = "100")]
    pub squads: usize,

    /// Per-gene mutation probability (0.0-1.0)
    #[arg(long, default_value = "0.1")]
    pub mutation_rate: f64,

    /// Per-gene crossover swap probability (0.0-1.0)
    #[arg(long, default_value = "0.8")]
    pub crossover_rate: f64,

    /// Number of elite individuals to preserve
    #[arg(long, default_value = "5")]
    pub elitism: usize,

    /// Maximum generations
    #[arg(long, default_value = "1000")]
    pub max_generations: usize,

    /// Rank points per squad
    #[arg(long, default_value = "30")]
    pub points: u32,

    /// Units per squad
    #[arg(long, default_value = "6")]
    pub squad_size: usize,

    /// Step cap per match
    #[arg(long, default_value = "250")]
    pub max_sim_steps: u32,

    /// Worker threads per tournament (default: available parallelism - 1)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Strategy for both sides
    #[arg(long, value_enum, default_value_t = StrategyArg::Fuzzy)]
    pub strategy: StrategyArg,

    /// Cancel the search after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Directory for a timestamped JSON report
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Serialize)]
struct BalanceReport<'a> {
    timestamp: String,
    seed: u64,
    config: &'a EvolutionConfig,
    best: &'a Individual,
    default_costs: Costs,
    history: &'a [GenerationStats],
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run balance command
///
/// 1. Build the search and fitness configuration
/// 2. Run generations until converged, cancelled, or capped
/// 3. Print the tuned cost model next to the defaults
/// 4. Save the report if requested
pub fn run(args: BalanceArgs, seed: Option<u64>) -> Result<()> {
    let seed = resolve_seed(seed);
    let config = build_config(&args);
    config.validate()?;

    tracing::info!(
        "Starting balance search: pop={}, squads={}, max_gen={}",
        config.population_size,
        config.squads_per_eval,
        config.max_generations
    );

    let oracle = build_oracle(&args, &config, seed)?;
    let cancel = cancel_after(args.timeout_secs);
    let result = run_search(config.clone(), oracle, seed, &cancel, !args.no_progress)?;

    print_summary(&result);
    if let Some(dir) = &args.output {
        let path = save_results(dir, &result, &config, seed)?;
        println!("\nReport written to {}", path.display());
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &BalanceArgs) -> EvolutionConfig {
    EvolutionConfig {
        population_size: args.population,
        mutation_rate: args.mutation_rate,
        crossover_rate: args.crossover_rate,
        elitism: args.elitism,
        squads_per_eval: args.squads,
        max_generations: args.max_generations,
        ..EvolutionConfig::default()
    }
}

fn build_oracle(args: &BalanceArgs, config: &EvolutionConfig, seed: u64) -> Result<TournamentOracle> {
    let mut tournament = TournamentConfig::default()
        .with_ai(AiConfig::both(args.strategy.into()))
        .with_max_sim_steps(args.max_sim_steps);
    tournament.workers = args.workers;

    let eval = EvalConfig::new(config.squads_per_eval)
        .with_budget(args.points, args.squad_size)
        .with_tournament(tournament);
    eval.validate().context("Invalid evaluation settings")?;

    let data = args.data.load()?;
    let evaluator = FitnessEvaluator::new(data.ctx, data.generator, eval);
    Ok(TournamentOracle::new(evaluator, seed))
}

/// Drive the generation loop, printing each generation's stats
fn run_search(
    config: EvolutionConfig,
    oracle: TournamentOracle,
    seed: u64,
    cancel: &CancelToken,
    show_progress: bool,
) -> Result<EvolutionResult> {
    let progress = create_progress_bar(config.max_generations as u64, show_progress)?;
    let mut evolver = Evolver::new(config, oracle, seed)?;

    let outcome = evolver.run(cancel, |stats| {
        progress.println(stats.to_string());
        progress.set_message(format!("best {:.4}", stats.best));
        progress.inc(1);
    });

    match outcome {
        Ok(result) => {
            progress.finish_with_message(format!("best {:.4}", result.best.fitness));
            Ok(result)
        }
        Err(err) => {
            progress.abandon();
            if err.is_cancelled() {
                if let Some(best) = evolver.best() {
                    println!("\nCancelled after {} generations; best so far:", evolver.generation());
                    print_costs(&best.costs);
                }
            }
            Err(err).context("Balance search failed")
        }
    }
}

fn print_summary(result: &EvolutionResult) {
    println!("\n=== Balance Search Complete ===");
    println!("Generations: {}", result.generations());
    println!("Best fitness: {:.4}", result.best.fitness);
    println!("\nBest cost model:");
    print_costs(&result.best.costs);
    println!("\nCompared to defaults:");
    print_comparison(&Costs::default(), &result.best.costs);
}

fn save_results(dir: &Path, result: &EvolutionResult, config: &EvolutionConfig, seed: u64) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let now = chrono::Local::now();
    let path = dir.join(format!("balance_{}.json", now.format("%Y%m%d_%H%M%S")));
    let report = BalanceReport {
        timestamp: now.to_rfc3339(),
        seed,
        config,
        best: &result.best,
        default_costs: Costs::default(),
        history: &result.history,
    };

    let json = serde_json::to_string_pretty(&report)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn create_progress_bar(len: u64, visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} gens {msg}")?,
    );
    Ok(bar)
}

fn print_costs(costs: &Costs) {
    for gene in Gene::ALL {
        println!("  {:<16} {:>8.4}", gene.name(), gene.get(costs));
    }
}

fn print_comparison(baseline: &Costs, tuned: &Costs) {
    println!("  {:<16} {:>8} {:>8} {:>8} {:>8}", "gene", "default", "tuned", "change", "%");
    for gene in Gene::ALL {
        let (before, after) = (gene.get(baseline), gene.get(tuned));
        println!(
            "  {:<16} {:>8.4} {:>8.4} {:>+8.4} {:>8}",
            gene.name(),
            before,
            after,
            after - before,
            format_percent(before, after)
        );
    }
}

// ============================================================================
// LEVEL 4 - FORMATTING UTILITIES
// ============================================================================

fn format_percent(before: f64, after: f64) -> String {
    if before == 0.0 {
        "n/a".to_string()
    } else {
        format!("{:+.1}%", (after - before) / before * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(2.0, 3.0), "+50.0%");
        assert_eq!(format_percent(4.0, 3.0), "-25.0%");
        assert_eq!(format_percent(0.0, 1.0), "n/a");
    }
}
