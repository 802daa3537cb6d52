//! Tournament command - round robin between generated squads
//!
//! Level 1 - Orchestration and Level 4 - Formatting

use anyhow::{Context, Result};
use clap::Args;
use escarmouche_core::Unit;
use escarmouche_tournament::{
    run_round_robin, AiConfig, EvalConfig, FitnessEvaluator, GameRunner, TournamentConfig,
    TournamentResult,
};

use crate::common::{cancel_after, resolve_seed, DataArgs, StrategyArg};

#[derive(Args)]
pub struct TournamentArgs {
    /// Number of squads
    #[arg(long, default_value = "8")]
    pub squads: usize,

    /// Rank points per squad
    #[arg(long, default_value = "30")]
    pub points: u32,

    /// Units per squad
    #[arg(long, default_value = "6")]
    pub squad_size: usize,

    /// Step cap per match
    #[arg(long, default_value = "250")]
    pub max_sim_steps: u32,

    /// Worker threads (default: available parallelism - 1)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Strategy of the squad moving as player one
    #[arg(long, value_enum, default_value_t = StrategyArg::Fuzzy)]
    pub first: StrategyArg,

    /// Strategy of the squad moving as player two
    #[arg(long, value_enum, default_value_t = StrategyArg::Fuzzy)]
    pub second: StrategyArg,

    /// Cancel the tournament after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub data: DataArgs,
}

/// Run tournament command
pub fn run(args: TournamentArgs, seed: Option<u64>) -> Result<()> {
    let seed = resolve_seed(seed);

    let mut tournament = TournamentConfig::default()
        .with_ai(AiConfig {
            first: args.first.into(),
            second: args.second.into(),
        })
        .with_max_sim_steps(args.max_sim_steps)
        .with_seed(seed);
    tournament.workers = args.workers;

    let eval = EvalConfig::new(args.squads)
        .with_budget(args.points, args.squad_size)
        .with_tournament(tournament.clone());
    eval.validate().context("Invalid tournament settings")?;

    let data = args.data.load()?;
    let evaluator = FitnessEvaluator::new(data.ctx.clone(), data.generator, eval);
    let squads = evaluator.generate_squads(&data.costs, seed)?;

    let cancel = cancel_after(args.timeout_secs);
    let runner = GameRunner::new(data.ctx, tournament);
    let result = run_round_robin(&squads, &runner, &cancel).context("Tournament failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_squads(&squads);
        print_standings(&result);
    }
    Ok(())
}

fn print_squads(squads: &[Vec<Unit>]) {
    println!("=== Squads ===");
    for (i, squad) in squads.iter().enumerate() {
        println!("Squad {i}:");
        for unit in squad {
            println!("  {unit}");
        }
    }
}

fn print_standings(result: &TournamentResult) {
    println!("\n=== Standings ===");
    println!("{:>5} {:>5} {:>6} {:>6} {:>8}", "squad", "wins", "losses", "games", "win %");
    for record in result.standings() {
        println!(
            "{:>5} {:>5} {:>6} {:>6} {:>7.1}%",
            record.index,
            record.wins,
            record.losses,
            record.games,
            record.win_rate() * 100.0
        );
    }
    println!(
        "\nGames: {} completed, {} failed",
        result.completed_games, result.failed_games
    );
    println!("HHI: {:.4}  Fitness: {:.4}", result.hhi, result.fitness());
}
