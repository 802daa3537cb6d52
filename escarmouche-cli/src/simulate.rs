//! Simulate command - play one match and print every step
//!
//! Level 1 - Orchestration and Level 3 - Steps

use anyhow::{Context, Result};
use clap::Args;
use escarmouche_core::{Game, GameOptions, Player, SquadSource, Step, StrategyKind, Unit};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::common::{resolve_seed, DataArgs, StrategyArg};

#[derive(Args)]
pub struct SimulateArgs {
    /// Rank points per squad
    #[arg(long, default_value = "30")]
    pub points: u32,

    /// Units per squad
    #[arg(long, default_value = "6")]
    pub squad_size: usize,

    /// Turn limit before the match is decided on health
    #[arg(long, default_value = "100")]
    pub max_turns: u32,

    /// Strategy of player one
    #[arg(long, value_enum, default_value_t = StrategyArg::Fuzzy)]
    pub first: StrategyArg,

    /// Strategy of player two
    #[arg(long, value_enum, default_value_t = StrategyArg::Fuzzy)]
    pub second: StrategyArg,

    /// Only print the final board and the result
    #[arg(long)]
    pub quiet: bool,

    #[command(flatten)]
    pub data: DataArgs,
}

/// Run simulate command
pub fn run(args: SimulateArgs, seed: Option<u64>) -> Result<()> {
    let seed = resolve_seed(seed);
    let data = args.data.load()?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let squads = [
        data.generator
            .generate_squad(args.points, args.squad_size, &data.costs, &mut rng)
            .context("Failed to generate squad for player 1")?,
        data.generator
            .generate_squad(args.points, args.squad_size, &data.costs, &mut rng)
            .context("Failed to generate squad for player 2")?,
    ];
    for (player, squad) in Player::BOTH.into_iter().zip(&squads) {
        print_squad(player, squad);
    }

    let first: StrategyKind = args.first.into();
    let second: StrategyKind = args.second.into();
    let strategies = [
        first.build(data.ctx.clone(), rng.gen()),
        second.build(data.ctx.clone(), rng.gen()),
    ];
    let options = GameOptions::default().with_max_turns(args.max_turns);
    let mut game = Game::new(&squads[0], &squads[1], strategies, options, &mut rng)?;

    println!("\nTurn order: {} then {}", game.order()[0], game.order()[1]);
    println!("{}", game.state());

    let mut last = None;
    while let Some(step) = game.next() {
        if !args.quiet {
            print_step(&step);
            if step.is_over || ends_turn(&step, &game) {
                println!("{}", game.state());
            }
        }
        last = Some(step);
    }

    if args.quiet {
        println!("{}", game.state());
    }
    match last.and_then(|step| step.winner) {
        Some(winner) => println!("Winner: {winner} after {} turns", game.turn()),
        None => println!("No result"),
    }
    Ok(())
}

fn print_squad(player: Player, squad: &[Unit]) {
    println!("Squad of {player}:");
    for unit in squad {
        println!("  {unit}");
    }
}

fn print_step(step: &Step) {
    let what = match &step.action {
        Some(action) => action.to_string(),
        None if step.is_over => "match over".to_string(),
        None => "passes".to_string(),
    };
    println!("Turn {:>3} {}: {}", step.turn, step.player, what);
}

/// True once the step used the last action of its turn
fn ends_turn(step: &Step, game: &Game) -> bool {
    game.turn() > step.turn
}
