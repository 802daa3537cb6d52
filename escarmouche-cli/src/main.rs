//! Escarmouche CLI - Command-line interface
//!
//! Commands:
//! - balance: Evolve a cost model whose squads win in equal proportion
//! - tournament: Round robin between generated squads under one cost model
//! - simulate: Play one match step by step

mod balance;
mod common;
mod simulate;
mod tournament_cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "escarmouche")]
#[command(about = "Escarmouche squad balance simulator", version)]
struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Random seed; drawn at random when omitted
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the genetic balance search
    Balance(balance::BalanceArgs),
    /// Play a round robin between generated squads
    Tournament(tournament_cmd::TournamentArgs),
    /// Play a single match and print every step
    Simulate(simulate::SimulateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Balance(args) => balance::run(args, cli.seed),
        Commands::Tournament(args) => tournament_cmd::run(args, cli.seed),
        Commands::Simulate(args) => simulate::run(args, cli.seed),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
