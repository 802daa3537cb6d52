//! Shared command plumbing: data files, seeds, cancellation
//!
//! Level 4 - File I/O and configuration utilities

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use escarmouche_core::{
    AbilityCatalog, AbilityRegistry, CancelToken, Costs, FuzzyEngine, Ranker, RuleBook,
    SimContext, SquadGenerator, StrategyKind,
};

// ============================================================================
// DATA FILES
// ============================================================================

/// Optional replacements for the built-in data
#[derive(Args, Clone, Debug, Default)]
pub struct DataArgs {
    /// Cost model JSON
    #[arg(long, value_name = "FILE")]
    pub costs: Option<PathBuf>,

    /// Ability catalog JSON
    #[arg(long, value_name = "FILE")]
    pub abilities: Option<PathBuf>,

    /// Strategic preference rule book JSON
    #[arg(long, value_name = "FILE")]
    pub strategy_rules: Option<PathBuf>,

    /// Unit ranking rule book JSON
    #[arg(long, value_name = "FILE")]
    pub rank_rules: Option<PathBuf>,
}

/// Everything loaded from [`DataArgs`]
pub struct Data {
    pub costs: Costs,
    pub ctx: Arc<SimContext>,
    pub generator: Arc<SquadGenerator>,
}

impl DataArgs {
    pub fn load(&self) -> Result<Data> {
        let costs = match &self.costs {
            Some(path) => Costs::load(path)?,
            None => Costs::default(),
        };
        let catalog = Arc::new(match &self.abilities {
            Some(path) => AbilityCatalog::load(path)?,
            None => AbilityCatalog::builtin(),
        });

        let strategy = engine(self.strategy_rules.as_ref(), RuleBook::strategy)
            .context("Failed to build strategy rule engine")?;
        let ranking = engine(self.rank_rules.as_ref(), RuleBook::ranking)
            .context("Failed to build ranking rule engine")?;

        let ctx = SimContext::new(
            AbilityRegistry::standard(),
            catalog.clone(),
            Arc::new(strategy),
            costs,
        );
        let generator = SquadGenerator::new(Ranker::new(Arc::new(ranking), catalog));

        Ok(Data {
            costs,
            ctx: Arc::new(ctx),
            generator: Arc::new(generator),
        })
    }
}

fn engine<F>(path: Option<&PathBuf>, builtin: F) -> Result<FuzzyEngine>
where
    F: FnOnce() -> std::result::Result<RuleBook, escarmouche_core::FuzzyError>,
{
    let book = match path {
        Some(path) => RuleBook::load(path)?,
        None => builtin()?,
    };
    Ok(FuzzyEngine::new(book)?)
}

// ============================================================================
// STRATEGIES
// ============================================================================

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrategyArg {
    Greedy,
    #[default]
    Fuzzy,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Greedy => StrategyKind::Greedy,
            StrategyArg::Fuzzy => StrategyKind::Fuzzy,
        }
    }
}

// ============================================================================
// SEEDS AND CANCELLATION
// ============================================================================

/// The given seed, or a fresh random one (logged so the run can be replayed)
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    let seed = seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "using seed");
    seed
}

/// Token that trips after `timeout_secs`, if given
pub fn cancel_after(timeout_secs: Option<u64>) -> CancelToken {
    let cancel = CancelToken::new();
    if let Some(secs) = timeout_secs {
        let watchdog = cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            tracing::warn!(secs, "timeout reached, cancelling");
            watchdog.cancel();
        });
    }
    cancel
}
