//! Escarmouche Core - Tactical squad combat engine and AI
//!
//! This crate provides the simulation side of the balancer:
//! - Board geometry (8x8 square grid)
//! - Arena-backed game state with per-unit counters
//! - Actions, ability effects, and the damage primitive
//! - Legal action generation (pathfinding, line of sight, reach)
//! - Cost model, fuzzy rule engine, and unit ranking
//! - Archetype-driven squad generation
//! - One-ply strategies and the match runner

pub mod ability;
pub mod action;
pub mod board;
pub mod cancel;
pub mod context;
pub mod cost;
pub mod eval;
pub mod fuzzy;
pub mod game;
pub mod gen;
pub mod movegen;
pub mod rank;
pub mod state;
pub mod strategy;
pub mod unit;

// Re-exports for convenient access
pub use ability::{Ability, AbilityCatalog, AbilityGenerator, AbilityRegistry};
pub use action::{AbilityEffect, Action, ActionKind, EffectOp};
pub use board::{Position, BOARD_SIZE, DIRECTIONS};
pub use cancel::CancelToken;
pub use context::{ranker_for, SimContext};
pub use cost::Costs;
pub use eval::{evaluate_state, StrategicContext, StrategicDecision};
pub use fuzzy::{FuzzyEngine, FuzzyError, Inference, RuleBook, RuleEngine, Values};
pub use game::{Game, GameError, GameOptions, GameStatus, Step};
pub use gen::{Archetype, GenError, GeneratedUnit, SquadGenerator, SquadSource};
pub use movegen::{has_line_of_sight, legal_actions, reachable_positions, reachable_targets};
pub use rank::{Evaluation, Rank, RankError, Ranker};
pub use state::{Counter, GameState, StateError};
pub use strategy::{FuzzyStrategy, GreedyStrategy, Strategy, StrategyKind};
pub use unit::{AbilityId, Player, PlayerUnit, Stats, Unit, UnitId};
