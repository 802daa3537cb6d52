//! Configuration for tournaments and fitness evaluation
//!
//! Level 4 - Utilities and configuration

use escarmouche_core::gen::{DEFAULT_MAX_RANK_POINTS, DEFAULT_MAX_SQUAD_SIZE};
use escarmouche_core::{GameOptions, Player, StrategyKind, BOARD_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::TournamentError;

/// Step cap per simulated match. A backstop: with the default game
/// options the turn limit (100 turns of 2 actions) ends a match first.
pub const DEFAULT_MAX_SIM_STEPS: u32 = 250;

/// Strategy selection for both sides of a match
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Strategy for the squad placed as player one
    pub first: StrategyKind,
    /// Strategy for the squad placed as player two
    pub second: StrategyKind,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::both(StrategyKind::Fuzzy)
    }
}

impl AiConfig {
    /// Same strategy on both sides
    pub fn both(kind: StrategyKind) -> Self {
        Self { first: kind, second: kind }
    }

    pub fn for_player(&self, player: Player) -> StrategyKind {
        match player {
            Player::One => self.first,
            Player::Two => self.second,
        }
    }
}

/// Round-robin configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub ai: AiConfig,
    pub game: GameOptions,
    /// Steps after which a match is decided on remaining health
    pub max_sim_steps: u32,
    /// Worker threads; `None` sizes the pool from available parallelism
    pub workers: Option<usize>,
    /// Base seed; each game derives its own from it
    pub seed: u64,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            ai: AiConfig::default(),
            game: GameOptions::default(),
            max_sim_steps: DEFAULT_MAX_SIM_STEPS,
            workers: None,
            seed: 0,
        }
    }
}

impl TournamentConfig {
    pub fn with_ai(mut self, ai: AiConfig) -> Self {
        self.ai = ai;
        self
    }

    pub fn with_game(mut self, game: GameOptions) -> Self {
        self.game = game;
        self
    }

    pub fn with_max_sim_steps(mut self, steps: u32) -> Self {
        self.max_sim_steps = steps;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Fitness evaluation of one cost model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Squads generated per evaluation
    pub squads: usize,
    /// Rank-point budget per squad
    pub max_rank_points: u32,
    /// Units per squad
    pub max_squad_size: usize,
    pub tournament: TournamentConfig,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            squads: 10,
            max_rank_points: DEFAULT_MAX_RANK_POINTS,
            max_squad_size: DEFAULT_MAX_SQUAD_SIZE,
            tournament: TournamentConfig::default(),
        }
    }
}

impl EvalConfig {
    /// Create config with the given squad count
    pub fn new(squads: usize) -> Self {
        Self {
            squads,
            ..Default::default()
        }
    }

    pub fn with_tournament(mut self, tournament: TournamentConfig) -> Self {
        self.tournament = tournament;
        self
    }

    pub fn with_budget(mut self, max_rank_points: u32, max_squad_size: usize) -> Self {
        self.max_rank_points = max_rank_points;
        self.max_squad_size = max_squad_size;
        self
    }

    /// Reject settings no round robin can run with
    pub fn validate(&self) -> Result<(), TournamentError> {
        if self.squads < 2 {
            return Err(TournamentError::NotEnoughSquads(self.squads));
        }
        let max = BOARD_SIZE as usize;
        if self.max_squad_size == 0 || self.max_squad_size > max {
            return Err(TournamentError::InvalidConfig(format!(
                "squad size must be between 1 and {max}, got {}",
                self.max_squad_size
            )));
        }
        if self.tournament.max_sim_steps == 0 {
            return Err(TournamentError::InvalidConfig("step cap must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tournament_config_defaults() {
        let config = TournamentConfig::default();
        assert_eq!(config.max_sim_steps, 250);
        assert_eq!(config.game.max_turns, 100);
        assert_eq!(config.game.actions_per_turn, 2);
        assert!(config.workers.is_none());
        assert_eq!(config.ai, AiConfig::both(StrategyKind::Fuzzy));
    }

    #[test]
    fn test_ai_config_per_side() {
        let ai = AiConfig {
            first: StrategyKind::Greedy,
            second: StrategyKind::Fuzzy,
        };
        assert_eq!(ai.for_player(Player::One), StrategyKind::Greedy);
        assert_eq!(ai.for_player(Player::Two), StrategyKind::Fuzzy);
    }

    #[test]
    fn test_eval_config_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.squads, 10);
        assert_eq!(config.max_rank_points, 30);
        assert_eq!(config.max_squad_size, 6);
    }

    #[test]
    fn test_builders() {
        let config = EvalConfig::new(4)
            .with_budget(20, 4)
            .with_tournament(TournamentConfig::default().with_workers(2).with_seed(9));
        assert_eq!(config.squads, 4);
        assert_eq!(config.max_rank_points, 20);
        assert_eq!(config.tournament.workers, Some(2));
        assert_eq!(config.tournament.seed, 9);
    }

    #[test]
    fn test_eval_config_validation() {
        assert!(EvalConfig::default().validate().is_ok());
        assert!(EvalConfig::new(2).with_budget(30, 8).validate().is_ok());
        assert!(matches!(
            EvalConfig::new(1).validate(),
            Err(TournamentError::NotEnoughSquads(1))
        ));
        for size in [0, 9, 12] {
            assert!(matches!(
                EvalConfig::default().with_budget(30, size).validate(),
                Err(TournamentError::InvalidConfig(_))
            ));
        }
        let no_steps = EvalConfig::default()
            .with_tournament(TournamentConfig::default().with_max_sim_steps(0));
        assert!(no_steps.validate().is_err());
    }

    #[test]
    fn test_default_step_cap_outlasts_turn_limit() {
        let config = TournamentConfig::default();
        let turn_limit = config.game.max_turns * u32::from(config.game.actions_per_turn);
        assert!(config.max_sim_steps >= turn_limit);
    }

    #[test]
    fn test_config_json() {
        let config = TournamentConfig::default().with_max_sim_steps(40);
        let json = serde_json::to_string(&config).unwrap();
        let back: TournamentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
