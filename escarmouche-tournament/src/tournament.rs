//! Round-robin tournament over a bounded worker pool
//!
//! Level 1 - Orchestration and Level 2 - Phases

use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use escarmouche_core::{CancelToken, GameError, Player, Unit};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::TournamentError;
use crate::fitness::herfindahl_index;
use crate::game_runner::{GameOutcome, GameRunner};

/// One squad's results across the round robin
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SquadRecord {
    /// Index of the squad in the input slice
    pub index: usize,
    pub wins: u32,
    pub losses: u32,
    /// Completed games the squad took part in
    pub games: u32,
}

impl SquadRecord {
    fn new(index: usize) -> Self {
        Self { index, wins: 0, losses: 0, games: 0 }
    }

    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.games)
        }
    }
}

/// Result of a round robin
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentResult {
    /// Per-squad records, indexed like the input squads
    pub records: Vec<SquadRecord>,
    /// Games that produced a winner
    pub completed_games: usize,
    /// Games abandoned on error
    pub failed_games: usize,
    /// Normalized win-share concentration, 0 = even
    pub hhi: f64,
}

impl TournamentResult {
    /// Win count per squad index
    pub fn wins(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.wins).collect()
    }

    pub fn total_games(&self) -> usize {
        self.completed_games + self.failed_games
    }

    /// Balance score: 1 - HHI
    pub fn fitness(&self) -> f64 {
        1.0 - self.hhi
    }

    /// Records sorted by wins, best first
    pub fn standings(&self) -> Vec<&SquadRecord> {
        let mut sorted: Vec<&SquadRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| b.wins.cmp(&a.wins).then(a.index.cmp(&b.index)));
        sorted
    }
}

/// A match to play: `first` is placed as player one
#[derive(Clone, Copy, Debug)]
struct GameJob {
    index: usize,
    first: usize,
    second: usize,
    seed: u64,
}

struct GameReport {
    job: GameJob,
    outcome: Result<GameOutcome, GameError>,
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Play every ordered pair of distinct squads once.
///
/// Games run on a pool of scoped worker threads fed through bounded
/// channels. A game that errors or panics is counted as failed and the
/// tournament continues; it fails only when no game completes or when
/// `cancel` trips.
pub fn run_round_robin(
    squads: &[Vec<Unit>],
    runner: &GameRunner,
    cancel: &CancelToken,
) -> Result<TournamentResult, TournamentError> {
    let n = squads.len();
    if n < 2 {
        return Err(TournamentError::NotEnoughSquads(n));
    }

    let total = n * (n - 1);
    let workers = worker_count(total, runner.config().workers);
    let base_seed = runner.config().seed;
    debug!(squads = n, games = total, workers, "starting round robin");

    let (job_tx, job_rx) = bounded::<GameJob>(workers * 2);
    let (report_tx, report_rx) = bounded::<GameReport>(workers * 2);
    let mut tally = Tally::new(n);

    thread::scope(|scope| {
        scope.spawn(move || dispatch(n, base_seed, job_tx, cancel));
        for _ in 0..workers {
            let jobs = job_rx.clone();
            let reports = report_tx.clone();
            scope.spawn(move || work(jobs, reports, squads, runner, cancel));
        }
        // Only workers hold these now, so the report stream ends with them
        drop(job_rx);
        drop(report_tx);

        for report in report_rx.iter() {
            tally.record(report);
        }
    });

    if cancel.is_cancelled() {
        info!(completed = tally.completed, "round robin cancelled");
        return Err(TournamentError::Cancelled);
    }
    if tally.completed == 0 {
        return Err(TournamentError::NoGamesCompleted { total });
    }

    let result = tally.finish();
    info!(
        completed = result.completed_games,
        failed = result.failed_games,
        hhi = result.hhi,
        "round robin finished"
    );
    Ok(result)
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// Enqueue every pairing until done, cancelled, or the workers are gone
fn dispatch(n: usize, base_seed: u64, jobs: Sender<GameJob>, cancel: &CancelToken) {
    for (index, (first, second)) in pairings(n).enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        let job = GameJob { index, first, second, seed: game_seed(base_seed, index) };
        if jobs.send(job).is_err() {
            break;
        }
    }
}

/// Worker loop: one full match per job, reported back by value
fn work(
    jobs: Receiver<GameJob>,
    reports: Sender<GameReport>,
    squads: &[Vec<Unit>],
    runner: &GameRunner,
    cancel: &CancelToken,
) {
    for job in jobs.iter() {
        let outcome = if cancel.is_cancelled() {
            Err(GameError::Cancelled)
        } else {
            runner.play_guarded(&squads[job.first], &squads[job.second], job.seed, cancel)
        };
        if reports.send(GameReport { job, outcome }).is_err() {
            break;
        }
    }
}

/// Running totals, fed in arrival order
struct Tally {
    records: Vec<SquadRecord>,
    completed: usize,
    failed: usize,
}

impl Tally {
    fn new(n: usize) -> Self {
        Self {
            records: (0..n).map(SquadRecord::new).collect(),
            completed: 0,
            failed: 0,
        }
    }

    fn record(&mut self, report: GameReport) {
        let GameReport { job, outcome } = report;
        match outcome {
            Ok(outcome) => {
                let (winner, loser) = match outcome.winner {
                    Player::One => (job.first, job.second),
                    Player::Two => (job.second, job.first),
                };
                self.records[winner].wins += 1;
                self.records[loser].losses += 1;
                self.records[job.first].games += 1;
                self.records[job.second].games += 1;
                self.completed += 1;
                debug!(
                    game = job.index,
                    first = job.first,
                    second = job.second,
                    winner,
                    steps = outcome.steps,
                    decision = ?outcome.decision,
                    "game finished"
                );
            }
            Err(GameError::Cancelled) => self.failed += 1,
            Err(err) => {
                warn!(game = job.index, first = job.first, second = job.second, %err, "game not completed");
                self.failed += 1;
            }
        }
    }

    fn finish(self) -> TournamentResult {
        let wins: Vec<u32> = self.records.iter().map(|r| r.wins).collect();
        TournamentResult {
            hhi: herfindahl_index(&wins),
            records: self.records,
            completed_games: self.completed,
            failed_games: self.failed,
        }
    }
}

// ============================================================================
// Level 4 - Utilities
// ============================================================================

/// Every ordered pair (i, j) with i != j
pub fn pairings(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
}

/// Pool size for `total_games` games.
///
/// An explicit request is only capped by the game count. Otherwise one
/// hardware thread is left for orchestration, and small tournaments get one
/// worker per game.
pub fn worker_count(total_games: usize, requested: Option<usize>) -> usize {
    let workers = match requested {
        Some(requested) => requested.min(total_games),
        None => {
            let available = thread::available_parallelism().map_or(1, |n| n.get());
            if total_games < available {
                total_games
            } else {
                available - 1
            }
        }
    };
    workers.max(1)
}

fn game_seed(base: u64, index: usize) -> u64 {
    base ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AiConfig, TournamentConfig};
    use escarmouche_core::{SimContext, Stats, StrategyKind};
    use std::sync::Arc;

    fn runner(config: TournamentConfig) -> GameRunner {
        GameRunner::new(Arc::new(SimContext::standard().unwrap()), config)
    }

    fn squads(n: usize) -> Vec<Vec<Unit>> {
        (0..n)
            .map(|i| {
                let i = i as i32;
                vec![
                    Unit::new(Stats::new(2 + i % 3, 1 + i % 2, 2, 1 + i % 2)),
                    Unit::new(Stats::new(3, 2, 1, 1)),
                ]
            })
            .collect()
    }

    #[test]
    fn test_pairings_cover_ordered_pairs() {
        let all: Vec<_> = pairings(3).collect();
        assert_eq!(all, vec![(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)]);
        assert_eq!(pairings(5).count(), 20);
        assert_eq!(pairings(1).count(), 0);
    }

    #[test]
    fn test_worker_count_bounds() {
        assert_eq!(worker_count(1, None), 1);
        assert!(worker_count(1000, None) >= 1);
        assert_eq!(worker_count(2, Some(8)), 2);
        assert_eq!(worker_count(10, Some(3)), 3);
        assert_eq!(worker_count(10, Some(0)), 1);
        let available = thread::available_parallelism().map_or(1, |n| n.get());
        assert!(worker_count(1000, None) <= available);
    }

    #[test]
    fn test_game_seeds_differ() {
        assert_ne!(game_seed(5, 0), game_seed(5, 1));
        assert_ne!(game_seed(5, 0), game_seed(6, 0));
    }

    #[test]
    fn test_round_robin_plays_every_pair() {
        let config = TournamentConfig::default().with_workers(3).with_seed(11);
        let result = run_round_robin(&squads(4), &runner(config), &CancelToken::new()).unwrap();

        assert_eq!(result.completed_games, 12);
        assert_eq!(result.failed_games, 0);
        assert_eq!(result.wins().iter().sum::<u32>(), 12);
        for record in &result.records {
            assert_eq!(record.games, 6);
            assert_eq!(record.wins + record.losses, 6);
        }
        assert!((0.0..=1.0).contains(&result.hhi));
    }

    #[test]
    fn test_single_worker_pool() {
        let config = TournamentConfig::default()
            .with_ai(AiConfig::both(StrategyKind::Greedy))
            .with_workers(1);
        let result = run_round_robin(&squads(3), &runner(config), &CancelToken::new()).unwrap();
        assert_eq!(result.completed_games, 6);
    }

    #[test]
    fn test_too_few_squads() {
        let err = run_round_robin(&squads(1), &runner(TournamentConfig::default()), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, TournamentError::NotEnoughSquads(1)));
    }

    #[test]
    fn test_cancelled_tournament_is_an_error() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = run_round_robin(&squads(3), &runner(TournamentConfig::default()), &cancel)
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_failed_games_are_skipped() {
        // An empty squad cannot be set up; its games fail, the rest complete
        let mut squads = squads(3);
        squads.push(Vec::new());
        let config = TournamentConfig::default().with_workers(2);
        let result = run_round_robin(&squads, &runner(config), &CancelToken::new()).unwrap();

        assert_eq!(result.failed_games, 6);
        assert_eq!(result.completed_games, 6);
        assert_eq!(result.records[3].games, 0);
    }

    #[test]
    fn test_no_completed_games() {
        let squads = vec![Vec::new(), Vec::new()];
        let err = run_round_robin(&squads, &runner(TournamentConfig::default()), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, TournamentError::NoGamesCompleted { total: 2 }));
    }

    #[test]
    fn test_standings_order() {
        let result = TournamentResult {
            records: vec![
                SquadRecord { index: 0, wins: 1, losses: 3, games: 4 },
                SquadRecord { index: 1, wins: 3, losses: 1, games: 4 },
            ],
            completed_games: 4,
            failed_games: 0,
            hhi: 0.25,
        };
        let order: Vec<usize> = result.standings().iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 0]);
        assert_eq!(result.fitness(), 0.75);
        assert_eq!(result.records[1].win_rate(), 0.75);
    }
}
