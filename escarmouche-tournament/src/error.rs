//! Tournament error taxonomy

use escarmouche_core::GenError;

#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    #[error("a round robin needs at least 2 squads, got {0}")]
    NotEnoughSquads(usize),
    #[error("invalid evaluation config: {0}")]
    InvalidConfig(String),
    #[error("none of the {total} games completed")]
    NoGamesCompleted { total: usize },
    #[error("tournament cancelled")]
    Cancelled,
    #[error("squad generation failed: {0}")]
    Generation(#[from] GenError),
}

impl TournamentError {
    /// True for the cancellation variant, as opposed to a failed computation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TournamentError::Cancelled)
    }
}
