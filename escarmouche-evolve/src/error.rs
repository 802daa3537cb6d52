//! Evolution error taxonomy

use escarmouche_tournament::TournamentError;

#[derive(Debug, thiserror::Error)]
pub enum EvolveError {
    #[error("invalid evolution config: {0}")]
    InvalidConfig(String),
    #[error("failed to evaluate individual {index}: {source}")]
    Evaluation {
        index: usize,
        #[source]
        source: TournamentError,
    },
    #[error("evolution cancelled")]
    Cancelled,
    #[error("evolution already converged")]
    Finished,
}

impl EvolveError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EvolveError::Cancelled)
    }
}
