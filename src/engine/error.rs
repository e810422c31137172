// ==========================================
// Roofline Engine - Engine Error Types
// ==========================================
// Input-absence preconditions are terminal for the current run and
// surface as typed failures naming which precondition failed.
// Collaborator failures propagate wrapped, never swallowed; there is
// no retry, backoff or fallback substitution in this engine.
// ==========================================

use crate::repository::error::RepositoryError;
use crate::weather::provider::WeatherError;
use thiserror::Error;

/// Engine layer error type.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no take-off data for job {job_id}")]
    NoTakeoffData { job_id: String },

    #[error("no take-off quantities resolved to a catalog assembly for job {job_id}")]
    NoMappedAssemblies { job_id: String },

    #[error("no feasible start date within the forecast horizon for job {job_id}")]
    NoFeasibleStartDate { job_id: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

/// Result type alias.
pub type EngineResult<T> = Result<T, EngineError>;
