use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Failure taxonomy of the engagement core.
///
/// Every variant is terminal for the calling request and leaves both the job
/// and the reputation records exactly as they were before the call. Only
/// `ConcurrentUpdateConflict` is safe for a caller to retry blindly — the
/// retry simply re-evaluates current state.
#[derive(Debug, Error)]
pub enum EngagementError {
    #[error("job {0} not found")]
    NotFound(Uuid),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    InvalidState(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("provider {0} is not available for hire")]
    ProviderUnavailable(Uuid),

    #[error("job {0} was modified by a concurrent request")]
    ConcurrentUpdateConflict(Uuid),

    #[error("database error: {0}")]
    Db(#[from] DbErr),
}
