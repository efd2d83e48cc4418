//! Domain errors for the deadline scheduler.

use thiserror::Error;

/// Domain-level errors that can occur in the schedule manager.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid timing expression: {0}")]
    InvalidTiming(String),

    #[error("invalid start time: {0}")]
    InvalidStartTime(String),

    #[error("blueprint validation failed: {0}")]
    ValidationFailed(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::ValidationFailed(err.to_string())
    }
}
