use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::lifecycle::{Denial, UnknownStatus};

/// Typed failures of the league services; controllers switch on the kind
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Illegal state transition or unmet precondition
    #[error("{0}")]
    Transition(String),

    /// Role, permission or ownership mismatch
    #[error("{0}")]
    Forbidden(String),

    /// Duplicate row or lost compare-and-swap
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

impl LifecycleError {
    pub fn not_found(entity: &str, id: i64) -> Self {
        LifecycleError::NotFound(format!("{} {} not found", entity, id))
    }

    pub fn modified_concurrently(entity: &str, id: i64) -> Self {
        LifecycleError::Conflict(format!(
            "{} {} was modified concurrently; reload and retry",
            entity, id
        ))
    }
}

impl From<Denial> for LifecycleError {
    fn from(denial: Denial) -> Self {
        if denial.is_authorization() {
            LifecycleError::Forbidden(denial.to_string())
        } else {
            LifecycleError::Transition(denial.to_string())
        }
    }
}

impl From<UnknownStatus> for LifecycleError {
    fn from(err: UnknownStatus) -> Self {
        LifecycleError::Validation(err.to_string())
    }
}
