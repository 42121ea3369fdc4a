//! Service Layer Error Types

use crate::hierarchy::HierarchyError;
use crate::store::{LocalStateError, StoreError};
use crate::validation::ValidationError;
use thiserror::Error;

/// One failed item of a batch operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub id: String,
    pub message: String,
}

/// Service operation errors.
///
/// Validation errors are caught before any network call and are always
/// recoverable by correcting input. Remote-call errors carry the backend's
/// message unmodified. Batch operations report partial failure without
/// rolling back the requests that succeeded.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Entity not found by id
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Input failed schema validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Remote table gateway failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Tree construction failure
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    /// Local persisted state failure
    #[error(transparent)]
    LocalState(#[from] LocalStateError),

    /// Some requests of a concurrent batch failed; the rest were applied
    #[error("batch partially failed: {succeeded} succeeded, {} failed", .failures.len())]
    PartialFailure {
        succeeded: usize,
        failures: Vec<BatchFailure>,
    },
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a partial failure error
    pub fn partial_failure(succeeded: usize, failures: Vec<BatchFailure>) -> Self {
        Self::PartialFailure {
            succeeded,
            failures,
        }
    }
}
