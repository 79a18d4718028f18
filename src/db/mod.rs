pub mod submissions;

use async_trait::async_trait;

use crate::models::{Submission, SubmissionId};

pub use submissions::MongoStore;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Append-only storage for accepted submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn store(&self, submission: &Submission) -> Result<SubmissionId, StorageError>;

    /// Round-trip to the backing store. Used by the readiness probe.
    async fn ping(&self) -> Result<(), StorageError>;
}

/// Storage failures, bucketed so callers never see driver text.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("the database is currently unavailable")]
    Unavailable(#[source] BoxError),
    #[error("this submission has already been stored")]
    Duplicate(#[source] BoxError),
    #[error("the submission was rejected by the database")]
    Rejected(#[source] BoxError),
    #[error("an unexpected database error occurred")]
    Other(#[source] BoxError),
}

impl StorageError {
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::Unavailable(_) => "storage_unavailable",
            StorageError::Duplicate(_) => "storage_duplicate",
            StorageError::Rejected(_) => "storage_rejected",
            StorageError::Other(_) => "storage_error",
        }
    }
}
