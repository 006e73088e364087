use super::domain::{Submission, SubmissionId, SubmissionStatus};

/// Storage abstraction for submissions. `replace_if_status` is the atomic
/// compare-and-swap every state transition goes through, so any backend with
/// conditional update semantics can satisfy the contract.
pub trait SubmissionRepository: Send + Sync {
    fn insert(&self, submission: Submission) -> Result<Submission, RepositoryError>;
    fn fetch(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError>;
    /// Replace the stored submission only while its status still equals
    /// `expected`. Fails with `StatusMismatch` when another actor got there
    /// first.
    fn replace_if_status(
        &self,
        id: &SubmissionId,
        expected: SubmissionStatus,
        updated: Submission,
    ) -> Result<Submission, RepositoryError>;
    fn for_supplier(&self, organization: &str) -> Result<Vec<Submission>, RepositoryError>;
    fn with_status(&self, status: SubmissionStatus) -> Result<Vec<Submission>, RepositoryError>;
    fn all(&self) -> Result<Vec<Submission>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("submission already exists")]
    Conflict,
    #[error("submission not found")]
    NotFound,
    #[error("submission status changed concurrently (expected {expected}, found {actual})",
        expected = .expected.label(), actual = .actual.label())]
    StatusMismatch {
        expected: SubmissionStatus,
        actual: SubmissionStatus,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
