//! The adapter trait every backend implements.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::PersistenceError;
use crate::models::{ContactSubmission, IdSpace, NewSubmission, SubmissionId, SubmissionStatus};

/// A backend-specific implementation of submission storage.
///
/// Implementations translate every backend failure into a
/// [`PersistenceError`] before returning. This trait is object-safe and is
/// held as `Arc<dyn SubmissionStore>` by the [`crate::Gateway`].
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Identifier space of the ids this backend assigns.
    fn id_space(&self) -> IdSpace;

    /// Insert a submission and return it as persisted, with the
    /// backend-assigned id and creation time.
    async fn insert(
        &self,
        submission: &NewSubmission,
    ) -> Result<ContactSubmission, PersistenceError>;

    /// All submissions, newest first.
    async fn list(&self) -> Result<Vec<ContactSubmission>, PersistenceError>;

    /// A single submission by id.
    async fn fetch(&self, id: &SubmissionId) -> Result<ContactSubmission, PersistenceError>;

    /// Set `status` and `updated_at`, then read the row back.
    ///
    /// The returned record must come from a read issued after the write,
    /// whatever the write call itself returned.
    async fn update_status(
        &self,
        id: &SubmissionId,
        status: SubmissionStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<ContactSubmission, PersistenceError>;

    /// Check that the backend is reachable.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }
}
