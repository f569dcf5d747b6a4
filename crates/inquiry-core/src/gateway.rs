//! The persistence gateway.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{GatewayError, Result};
use crate::models::{
    ContactSubmission, IdSpace, NewSubmission, SubmissionId, SubmissionInput, SubmissionStatus,
};
use crate::store::SubmissionStore;
use crate::validation::validate_submission;

/// Backend-agnostic entry point for storing and reviewing submissions.
///
/// A gateway wraps exactly one [`SubmissionStore`] for its whole lifetime.
/// Cloning is cheap and shares the same store.
#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn SubmissionStore>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("backend", &self.store.name())
            .finish()
    }
}

impl Gateway {
    /// Create a gateway over a concrete store.
    pub fn new<S>(store: S) -> Self
    where
        S: SubmissionStore + 'static,
    {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.store.name()
    }

    pub fn id_space(&self) -> IdSpace {
        self.store.id_space()
    }

    /// Store a new submission.
    ///
    /// Required fields are checked before the backend is touched. The stored
    /// record always starts as [`SubmissionStatus::New`] with no `updated_at`.
    pub async fn save(&self, input: SubmissionInput) -> Result<ContactSubmission> {
        if let Err(err) = validate_submission(&input) {
            warn!(error = %err, "Rejected submission before persistence");
            return Err(GatewayError::Validation(err));
        }

        let submission = NewSubmission::new(input);
        let saved = self.store.insert(&submission).await?;

        info!(
            backend = self.store.name(),
            id = %saved.id,
            inquiry_type = %saved.inquiry_type,
            "Saved contact submission"
        );
        Ok(saved)
    }

    /// All submissions, most recent first.
    pub async fn list(&self) -> Result<Vec<ContactSubmission>> {
        let submissions = self.store.list().await?;
        debug!(
            backend = self.store.name(),
            count = submissions.len(),
            "Listed contact submissions"
        );
        Ok(submissions)
    }

    /// Submissions in one status, most recent first.
    pub async fn list_by_status(&self, status: SubmissionStatus) -> Result<Vec<ContactSubmission>> {
        let mut submissions = self.list().await?;
        submissions.retain(|s| s.status == status);
        Ok(submissions)
    }

    /// A single submission.
    pub async fn get(&self, id: &SubmissionId) -> Result<ContactSubmission> {
        Ok(self.store.fetch(id).await?)
    }

    /// Change the handling status of a submission.
    ///
    /// Any status may follow any other. `updated_at` is stamped with the
    /// current time and the returned record is the one read back after the
    /// write.
    pub async fn update_status(
        &self,
        id: &SubmissionId,
        status: SubmissionStatus,
    ) -> Result<ContactSubmission> {
        let now = Utc::now();
        let updated = self.store.update_status(id, status, now).await?;

        info!(
            backend = self.store.name(),
            id = %updated.id,
            status = %updated.status,
            "Updated submission status"
        );
        Ok(updated)
    }

    /// Whether the backend answers.
    pub async fn is_ready(&self) -> bool {
        self.store.is_ready().await
    }
}
