//! [`SubmissionStore`] implementation over SQLite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inquiry_core::{
    ContactSubmission, IdSpace, NewSubmission, Operation, PersistenceError, SubmissionId,
    SubmissionStatus, SubmissionStore,
};
use tracing::{debug, error};

use crate::error::DatabaseError;
use crate::submission;
use crate::Database;

/// Relational submission store with auto-incrementing integer ids.
#[derive(Debug, Clone)]
pub struct SqlSubmissionStore {
    db: Database,
}

impl SqlSubmissionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// Translate a database failure for `operation` into the gateway taxonomy.
fn translate(
    operation: Operation,
    id: Option<&SubmissionId>,
    err: DatabaseError,
) -> PersistenceError {
    if let (DatabaseError::NotFound(_), Some(id)) = (&err, id) {
        return PersistenceError::not_found(operation, id.clone());
    }

    error!(%operation, error = %err, "SQLite submission store failure");
    match operation {
        Operation::Save | Operation::UpdateStatus => PersistenceError::write_failed(operation, err),
        Operation::List | Operation::Get => PersistenceError::read_failed(operation, err),
    }
}

/// Integer key behind `id`, or `None` when it comes from another id space.
fn serial(id: &SubmissionId) -> Option<i64> {
    match id {
        SubmissionId::Serial(id) => Some(*id),
        SubmissionId::Key(_) => None,
    }
}

#[async_trait]
impl SubmissionStore for SqlSubmissionStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn id_space(&self) -> IdSpace {
        IdSpace::Serial
    }

    async fn insert(&self, new: &NewSubmission) -> Result<ContactSubmission, PersistenceError> {
        debug!("Inserting contact submission");
        submission::insert_submission(self.db.pool(), new)
            .await
            .map_err(|e| translate(Operation::Save, None, e))
    }

    async fn list(&self) -> Result<Vec<ContactSubmission>, PersistenceError> {
        submission::list_submissions(self.db.pool())
            .await
            .map_err(|e| translate(Operation::List, None, e))
    }

    async fn fetch(&self, id: &SubmissionId) -> Result<ContactSubmission, PersistenceError> {
        let Some(key) = serial(id) else {
            return Err(PersistenceError::not_found(Operation::Get, id.clone()));
        };

        submission::get_submission(self.db.pool(), key)
            .await
            .map_err(|e| translate(Operation::Get, Some(id), e))
    }

    async fn update_status(
        &self,
        id: &SubmissionId,
        status: SubmissionStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<ContactSubmission, PersistenceError> {
        let Some(key) = serial(id) else {
            return Err(PersistenceError::not_found(Operation::UpdateStatus, id.clone()));
        };

        debug!(id = key, %status, "Updating submission status");
        submission::update_submission_status(self.db.pool(), key, status, updated_at)
            .await
            .map_err(|e| translate(Operation::UpdateStatus, Some(id), e))?;

        submission::get_submission(self.db.pool(), key)
            .await
            .map_err(|e| translate(Operation::UpdateStatus, Some(id), e))
    }

    async fn is_ready(&self) -> bool {
        match sqlx::query("SELECT 1").execute(self.db.pool()).await {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "SQLite health check failed");
                false
            }
        }
    }
}
