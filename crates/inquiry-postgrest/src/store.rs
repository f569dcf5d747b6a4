//! [`SubmissionStore`] implementation over a hosted PostgREST table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inquiry_core::{
    ContactSubmission, IdSpace, NewSubmission, Operation, PersistenceError, SubmissionId,
    SubmissionStatus, SubmissionStore,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::client::PostgrestClient;
use crate::error::RestError;

/// Row as returned by the backend.
#[derive(Debug, Deserialize)]
struct SubmissionRecord {
    id: String,
    name: String,
    furigana: Option<String>,
    email: String,
    phone: String,
    inquiry_type: String,
    subject: String,
    message: String,
    ip_address: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl SubmissionRecord {
    fn into_submission(self) -> Result<ContactSubmission, RestError> {
        let status: SubmissionStatus = match self.status.parse() {
            Ok(status) => status,
            Err(e) => {
                return Err(RestError::InvalidRecord {
                    id: self.id,
                    reason: format!("{}", e),
                })
            }
        };

        Ok(ContactSubmission {
            id: SubmissionId::Key(self.id),
            name: self.name,
            furigana: self.furigana,
            email: self.email,
            phone: self.phone,
            inquiry_type: self.inquiry_type,
            subject: self.subject,
            message: self.message,
            ip_address: self.ip_address,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insert payload. Optional fields are sent as explicit nulls.
#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    name: &'a str,
    furigana: Option<&'a str>,
    email: &'a str,
    phone: &'a str,
    inquiry_type: &'a str,
    subject: &'a str,
    message: &'a str,
    ip_address: Option<&'a str>,
    status: SubmissionStatus,
}

impl<'a> From<&'a NewSubmission> for InsertRow<'a> {
    fn from(new: &'a NewSubmission) -> Self {
        Self {
            name: new.name(),
            furigana: new.furigana(),
            email: new.email(),
            phone: new.phone(),
            inquiry_type: new.inquiry_type(),
            subject: new.subject(),
            message: new.message(),
            ip_address: new.ip_address(),
            status: new.status(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusPatch {
    status: SubmissionStatus,
    updated_at: DateTime<Utc>,
}

/// Hosted row-store submission store with opaque string ids.
#[derive(Debug, Clone)]
pub struct PostgrestSubmissionStore {
    client: PostgrestClient,
}

impl PostgrestSubmissionStore {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    async fn fetch_for(
        &self,
        operation: Operation,
        id: &SubmissionId,
    ) -> Result<ContactSubmission, PersistenceError> {
        let key = row_key(id).ok_or_else(|| PersistenceError::not_found(operation, id.clone()))?;
        let query = [("select", "*".to_string()), ("id", format!("eq.{}", key))];

        let resp = self
            .client
            .select_single::<SubmissionRecord>(&query)
            .await
            .map_err(|e| translate(operation, e))?;
        if resp.is_no_rows() || resp.is_invalid_text() {
            return Err(PersistenceError::not_found(operation, id.clone()));
        }

        resp.into_result()
            .and_then(SubmissionRecord::into_submission)
            .map_err(|e| translate(operation, e))
    }
}

/// Translate a row-store failure for `operation` into the gateway taxonomy.
fn translate(operation: Operation, err: RestError) -> PersistenceError {
    error!(%operation, error = %err, "Row store submission failure");
    match operation {
        Operation::Save | Operation::UpdateStatus => PersistenceError::write_failed(operation, err),
        Operation::List | Operation::Get => PersistenceError::read_failed(operation, err),
    }
}

/// String key behind `id`, or `None` when it comes from another id space.
fn row_key(id: &SubmissionId) -> Option<&str> {
    match id {
        SubmissionId::Key(key) => Some(key.as_str()),
        SubmissionId::Serial(_) => None,
    }
}

#[async_trait]
impl SubmissionStore for PostgrestSubmissionStore {
    fn name(&self) -> &str {
        "postgrest"
    }

    fn id_space(&self) -> IdSpace {
        IdSpace::Key
    }

    async fn insert(&self, new: &NewSubmission) -> Result<ContactSubmission, PersistenceError> {
        debug!(table = %self.client.config().table, "Inserting contact submission");
        let resp = self
            .client
            .insert::<_, Value>(&InsertRow::from(new))
            .await
            .map_err(|e| translate(Operation::Save, e))?;

        let row = resp
            .into_result()
            .and_then(|rows| {
                rows.into_iter()
                    .next()
                    .ok_or(RestError::EmptyBody { status: 201 })
            })
            .map_err(|e| translate(Operation::Save, e))?;

        // From here on the row exists; a retry would store it twice.
        let id = row
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        serde_json::from_value::<SubmissionRecord>(row)
            .map_err(RestError::from)
            .and_then(SubmissionRecord::into_submission)
            .map_err(|e| {
                warn!(id = %id, error = %e, "Submission stored but not readable from the response");
                translate(
                    Operation::Save,
                    RestError::Unconfirmed {
                        id,
                        source: Box::new(e),
                    },
                )
            })
    }

    async fn list(&self) -> Result<Vec<ContactSubmission>, PersistenceError> {
        let query = [
            ("select", "*".to_string()),
            ("order", "created_at.desc,id.desc".to_string()),
        ];
        let resp = self
            .client
            .select::<SubmissionRecord>(&query)
            .await
            .map_err(|e| translate(Operation::List, e))?;

        resp.into_result()
            .and_then(|rows| {
                rows.into_iter()
                    .map(SubmissionRecord::into_submission)
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(|e| translate(Operation::List, e))
    }

    async fn fetch(&self, id: &SubmissionId) -> Result<ContactSubmission, PersistenceError> {
        self.fetch_for(Operation::Get, id).await
    }

    async fn update_status(
        &self,
        id: &SubmissionId,
        status: SubmissionStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<ContactSubmission, PersistenceError> {
        let not_found = || PersistenceError::not_found(Operation::UpdateStatus, id.clone());
        let key = row_key(id).ok_or_else(not_found)?;
        debug!(id = key, %status, "Updating submission status");

        let query = [("id", format!("eq.{}", key))];
        let patch = StatusPatch { status, updated_at };
        let resp = self
            .client
            .update::<_, Value>(&query, &patch)
            .await
            .map_err(|e| translate(Operation::UpdateStatus, e))?;

        // The patch body is typed, so only the id filter can fail to parse.
        if resp.is_invalid_text() {
            return Err(not_found());
        }
        let touched = resp
            .into_result()
            .map_err(|e| translate(Operation::UpdateStatus, e))?;
        if touched.is_empty() {
            return Err(not_found());
        }

        // The PATCH representation is not trusted as the confirmed row.
        self.fetch_for(Operation::UpdateStatus, id).await
    }

    async fn is_ready(&self) -> bool {
        match self.client.probe().await {
            Ok(ready) => ready,
            Err(e) => {
                error!(error = %e, "Row store health check failed");
                false
            }
        }
    }
}
