//! Contact submission statements.
//!
//! Every value reaches SQLite as a bound parameter.

use chrono::{DateTime, Utc};
use inquiry_core::{ContactSubmission, NewSubmission, SubmissionId, SubmissionStatus};
use sqlx::{FromRow, SqlitePool};

use crate::error::{DatabaseError, Result};

/// Row shape of `contact_submissions`.
#[derive(Debug, FromRow)]
struct SubmissionRow {
    id: i64,
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

impl SubmissionRow {
    fn into_submission(self) -> Result<ContactSubmission> {
        let status: SubmissionStatus =
            self.status.parse().map_err(|e: inquiry_core::ParseStatusError| {
                DatabaseError::InvalidRow {
                    id: self.id,
                    column: "status",
                    reason: e.to_string(),
                }
            })?;

        Ok(ContactSubmission {
            id: SubmissionId::Serial(self.id),
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

/// Insert a submission and return the stored row.
///
/// The id and `created_at` come from SQLite. Absent optional fields are bound
/// as NULL so the statement always takes nine parameters.
pub async fn insert_submission(
    pool: &SqlitePool,
    submission: &NewSubmission,
) -> Result<ContactSubmission> {
    let row = sqlx::query_as::<_, SubmissionRow>(
        r#"
        INSERT INTO contact_submissions
            (name, furigana, email, phone, inquiry_type, subject, message, ip_address, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, name, furigana, email, phone, inquiry_type, subject, message,
                  ip_address, status, created_at, updated_at
        "#,
    )
    .bind(submission.name())
    .bind(submission.furigana())
    .bind(submission.email())
    .bind(submission.phone())
    .bind(submission.inquiry_type())
    .bind(submission.subject())
    .bind(submission.message())
    .bind(submission.ip_address())
    .bind(submission.status().as_str())
    .fetch_one(pool)
    .await?;

    row.into_submission()
}

/// Get a submission by ID.
pub async fn get_submission(pool: &SqlitePool, id: i64) -> Result<ContactSubmission> {
    sqlx::query_as::<_, SubmissionRow>(
        r#"
        SELECT id, name, furigana, email, phone, inquiry_type, subject, message,
               ip_address, status, created_at, updated_at
        FROM contact_submissions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DatabaseError::NotFound(id))?
    .into_submission()
}

/// List all submissions, newest first.
pub async fn list_submissions(pool: &SqlitePool) -> Result<Vec<ContactSubmission>> {
    let rows = sqlx::query_as::<_, SubmissionRow>(
        r#"
        SELECT id, name, furigana, email, phone, inquiry_type, subject, message,
               ip_address, status, created_at, updated_at
        FROM contact_submissions
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(SubmissionRow::into_submission).collect()
}

/// Set the status of a submission and stamp `updated_at`.
pub async fn update_submission_status(
    pool: &SqlitePool,
    id: i64,
    status: SubmissionStatus,
    updated_at: DateTime<Utc>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE contact_submissions
        SET status = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(status.as_str())
    .bind(updated_at)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(id));
    }

    Ok(())
}
