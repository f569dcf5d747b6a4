//! Errors raised by the SQLite submission store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Connection, statement or pool failure.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// No row with this id.
    #[error("no contact submission with id {0}")]
    NotFound(i64),

    /// A stored value that does not map onto the model.
    #[error("contact submission {id} has an unreadable {column}: {reason}")]
    InvalidRow {
        id: i64,
        column: &'static str,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
