//! Gateway error types.

use std::fmt;

use thiserror::Error;

use crate::models::SubmissionId;
use crate::validation::ValidationError;

/// Boxed backend failure kept as the source of a [`PersistenceError`].
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The gateway operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Save,
    List,
    Get,
    UpdateStatus,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Save => "save",
            Operation::List => "list",
            Operation::Get => "get",
            Operation::UpdateStatus => "update_status",
        })
    }
}

/// Backend-agnostic classification of a persistence failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceErrorKind {
    WriteFailed,
    ReadFailed,
    NotFound,
}

/// A backend failure, normalized at the adapter boundary.
///
/// The message names the operation only. Backend diagnostics stay in
/// [`std::error::Error::source`] for server-side logs.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Insert or update rejected, or the backend was unreachable.
    #[error("{operation}: write to submission store failed")]
    WriteFailed {
        operation: Operation,
        #[source]
        source: BackendError,
    },

    /// Read rejected, or the backend was unreachable.
    #[error("{operation}: read from submission store failed")]
    ReadFailed {
        operation: Operation,
        #[source]
        source: BackendError,
    },

    /// No submission with this id.
    #[error("{operation}: submission not found: {id}")]
    NotFound {
        operation: Operation,
        id: SubmissionId,
    },
}

impl PersistenceError {
    pub fn write_failed(operation: Operation, source: impl Into<BackendError>) -> Self {
        PersistenceError::WriteFailed {
            operation,
            source: source.into(),
        }
    }

    pub fn read_failed(operation: Operation, source: impl Into<BackendError>) -> Self {
        PersistenceError::ReadFailed {
            operation,
            source: source.into(),
        }
    }

    pub fn not_found(operation: Operation, id: SubmissionId) -> Self {
        PersistenceError::NotFound { operation, id }
    }

    pub fn kind(&self) -> PersistenceErrorKind {
        match self {
            PersistenceError::WriteFailed { .. } => PersistenceErrorKind::WriteFailed,
            PersistenceError::ReadFailed { .. } => PersistenceErrorKind::ReadFailed,
            PersistenceError::NotFound { .. } => PersistenceErrorKind::NotFound,
        }
    }

    /// Operation that failed.
    pub fn operation(&self) -> Operation {
        match self {
            PersistenceError::WriteFailed { operation, .. }
            | PersistenceError::ReadFailed { operation, .. }
            | PersistenceError::NotFound { operation, .. } => *operation,
        }
    }
}

/// Errors returned by [`crate::Gateway`].
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Required input missing; the backend was never called.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Backend failure.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl GatewayError {
    /// Persistence kind, or `None` for validation failures.
    pub fn persistence_kind(&self) -> Option<PersistenceErrorKind> {
        match self {
            GatewayError::Persistence(err) => Some(err.kind()),
            GatewayError::Validation(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.persistence_kind() == Some(PersistenceErrorKind::NotFound)
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
