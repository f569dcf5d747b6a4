//! Error types for the PostgREST client.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Error object returned by PostgREST in a non-2xx response body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostgrestError {
    /// PostgREST (`PGRST...`) or Postgres SQLSTATE code.
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl PostgrestError {
    /// Code PostgREST uses when a single-object request matched no rows.
    pub const NO_ROWS: &'static str = "PGRST116";

    /// SQLSTATE for a value the column type cannot parse, such as a
    /// malformed uuid in an `id=eq.` filter.
    pub const INVALID_TEXT: &'static str = "22P02";

    pub fn is_no_rows(&self) -> bool {
        self.code.as_deref() == Some(Self::NO_ROWS)
    }

    pub fn is_invalid_text(&self) -> bool {
        self.code.as_deref() == Some(Self::INVALID_TEXT)
    }
}

impl fmt::Display for PostgrestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for PostgrestError {}

/// Errors that can occur when talking to the row store.
#[derive(Debug, Error)]
pub enum RestError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error object returned by the backend.
    #[error("backend error (HTTP {status}): {error}")]
    Api { status: u16, error: PostgrestError },

    /// Successful status without a body where one was requested.
    #[error("backend returned HTTP {status} with no data")]
    EmptyBody { status: u16 },

    /// A returned record that does not map onto the model.
    #[error("invalid record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    /// The backend accepted the write but its representation was unusable.
    #[error("row {id} was stored but could not be read from the response")]
    Unconfirmed {
        id: String,
        #[source]
        source: Box<RestError>,
    },
}
