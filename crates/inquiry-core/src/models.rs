//! Contact submission models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backend-assigned identifier of a submission.
///
/// The relational backend hands out auto-incrementing integers, the hosted
/// row store hands out opaque string keys. A deployment only ever sees one
/// of the two.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmissionId {
    /// Auto-incrementing integer id.
    Serial(i64),
    /// Opaque key (e.g., a UUID).
    Key(String),
}

impl SubmissionId {
    /// Whether this looks like an id a backend actually assigned.
    pub fn is_assigned(&self) -> bool {
        match self {
            SubmissionId::Serial(id) => *id > 0,
            SubmissionId::Key(key) => !key.trim().is_empty(),
        }
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionId::Serial(id) => f.pad(&id.to_string()),
            SubmissionId::Key(key) => f.pad(key),
        }
    }
}

/// Which kind of identifier an adapter assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSpace {
    Serial,
    Key,
}

impl IdSpace {
    /// Parse a raw identifier (from a URL segment or CLI argument) into this space.
    pub fn parse(&self, raw: &str) -> Result<SubmissionId, ParseIdError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ParseIdError::Empty);
        }

        match self {
            IdSpace::Serial => raw
                .parse::<i64>()
                .ok()
                .filter(|id| *id > 0)
                .map(SubmissionId::Serial)
                .ok_or_else(|| ParseIdError::NotSerial(raw.to_string())),
            IdSpace::Key => Ok(SubmissionId::Key(raw.to_string())),
        }
    }
}

/// Error parsing a submission identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIdError {
    #[error("submission id cannot be empty")]
    Empty,

    #[error("expected a positive integer id, got {0:?}")]
    NotSerial(String),
}

/// Staff handling state of a submission.
///
/// Any state may be set from any other; staff routinely correct a mistaken
/// status, including moving a replied submission back to `new`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Not looked at yet.
    #[default]
    New,
    /// Seen by staff.
    Read,
    /// Responded to.
    Replied,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 3] = [
        SubmissionStatus::New,
        SubmissionStatus::Read,
        SubmissionStatus::Replied,
    ];

    /// Text form stored by every backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::New => "new",
            SubmissionStatus::Read => "read",
            SubmissionStatus::Replied => "replied",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(SubmissionStatus::New),
            "read" => Ok(SubmissionStatus::Read),
            "replied" => Ok(SubmissionStatus::Replied),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Unknown status text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown submission status {0:?} (expected new, read or replied)")]
pub struct ParseStatusError(pub String);

/// A candidate submission as produced by the form handler.
///
/// Carries no id, status or timestamps; the gateway and the backend assign
/// those.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubmissionInput {
    pub name: String,
    /// Phonetic reading of the name.
    #[serde(default)]
    pub furigana: Option<String>,
    pub email: String,
    pub phone: String,
    /// Category picked by the submitter.
    pub inquiry_type: String,
    pub subject: String,
    pub message: String,
    /// Captured for abuse triage only.
    #[serde(default)]
    pub ip_address: Option<String>,
}

/// A validated submission ready for insertion.
///
/// Only [`NewSubmission::new`] builds one, and it always starts in
/// [`SubmissionStatus::New`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    input: SubmissionInput,
    status: SubmissionStatus,
}

impl NewSubmission {
    pub fn new(input: SubmissionInput) -> Self {
        Self {
            input,
            status: SubmissionStatus::New,
        }
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn name(&self) -> &str {
        &self.input.name
    }

    pub fn furigana(&self) -> Option<&str> {
        self.input.furigana.as_deref()
    }

    pub fn email(&self) -> &str {
        &self.input.email
    }

    pub fn phone(&self) -> &str {
        &self.input.phone
    }

    pub fn inquiry_type(&self) -> &str {
        &self.input.inquiry_type
    }

    pub fn subject(&self) -> &str {
        &self.input.subject
    }

    pub fn message(&self) -> &str {
        &self.input.message
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.input.ip_address.as_deref()
    }
}

/// A persisted contact submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    /// Backend-assigned identifier.
    pub id: SubmissionId,
    pub name: String,
    pub furigana: Option<String>,
    pub email: String,
    pub phone: String,
    pub inquiry_type: String,
    pub subject: String,
    pub message: String,
    pub ip_address: Option<String>,
    /// Handling state.
    pub status: SubmissionStatus,
    /// Backend clock at insertion.
    pub created_at: DateTime<Utc>,
    /// Time of the last status change, if any.
    pub updated_at: Option<DateTime<Utc>>,
}
