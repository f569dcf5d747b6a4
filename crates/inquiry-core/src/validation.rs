//! Required-field guard for incoming submissions.
//!
//! Business rules (email shape, phone format, allowed inquiry types) are
//! checked upstream by the form handler. This only refuses records that
//! would violate the NOT NULL contract of the stored entity.

use thiserror::Error;

use crate::models::SubmissionInput;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required fields that are empty or whitespace-only, in field order.
    #[error("required fields missing: {}", .0.join(", "))]
    MissingRequired(Vec<&'static str>),
}

/// Check that every required field of `input` carries a value.
pub fn validate_submission(input: &SubmissionInput) -> Result<(), ValidationError> {
    let required: [(&'static str, &str); 6] = [
        ("name", input.name.as_str()),
        ("email", input.email.as_str()),
        ("phone", input.phone.as_str()),
        ("inquiry_type", input.inquiry_type.as_str()),
        ("subject", input.subject.as_str()),
        ("message", input.message.as_str()),
    ];

    let missing: Vec<&'static str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| *field)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingRequired(missing))
    }
}
