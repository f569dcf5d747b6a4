//! Test doubles for the inquiry gateway backends.
//!
//! - [`FakePostgrest`]: an axum server speaking enough PostgREST for the
//!   row-store adapter, with request counting and failure injection.
//! - [`sample_input`]: a complete, valid submission for scenario tests.

pub mod fake_postgrest;

pub use fake_postgrest::{FakePostgrest, TEST_API_KEY, TEST_TABLE};

use inquiry_core::SubmissionInput;

/// A complete submission with every required field filled in.
pub fn sample_input(name: &str) -> SubmissionInput {
    SubmissionInput {
        name: name.to_string(),
        furigana: Some("サトウ ケン".to_string()),
        email: "ken.sato@example.com".to_string(),
        phone: "045-987-6543".to_string(),
        inquiry_type: "service".to_string(),
        subject: format!("Inquiry from {}", name),
        message: "I would like to know more about your services.".to_string(),
        ip_address: Some("198.51.100.24".to_string()),
    }
}
