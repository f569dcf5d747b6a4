//! Contact submission persistence gateway.
//!
//! This crate defines the stored entity, its status lifecycle, the error
//! taxonomy shared by every backend, and the [`Gateway`] that callers use.
//! Backends plug in through the [`SubmissionStore`] trait; exactly one is
//! chosen when the process starts.
//!
//! # Example
//!
//! ```no_run
//! use inquiry_core::{Gateway, SubmissionInput, SubmissionStatus, SubmissionStore};
//!
//! # async fn example(store: impl SubmissionStore + 'static) -> inquiry_core::Result<()> {
//! let gateway = Gateway::new(store);
//!
//! let saved = gateway
//!     .save(SubmissionInput {
//!         name: "Yamada Taro".to_string(),
//!         email: "taro@example.com".to_string(),
//!         phone: "03-1234-5678".to_string(),
//!         inquiry_type: "estimate".to_string(),
//!         subject: "Quote request".to_string(),
//!         message: "Please send a quote.".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! gateway.update_status(&saved.id, SubmissionStatus::Read).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod gateway;
pub mod models;
pub mod store;
pub mod validation;

pub use error::{
    BackendError, GatewayError, Operation, PersistenceError, PersistenceErrorKind, Result,
};
pub use gateway::Gateway;
pub use models::{
    ContactSubmission, IdSpace, NewSubmission, ParseIdError, ParseStatusError, SubmissionId,
    SubmissionInput, SubmissionStatus,
};
pub use store::SubmissionStore;
pub use validation::{validate_submission, ValidationError};
