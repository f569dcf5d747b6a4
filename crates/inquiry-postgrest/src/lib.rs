//! Hosted row-store backend for contact submissions.
//!
//! Talks to a PostgREST endpoint (as exposed by Supabase) over HTTPS. The
//! backend assigns string ids (UUIDs) and creation timestamps.
//!
//! The table must exist before use; its definition is in
//! `sql/contact_submissions.sql` at the root of this crate.
//!
//! # Example
//!
//! ```no_run
//! use inquiry_core::Gateway;
//! use inquiry_postgrest::{PostgrestClient, PostgrestConfig, PostgrestSubmissionStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PostgrestConfig::new("https://demo.supabase.co", "service-role-key");
//! let client = PostgrestClient::new(config)?;
//! let gateway = Gateway::new(PostgrestSubmissionStore::new(client));
//!
//! let unread = gateway.list_by_status(inquiry_core::SubmissionStatus::New).await?;
//! println!("{} unread inquiries", unread.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod store;

pub use client::{PostgrestClient, PostgrestResponse};
pub use config::PostgrestConfig;
pub use error::{PostgrestError, RestError};
pub use store::PostgrestSubmissionStore;
