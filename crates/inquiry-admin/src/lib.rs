//! Process wiring for the contact submission gateway.
//!
//! Reads configuration once, selects the single backend for the process
//! lifetime, and exposes the resulting [`inquiry_core::Gateway`].

pub mod backend;
pub mod config;

pub use backend::{connect, StartupError};
pub use config::{BackendConfig, BackendKind, Config, ConfigError};
