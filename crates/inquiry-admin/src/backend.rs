//! One-time backend selection.
//!
//! The adapter is built once from [`BackendConfig`] and handed to a
//! [`Gateway`]; nothing afterwards can swap it.

use inquiry_core::Gateway;
use inquiry_database::{Database, DatabaseError, SqlSubmissionStore};
use inquiry_postgrest::{PostgrestClient, PostgrestSubmissionStore, RestError};
use thiserror::Error;
use tracing::info;

use crate::config::BackendConfig;

/// Errors raised while bringing up the selected backend.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Relational backend: {0}")]
    Database(#[from] DatabaseError),

    #[error("Row store backend: {0}")]
    Rest(#[from] RestError),
}

/// Build the gateway for the configured backend.
///
/// The relational backend is migrated before use. The row store's schema is
/// owned by the hosted service, so it is only probed.
pub async fn connect(config: &BackendConfig) -> Result<Gateway, StartupError> {
    let gateway = match config {
        BackendConfig::Relational {
            database_url,
            pool_size,
        } => {
            let db = Database::open(database_url, *pool_size).await?;
            Gateway::new(SqlSubmissionStore::new(db))
        }
        BackendConfig::Baas(rest) => {
            let client = PostgrestClient::new(rest.clone())?;
            info!(table = %rest.table, url = %rest.base_url, "Using hosted row store");
            Gateway::new(PostgrestSubmissionStore::new(client))
        }
    };

    info!(backend = gateway.backend_name(), "Submission store selected");
    Ok(gateway)
}
