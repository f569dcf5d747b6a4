//! Configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use inquiry_database::Database;
use inquiry_postgrest::config::{DEFAULT_TABLE, DEFAULT_TIMEOUT};
use inquiry_postgrest::PostgrestConfig;

/// Default SQLite URL for the relational backend.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:inquiries.db?mode=rwc";

/// Which backend this process talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Relational,
    Baas,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relational" | "sql" | "sqlite" => Ok(BackendKind::Relational),
            "baas" | "supabase" | "postgrest" => Ok(BackendKind::Baas),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Connection settings for the selected backend.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// SQLite through SQLx.
    Relational { database_url: String, pool_size: u32 },
    /// Hosted PostgREST table.
    Baas(PostgrestConfig),
}

impl BackendConfig {
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendConfig::Relational { .. } => BackendKind::Relational,
            BackendConfig::Baas(_) => BackendKind::Baas,
        }
    }
}

/// Process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `INQUIRY_BACKEND` | `relational` or `baas` | `relational` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:inquiries.db?mode=rwc` |
    /// | `DATABASE_POOL_SIZE` | SQLite pool size | `5` |
    /// | `SUPABASE_URL` | Row store base URL | (required for `baas`) |
    /// | `SUPABASE_KEY` | Row store API key | (required for `baas`) |
    /// | `SUPABASE_TABLE` | Table name | `contact_submissions` |
    /// | `SUPABASE_TIMEOUT_SECS` | HTTP timeout | `30` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let kind = match var("INQUIRY_BACKEND") {
            Some(value) => value.parse()?,
            None => BackendKind::Relational,
        };

        let backend = match kind {
            BackendKind::Relational => {
                let database_url =
                    var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
                let pool_size = match var("DATABASE_POOL_SIZE") {
                    Some(value) => parse_positive("DATABASE_POOL_SIZE", &value)?,
                    None => Database::DEFAULT_POOL_SIZE,
                };
                BackendConfig::Relational {
                    database_url,
                    pool_size,
                }
            }
            BackendKind::Baas => {
                let base_url = var("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
                let api_key = var("SUPABASE_KEY").ok_or(ConfigError::Missing("SUPABASE_KEY"))?;
                let table = var("SUPABASE_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string());
                let timeout = match var("SUPABASE_TIMEOUT_SECS") {
                    Some(value) => {
                        Duration::from_secs(parse_positive("SUPABASE_TIMEOUT_SECS", &value)?)
                    }
                    None => DEFAULT_TIMEOUT,
                };
                BackendConfig::Baas(
                    PostgrestConfig::new(base_url, api_key)
                        .with_table(table)
                        .with_timeout(timeout),
                )
            }
        };

        Ok(Self { backend })
    }
}

/// Parse a count or duration that must be at least 1.
fn parse_positive<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
{
    match value.trim().parse::<T>() {
        Ok(n) if n != T::default() => Ok(n),
        _ => Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown INQUIRY_BACKEND {0:?} (expected relational or baas)")]
    UnknownBackend(String),

    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}
