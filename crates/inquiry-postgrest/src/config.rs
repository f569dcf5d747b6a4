//! Configuration types for the PostgREST client.

use std::fmt;
use std::time::Duration;

/// Default table holding contact submissions.
pub const DEFAULT_TABLE: &str = "contact_submissions";

/// Default HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for connecting to a hosted PostgREST endpoint.
#[derive(Clone)]
pub struct PostgrestConfig {
    /// Project base URL (e.g., "https://abcd.supabase.co").
    pub base_url: String,
    /// API key sent as `apikey` and bearer token.
    pub api_key: String,
    /// Table (resource) name.
    pub table: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl PostgrestConfig {
    /// Create a configuration for the default table.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            table: DEFAULT_TABLE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a different table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Use a different request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the REST root URL.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base_url.trim_end_matches('/'))
    }

    /// Get the table resource URL.
    pub fn table_url(&self) -> String {
        format!("{}/{}", self.rest_url(), self.table)
    }
}

// The key is a credential; keep it out of logs.
impl fmt::Debug for PostgrestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgrestConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("table", &self.table)
            .field("timeout", &self.timeout)
            .finish()
    }
}
