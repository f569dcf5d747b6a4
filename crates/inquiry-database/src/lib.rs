//! SQLite persistence for contact submissions.
//!
//! This crate is the relational backend of the inquiry gateway: parameterized
//! statements over SQLx with SQLite and auto-incrementing integer ids. The
//! schema lives in `migrations/` and is applied whenever a database is opened.
//!
//! # Example
//!
//! ```no_run
//! use inquiry_core::Gateway;
//! use inquiry_database::{Database, SqlSubmissionStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open("sqlite:inquiries.db?mode=rwc", Database::DEFAULT_POOL_SIZE).await?;
//!
//!     let gateway = Gateway::new(SqlSubmissionStore::new(db));
//!     for submission in gateway.list().await? {
//!         println!("{} {} {}", submission.id, submission.status, submission.subject);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod store;
pub mod submission;

pub use error::{DatabaseError, Result};
pub use store::SqlSubmissionStore;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Connection pool over the submissions database, schema already applied.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Pool size used when none is configured.
    pub const DEFAULT_POOL_SIZE: u32 = 5;

    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

    /// How long a writer waits on a locked file before giving up.
    const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Open the database at `url`, creating the file if needed, and bring the
    /// schema up to date.
    ///
    /// File databases run in WAL mode so staff reads do not block form writes.
    pub async fn open(url: &str, pool_size: u32) -> Result<Self> {
        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(Self::BUSY_TIMEOUT);
        if !url.contains(":memory:") {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size.max(1))
            .acquire_timeout(Self::ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;
        info!(url, pool_size, "Opened submission database");

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// A private in-memory database with one connection.
    pub async fn in_memory() -> Result<Self> {
        Self::open("sqlite::memory:", 1).await
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        debug!("Submission schema is current");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection. Later statements fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
