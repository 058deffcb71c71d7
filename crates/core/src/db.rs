//! Database handle.
//!
//! `Database` wraps the `sqlx` SQLite pool. It is built once at startup and cloned into every
//! service; the pool itself is reference counted.

use crate::{MedicardError, MedicardResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Database connection pool
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the store at `url` (e.g. `sqlite://medicard.db` or `sqlite::memory:`).
    ///
    /// File databases are created if missing. Foreign keys are always enforced. An in-memory
    /// database lives inside a single connection, so the pool is pinned to exactly one
    /// connection that is never recycled.
    pub async fn connect(url: &str) -> MedicardResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| MedicardError::Config(format!("invalid DATABASE_URL {url:?}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };

        let pool = pool_options.connect_with(options).await?;
        tracing::debug!("connected to database {}", url);
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run the embedded schema migrations.
    pub async fn run_migrations(&self) -> MedicardResult<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    /// Round-trip a trivial query; used by the health endpoint.
    pub async fn ping(&self) -> MedicardResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
