//! Database abstraction over SQLite via sqlx.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::error::StoreError;

/// Connection tuning supplied by the host process.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout: Duration,
    pub max_connections: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
            max_connections: 8,
        }
    }
}

/// Central store handle.  Cheap to clone (Arc internally).
#[derive(Clone)]
pub struct Store {
    pub pool: SqlitePool,
}

impl Store {
    /// Open (or create) the SQLite database at `db_path`.
    /// Runs all pending migrations automatically.
    ///
    /// WAL journal mode is configured at connection time here, not inside a
    /// migration: SQLite forbids changing `journal_mode` inside a
    /// transaction and sqlx wraps every migration in one.
    pub async fn open(db_path: &Path, options: StoreOptions) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(options.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .connect_with(opts)
            .await?;

        run_migrations(&pool).await?;
        tracing::debug!(path = %db_path.display(), "store opened");
        Ok(Self { pool })
    }

    /// Private in-memory database.  A single pooled connection that never
    /// expires, since an in-memory SQLite database dies with its connection.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::new())
            .await?;

        run_migrations(&pool).await?;
        Ok(Self { pool })
    }
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Migration(e.to_string()))
}
