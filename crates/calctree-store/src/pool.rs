//! Connection pool for concurrent database access.
//!
//! A thread-safe pool built on r2d2 with SQLite in WAL mode: readers proceed
//! in parallel while writes are serialized by SQLite itself. The pool is
//! explicit state with a documented lifecycle - created once at process
//! start, passed to [`crate::CalcStore`] by value, dropped at shutdown. No
//! singletons.

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the database pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum connections in the pool.
    pub max_size: u32,
    /// Minimum idle connections to maintain.
    pub min_idle: Option<u32>,
    /// Connection acquisition timeout. A request that cannot get a
    /// connection within this bound fails with [`StoreError::Pool`].
    pub connection_timeout: Duration,
    /// How long a connection may sit idle before being reaped.
    pub idle_timeout: Option<Duration>,
    /// Upper bound on any connection's lifetime.
    pub max_lifetime: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 10,
            min_idle: Some(2),
            connection_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(1800)),
        }
    }
}

/// Pool statistics for monitoring.
#[derive(Debug, Clone)]
pub struct PoolState {
    /// Total connections (active + idle).
    pub connections: u32,
    /// Currently idle connections.
    pub idle_connections: u32,
}

/// Thread-safe database connection pool.
pub struct DatabasePool {
    pool: Pool<SqliteConnectionManager>,
    path: String,
}

impl DatabasePool {
    /// Create a new database pool at the given path.
    ///
    /// This will:
    /// - Create the database file if it doesn't exist
    /// - Enable WAL mode, foreign keys, and performance pragmas
    /// - Run any pending migrations
    /// - Initialize the connection pool
    ///
    /// Foreign keys must be ON for every connection: subtree deletion relies
    /// on the self-referencing cascade.
    pub fn open(path: &Path, config: PoolConfig) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Pool(e.to_string()))?;
        }

        let path_str = path.to_string_lossy().to_string();

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch(
                "
                PRAGMA journal_mode = WAL;
                PRAGMA synchronous = NORMAL;
                PRAGMA foreign_keys = ON;
                PRAGMA temp_store = MEMORY;
                PRAGMA busy_timeout = 5000;
            ",
            )?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.connection_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .build(manager)
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        info!(
            path = %path_str,
            max_size = config.max_size,
            "Database pool created"
        );

        // Run migrations on a dedicated connection
        {
            let conn = pool.get().map_err(|e| StoreError::Pool(e.to_string()))?;
            migrations::run_migrations(&conn)?;
        }

        Ok(Self {
            pool,
            path: path_str,
        })
    }

    /// Get a connection from the pool.
    ///
    /// Blocks until a connection is available or the acquisition timeout is
    /// reached. Connections return to the pool when dropped.
    pub fn get(&self) -> StoreResult<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| StoreError::Pool(e.to_string()))
    }

    /// Get pool statistics for monitoring.
    pub fn state(&self) -> PoolState {
        let state = self.pool.state();
        PoolState {
            connections: state.connections,
            idle_connections: state.idle_connections,
        }
    }

    /// Get the database path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Check pool health by acquiring a connection and running a query.
    pub fn health_check(&self) -> StoreResult<()> {
        let conn = self.get()?;
        conn.execute_batch("SELECT 1")?;
        debug!("Database pool health check passed");
        Ok(())
    }
}
