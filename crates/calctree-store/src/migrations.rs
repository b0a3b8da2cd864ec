//! Database migrations.
//!
//! Migrations are run in order and tracked in the `migrations` table.

use crate::error::{StoreError, StoreResult};
use rusqlite::Connection;
use tracing::{debug, info};

/// Current schema version.
pub const CURRENT_VERSION: i32 = 2;

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> StoreResult<()> {
    // Create migrations tracking table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than this build supports ({})",
            current_version, CURRENT_VERSION
        )));
    }

    info!(current_version, target_version = CURRENT_VERSION, "Running migrations");

    if current_version < 1 {
        migrate_v1_initial_schema(conn)?;
    }
    if current_version < 2 {
        migrate_v2_child_listing_index(conn)?;
    }

    info!("Migrations complete");
    Ok(())
}

fn record_migration(conn: &Connection, version: i32, name: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
        rusqlite::params![version, name],
    )?;
    debug!(version, name, "Migration applied");
    Ok(())
}

/// V1: Initial schema - users and calculations.
///
/// `operand` and `result` are stored as canonical decimal text; the range
/// they may span is enforced by the engine before any insert. The two CHECK
/// constraints pin the root/child pairing: a root has neither parent nor
/// operation, a child has both.
fn migrate_v1_initial_schema(conn: &Connection) -> StoreResult<()> {
    info!("Applying migration v1: initial schema");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS calculations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            parent_id INTEGER REFERENCES calculations(id) ON DELETE CASCADE,
            operation TEXT,
            operand TEXT NOT NULL,
            result TEXT NOT NULL,
            depth INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            CONSTRAINT check_operation CHECK (
                operation IS NULL OR
                operation IN ('add', 'subtract', 'multiply', 'divide')
            ),
            CONSTRAINT check_root_node CHECK (
                (parent_id IS NULL AND operation IS NULL) OR
                (parent_id IS NOT NULL AND operation IS NOT NULL)
            )
        );

        CREATE INDEX IF NOT EXISTS idx_calculations_parent_id
            ON calculations(parent_id);
        CREATE INDEX IF NOT EXISTS idx_calculations_user_id
            ON calculations(user_id);
        ",
    )?;

    record_migration(conn, 1, "initial_schema")
}

/// V2: Covering index for listing children in creation order.
fn migrate_v2_child_listing_index(conn: &Connection) -> StoreResult<()> {
    info!("Applying migration v2: child listing index");

    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_calculations_parent_created
            ON calculations(parent_id, created_at);
        ",
    )?;

    record_migration(conn, 2, "child_listing_index")
}
