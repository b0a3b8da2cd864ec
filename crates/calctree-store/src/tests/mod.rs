//! Integration tests for the calculation store.
//!
//! - `lifecycle.rs`   - node creation, derived results, listing order
//! - `rollback.rs`    - transactional write path, zero partial writes
//! - `forest.rs`      - tree materialization and assembly
//! - `delete.rs`      - ownership checks and cascade deletion
//! - `concurrency.rs` - parallel writers against shared parents

mod concurrency;
mod delete;
mod lifecycle;

use crate::{CalcStore, PoolConfig};
use tempfile::TempDir;

/// Open a store backed by a fresh temp-dir database.
///
/// The `TempDir` must stay alive for the store's lifetime.
fn open_store() -> (TempDir, CalcStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = CalcStore::open(&dir.path().join("calc.db"), PoolConfig::default()).unwrap();
    (dir, store)
}

/// Total rows in the calculations table, for rollback assertions.
fn calculation_count(store: &CalcStore) -> i64 {
    let conn = store.pool().get().unwrap();
    conn.query_row("SELECT COUNT(*) FROM calculations", [], |row| row.get(0))
        .unwrap()
}
