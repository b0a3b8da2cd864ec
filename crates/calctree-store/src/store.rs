//! The calculation store facade.
//!
//! Owns the connection pool and exposes the operations the request layer
//! calls. All methods acquire a pooled connection per call; the store itself
//! holds no other state, so it can be shared behind an `Arc` freely.

use crate::error::StoreResult;
use crate::models::{Calculation, CalculationId, NewChild, NewRoot, User, UserId};
use crate::pool::{DatabasePool, PoolConfig};
use crate::queries;
use crate::tree::{self, TreeNode};
use calctree_engine::Operation;
use rust_decimal::Decimal;
use std::path::Path;

/// SQLite-backed store for calculation trees.
pub struct CalcStore {
    pool: DatabasePool,
}

impl CalcStore {
    /// Wrap an already-opened pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database at `path` and build the pool.
    pub fn open(path: &Path, config: PoolConfig) -> StoreResult<Self> {
        Ok(Self::new(DatabasePool::open(path, config)?))
    }

    /// The underlying pool, for health checks and monitoring.
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Register a user. Usernames are unique.
    pub fn create_user(&self, username: &str) -> StoreResult<User> {
        let conn = self.pool.get()?;
        queries::insert_user(&conn, username)
    }

    /// Look up a user by ID.
    pub fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let conn = self.pool.get()?;
        queries::get_user(&conn, id)
    }

    /// Create a root calculation (a starting number) owned by `owner`.
    ///
    /// Fails with `InvalidNumber` if the operand is out of range.
    pub fn create_root(&self, owner: UserId, operand: Decimal) -> StoreResult<Calculation> {
        let conn = self.pool.get()?;
        queries::insert_root(
            &conn,
            &NewRoot {
                user_id: owner,
                operand,
            },
        )
    }

    /// Append a child calculation under `parent_id`.
    ///
    /// Runs as one transaction; see [`queries::insert_child`]. Fails with
    /// `ParentNotFound`, `DivisionByZero`, `InvalidNumber`, or `Overflow`,
    /// in which case nothing is persisted.
    pub fn create_child(
        &self,
        owner: UserId,
        parent_id: CalculationId,
        operation: Operation,
        operand: Decimal,
    ) -> StoreResult<Calculation> {
        let mut conn = self.pool.get()?;
        queries::insert_child(
            &mut conn,
            &NewChild {
                user_id: owner,
                parent_id,
                operation,
                operand,
            },
        )
    }

    /// Look up a calculation by ID.
    pub fn find_by_id(&self, id: CalculationId) -> StoreResult<Option<Calculation>> {
        let conn = self.pool.get()?;
        queries::get_calculation(&conn, id)
    }

    /// List all starting numbers, most recent first.
    pub fn list_roots(&self) -> StoreResult<Vec<Calculation>> {
        let conn = self.pool.get()?;
        queries::list_roots(&conn)
    }

    /// List the direct children of a calculation in creation order.
    pub fn list_children(&self, parent_id: CalculationId) -> StoreResult<Vec<Calculation>> {
        let conn = self.pool.get()?;
        queries::list_children(&conn, parent_id)
    }

    /// Delete a calculation and its whole subtree, if `owner` owns it.
    ///
    /// Returns `false` both when the node is missing and when it belongs to
    /// someone else, so non-owners learn nothing about existence.
    pub fn delete(&self, id: CalculationId, owner: UserId) -> StoreResult<bool> {
        let conn = self.pool.get()?;
        queries::delete_calculation(&conn, id, owner)
    }

    /// Materialize the forest, or the subtree anchored at `root`.
    ///
    /// A missing anchor yields an empty vec. The result is rebuilt from
    /// current state on every call.
    pub fn get_forest(&self, root: Option<CalculationId>) -> StoreResult<Vec<TreeNode>> {
        let conn = self.pool.get()?;
        tree::fetch_forest(&conn, root)
    }
}
