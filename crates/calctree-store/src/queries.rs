//! Standalone query functions that work with any `Connection`.
//!
//! Each function takes a `&Connection` (or `&mut Connection` where a
//! transaction is opened) so it composes with pooled connections and
//! in-flight transactions alike. All arithmetic validation goes through
//! `calctree-engine` before anything touches a row.

use crate::error::{StoreError, StoreResult};
use crate::models::{Calculation, CalculationId, NewChild, NewRoot, User, UserId};
use calctree_engine::{self as engine, Operation};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use tracing::debug;

// ==========================================
// Users
// ==========================================

/// Insert a new user. The username must be unique.
pub fn insert_user(conn: &Connection, username: &str) -> StoreResult<User> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO users (username, created_at) VALUES (?1, ?2)",
        params![username, now],
    )?;
    let id = UserId(conn.last_insert_rowid());
    get_user(conn, id)?
        .ok_or_else(|| StoreError::NotFound("user not found after insert".to_string()))
}

/// Get a user by ID.
pub fn get_user(conn: &Connection, id: UserId) -> StoreResult<Option<User>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, username, created_at FROM users WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.0], |row| {
        Ok(User {
            id: UserId(row.get(0)?),
            username: row.get(1)?,
            created_at: parse_datetime(row.get::<_, String>(2)?),
        })
    });

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ==========================================
// Calculations
// ==========================================

/// Insert a root calculation (a starting number).
///
/// The operand is validated and normalized by the engine; a root's result is
/// the operand itself, so no computation runs.
pub fn insert_root(conn: &Connection, root: &NewRoot) -> StoreResult<Calculation> {
    let operand = engine::validate(root.operand)?;
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO calculations (user_id, parent_id, operation, operand, result, depth, created_at)
         VALUES (?1, NULL, NULL, ?2, ?2, 0, ?3)",
        params![root.user_id.0, operand.to_string(), now],
    )?;
    let id = CalculationId(conn.last_insert_rowid());
    let calculation = get_calculation(conn, id)?
        .ok_or_else(|| StoreError::NotFound("calculation not found after insert".to_string()))?;
    debug!(id = %calculation.id, "Root calculation created");
    Ok(calculation)
}

/// Insert a child calculation under an existing parent.
///
/// Runs as a single transaction: read the parent's result and depth, compute
/// the child result, insert. Any failure (missing parent, divide by zero,
/// overflow) rolls the transaction back; no partial write is ever observable.
///
/// Parent rows are immutable after creation, so two concurrent calls against
/// the same parent each see the same snapshot and cannot lose updates.
pub fn insert_child(conn: &mut Connection, child: &NewChild) -> StoreResult<Calculation> {
    // Take the write lock up front. A deferred begin could fail its
    // read-to-write upgrade if another writer commits between the parent
    // read and the insert; immediate begin plus busy_timeout serializes
    // writers cleanly instead.
    let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

    let (parent_result, parent_depth) = match tx.query_row(
        "SELECT result, depth FROM calculations WHERE id = ?1",
        params![child.parent_id.0],
        |row| Ok((decimal_column(row, 0)?, row.get::<_, i64>(1)?)),
    ) {
        Ok(snapshot) => snapshot,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(StoreError::ParentNotFound(child.parent_id));
        }
        Err(e) => return Err(e.into()),
    };

    let operand = engine::validate(child.operand)?;
    let result = engine::compute_result(parent_result, child.operation, operand)?;

    let now = Utc::now().to_rfc3339();
    tx.execute(
        "INSERT INTO calculations (user_id, parent_id, operation, operand, result, depth, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            child.user_id.0,
            child.parent_id.0,
            child.operation.as_str(),
            operand.to_string(),
            result.to_string(),
            parent_depth + 1,
            now,
        ],
    )?;
    let id = CalculationId(tx.last_insert_rowid());
    let calculation = get_calculation(&tx, id)?
        .ok_or_else(|| StoreError::NotFound("calculation not found after insert".to_string()))?;

    tx.commit()?;
    debug!(id = %calculation.id, parent_id = %child.parent_id, "Child calculation created");
    Ok(calculation)
}

/// Get a calculation by ID, joined with the owner's username.
pub fn get_calculation(conn: &Connection, id: CalculationId) -> StoreResult<Option<Calculation>> {
    let mut stmt = conn.prepare_cached(
        "SELECT c.id, c.user_id, u.username, c.parent_id, c.operation, c.operand, c.result, c.depth, c.created_at
         FROM calculations c
         JOIN users u ON u.id = c.user_id
         WHERE c.id = ?1",
    )?;

    let result = stmt.query_row(params![id.0], map_calculation);

    match result {
        Ok(calculation) => Ok(Some(calculation)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// List all root calculations, most recently created first.
pub fn list_roots(conn: &Connection) -> StoreResult<Vec<Calculation>> {
    let mut stmt = conn.prepare_cached(
        "SELECT c.id, c.user_id, u.username, c.parent_id, c.operation, c.operand, c.result, c.depth, c.created_at
         FROM calculations c
         JOIN users u ON u.id = c.user_id
         WHERE c.parent_id IS NULL
         ORDER BY c.created_at DESC, c.id DESC",
    )?;

    let roots = stmt
        .query_map([], map_calculation)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(roots)
}

/// List the direct children of a calculation in creation order.
pub fn list_children(conn: &Connection, parent_id: CalculationId) -> StoreResult<Vec<Calculation>> {
    let mut stmt = conn.prepare_cached(
        "SELECT c.id, c.user_id, u.username, c.parent_id, c.operation, c.operand, c.result, c.depth, c.created_at
         FROM calculations c
         JOIN users u ON u.id = c.user_id
         WHERE c.parent_id = ?1
         ORDER BY c.created_at ASC, c.id ASC",
    )?;

    let children = stmt
        .query_map(params![parent_id.0], map_calculation)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(children)
}

/// Delete a calculation and (via foreign-key cascade) its whole subtree,
/// but only if `owner` owns the node.
///
/// Returns whether a row was removed. A missing node and a node owned by
/// someone else are indistinguishable: both return `false`.
pub fn delete_calculation(
    conn: &Connection,
    id: CalculationId,
    owner: UserId,
) -> StoreResult<bool> {
    let count = conn.execute(
        "DELETE FROM calculations WHERE id = ?1 AND user_id = ?2",
        params![id.0, owner.0],
    )?;
    if count > 0 {
        debug!(%id, %owner, "Calculation deleted, subtree cascaded");
    }
    Ok(count > 0)
}

// ==========================================
// Row mapping
// ==========================================

/// Map a row with the canonical calculation column order:
/// id, user_id, username, parent_id, operation, operand, result, depth, created_at.
pub(crate) fn map_calculation(row: &Row<'_>) -> rusqlite::Result<Calculation> {
    Ok(Calculation {
        id: CalculationId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        username: row.get(2)?,
        parent_id: row.get::<_, Option<i64>>(3)?.map(CalculationId),
        operation: operation_column(row, 4)?,
        operand: decimal_column(row, 5)?,
        result: decimal_column(row, 6)?,
        depth: row.get(7)?,
        created_at: parse_datetime(row.get::<_, String>(8)?),
    })
}

pub(crate) fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    text.parse().map_err(|e: rust_decimal::Error| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

fn operation_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Operation>> {
    match row.get::<_, Option<String>>(idx)? {
        None => Ok(None),
        Some(tag) => Operation::parse(&tag).map(Some).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                Type::Text,
                format!("unknown operation tag: {tag}").into(),
            )
        }),
    }
}

/// Parse an RFC 3339 datetime string, falling back to current time on error.
pub(crate) fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
