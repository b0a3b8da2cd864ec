//! Tree materialization: recursive closure fetch plus in-memory assembly.
//!
//! One `WITH RECURSIVE` query pulls the requested node set - the whole
//! forest, or a single subtree anchored at any node - as flat rows tagged
//! with their traversal level. Assembly then rebuilds the parent/children
//! nesting in memory. Nothing is cached; every call reflects current state.

use crate::error::StoreResult;
use crate::models::{Calculation, CalculationId};
use crate::queries::map_calculation;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// A calculation with its children, in creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub calculation: Calculation,
    pub children: Vec<TreeNode>,
}

const FOREST_SQL: &str = "
    WITH RECURSIVE tree AS (
        SELECT c.id, c.user_id, u.username, c.parent_id, c.operation, c.operand,
               c.result, c.depth, c.created_at, 0 AS level
        FROM calculations c
        JOIN users u ON u.id = c.user_id
        WHERE c.parent_id IS NULL

        UNION ALL

        SELECT c.id, c.user_id, u.username, c.parent_id, c.operation, c.operand,
               c.result, c.depth, c.created_at, tree.level + 1
        FROM calculations c
        JOIN users u ON u.id = c.user_id
        JOIN tree ON c.parent_id = tree.id
    )
    SELECT * FROM tree ORDER BY level ASC, created_at ASC, id ASC";

const SUBTREE_SQL: &str = "
    WITH RECURSIVE tree AS (
        SELECT c.id, c.user_id, u.username, c.parent_id, c.operation, c.operand,
               c.result, c.depth, c.created_at, 0 AS level
        FROM calculations c
        JOIN users u ON u.id = c.user_id
        WHERE c.id = ?1

        UNION ALL

        SELECT c.id, c.user_id, u.username, c.parent_id, c.operation, c.operand,
               c.result, c.depth, c.created_at, tree.level + 1
        FROM calculations c
        JOIN users u ON u.id = c.user_id
        JOIN tree ON c.parent_id = tree.id
    )
    SELECT * FROM tree ORDER BY level ASC, created_at ASC, id ASC";

struct FetchedRow {
    calculation: Calculation,
    level: i64,
}

/// Fetch and assemble the forest, or the subtree under `anchor`.
///
/// A missing anchor yields an empty vec, not an error.
pub(crate) fn fetch_forest(
    conn: &Connection,
    anchor: Option<CalculationId>,
) -> StoreResult<Vec<TreeNode>> {
    let map_row = |row: &rusqlite::Row<'_>| {
        Ok(FetchedRow {
            calculation: map_calculation(row)?,
            level: row.get(9)?,
        })
    };

    let rows = match anchor {
        Some(id) => {
            let mut stmt = conn.prepare_cached(SUBTREE_SQL)?;
            let rows = stmt
                .query_map(params![id.0], map_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare_cached(FOREST_SQL)?;
            let rows = stmt
                .query_map([], map_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };

    Ok(assemble(rows))
}

/// Rebuild the nested structure from level-ordered flat rows.
///
/// Level-0 rows are the requested anchors and become the top-level entries;
/// a subtree request may anchor mid-tree, so an anchor can itself have a
/// parent outside the fetched set. Children keep the creation order the
/// fetch established.
fn assemble(rows: Vec<FetchedRow>) -> Vec<TreeNode> {
    let mut anchors: Vec<Calculation> = Vec::new();
    let mut pending: HashMap<CalculationId, Vec<Calculation>> = HashMap::new();

    for row in rows {
        match row.calculation.parent_id {
            Some(parent_id) if row.level > 0 => {
                pending.entry(parent_id).or_default().push(row.calculation);
            }
            _ => anchors.push(row.calculation),
        }
    }

    let forest: Vec<TreeNode> = anchors
        .into_iter()
        .map(|calculation| attach_children(calculation, &mut pending))
        .collect();

    // Referential integrity makes this unreachable; guard anyway rather
    // than lose the whole read to one stray row.
    if !pending.is_empty() {
        let dropped: usize = pending.values().map(Vec::len).sum();
        warn!(dropped, "Dropping fetched nodes whose parent was not fetched");
    }

    forest
}

fn attach_children(
    calculation: Calculation,
    pending: &mut HashMap<CalculationId, Vec<Calculation>>,
) -> TreeNode {
    let children = pending
        .remove(&calculation.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach_children(child, pending))
        .collect();
    TreeNode {
        calculation,
        children,
    }
}
