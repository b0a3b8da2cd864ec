//! Model types for the calculation store.

use calctree_engine::Operation;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unique identifier for a calculation node (SQLite rowid).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalculationId(pub i64);

impl std::fmt::Display for CalculationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user (SQLite rowid).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user.
///
/// The store only keeps the identity that ownership checks and display
/// tagging need; credentials and sessions live in the request layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A single stored calculation step, root or child.
///
/// Immutable once created. Roots have no parent and no operation and their
/// result equals their operand; children carry both and their result is
/// derived from the parent's. `username` is joined in on every read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calculation {
    pub id: CalculationId,
    pub user_id: UserId,
    pub username: String,
    pub parent_id: Option<CalculationId>,
    pub operation: Option<Operation>,
    pub operand: Decimal,
    pub result: Decimal,
    pub depth: i64,
    pub created_at: DateTime<Utc>,
}

impl Calculation {
    /// True if this node is a starting number.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A root calculation (starting number) to be inserted.
#[derive(Debug, Clone)]
pub struct NewRoot {
    pub user_id: UserId,
    pub operand: Decimal,
}

/// A child calculation to be inserted under an existing parent.
#[derive(Debug, Clone)]
pub struct NewChild {
    pub user_id: UserId,
    pub parent_id: CalculationId,
    pub operation: Operation,
    pub operand: Decimal,
}
