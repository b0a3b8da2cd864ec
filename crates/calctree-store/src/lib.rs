//! # calctree-store
//!
//! SQLite-backed store for calculation trees: users create a starting number,
//! other users append arithmetic operations as child nodes, and reads
//! materialize the nested tree from the flat row set.
//!
//! ## Non-negotiable Principles
//!
//! - **SQLite is the only durable store** - every write commits there first
//! - **Nodes are immutable after creation** - the only mutation is deletion,
//!   which cascades to the whole subtree
//! - **Child creation is one transaction** - read parent, compute, insert;
//!   any failure rolls back with zero persisted side effects
//! - **Tree views are derived, never cached** - each read re-fetches and
//!   re-assembles from current state
//!
//! ## Architecture
//!
//! ```text
//! WRITE:
//!   pool -> transaction -> parent snapshot -> engine -> insert -> commit
//!
//! READ:
//!   pool -> recursive closure fetch -> in-memory assembly
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use calctree_store::{CalcStore, Operation, PoolConfig};
//! use rust_decimal::Decimal;
//!
//! # fn main() -> Result<(), calctree_store::StoreError> {
//! let store = CalcStore::open("calctree.db".as_ref(), PoolConfig::default())?;
//!
//! let alice = store.create_user("alice")?;
//! let root = store.create_root(alice.id, Decimal::from(10))?;
//! let child = store.create_child(alice.id, root.id, Operation::Add, Decimal::from(5))?;
//! assert_eq!(child.result, Decimal::from(15));
//!
//! let forest = store.get_forest(None)?;
//! assert_eq!(forest.len(), 1);
//! # Ok(())
//! # }
//! ```

mod error;
mod migrations;
mod models;
mod pool;
pub mod queries;
mod store;
mod tree;

#[cfg(test)]
mod tests;

pub use error::{StoreError, StoreResult};
pub use models::{Calculation, CalculationId, NewChild, NewRoot, User, UserId};
pub use pool::{DatabasePool, PoolConfig, PoolState};
pub use store::CalcStore;
pub use tree::TreeNode;

// Re-exported so callers don't need a direct calctree-engine dependency.
pub use calctree_engine::{EngineError, Operation};
