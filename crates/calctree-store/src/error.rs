//! Store error types.

use crate::models::CalculationId;
use calctree_engine::EngineError;
use thiserror::Error;

/// Store error type.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error (transient; safe to retry)
    #[error("connection pool error: {0}")]
    Pool(String),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(String),

    /// Arithmetic validation or computation failure
    #[error(transparent)]
    Arithmetic(#[from] EngineError),

    /// Child creation referenced a parent that does not exist
    #[error("parent calculation not found: {0}")]
    ParentNotFound(CalculationId),

    /// Not found error
    #[error("not found: {0}")]
    NotFound(String),
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
