//! # calctree-engine
//!
//! Decimal arithmetic for calculation trees: computes a child node's result
//! from its parent's result, an operation, and an operand.
//!
//! ## Non-negotiable Principles
//!
//! - **Pure computation** - no persistence, no I/O, no shared state
//! - **Nothing out of range is ever returned** - every result is re-validated,
//!   even when both inputs already passed validation
//! - **Decimal semantics, not binary floats** - values are `rust_decimal`
//!   fixed-point; NaN and infinities are unrepresentable by construction
//!
//! ## Example
//!
//! ```rust
//! use calctree_engine::{compute_result, Operation};
//! use rust_decimal_macros::dec;
//!
//! let result = compute_result(dec!(10), Operation::Add, dec!(5)).unwrap();
//! assert_eq!(result, dec!(15));
//!
//! assert!(compute_result(dec!(10), Operation::Divide, dec!(0)).is_err());
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Largest magnitude a stored value may have: 28 integer digits.
///
/// Matches a fixed-point column with 28 digits before the decimal point and
/// 10 after (`NUMERIC(38, 10)`).
pub const MAX_MAGNITUDE: Decimal = dec!(9999999999999999999999999999);

/// Number of fractional digits kept on stored values.
pub const RESULT_SCALE: u32 = 10;

/// An arithmetic operation applied to a parent result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }

    /// Parses an operation tag. Unrecognized tags are rejected, not defaulted:
    /// an unknown operation must never silently compute something.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Self::Add),
            "subtract" => Some(Self::Subtract),
            "multiply" => Some(Self::Multiply),
            "divide" => Some(Self::Divide),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while computing a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Input value outside the representable range.
    #[error("number out of range: {0}")]
    InvalidNumber(String),

    /// Division by zero.
    #[error("division by zero is not allowed")]
    DivisionByZero,

    /// The operation produced a value outside the representable range.
    #[error("result is too large (overflow)")]
    Overflow,
}

/// Validates a value against the representable range and normalizes it to
/// the storage scale.
///
/// `Decimal` cannot encode NaN or infinities, so finiteness holds by
/// construction; only the range check is explicit. Values with more than
/// [`RESULT_SCALE`] fractional digits are rounded half-away-from-zero, the
/// same rounding a `NUMERIC(38, 10)` column applies on write.
pub fn validate(value: Decimal) -> Result<Decimal, EngineError> {
    if value.abs() > MAX_MAGNITUDE {
        return Err(EngineError::InvalidNumber(value.to_string()));
    }
    Ok(value.round_dp_with_strategy(RESULT_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

/// Computes `parent_result <operation> operand`.
///
/// Both inputs are validated first ([`EngineError::InvalidNumber`]), then the
/// checked operation runs, then the result is validated again. The post-check
/// is not redundant: two in-range values can multiply (or add) to an
/// out-of-range one, which fails with [`EngineError::Overflow`].
///
/// Root creation never calls this; a root's result is its validated operand.
pub fn compute_result(
    parent_result: Decimal,
    operation: Operation,
    operand: Decimal,
) -> Result<Decimal, EngineError> {
    let parent_result = validate(parent_result)?;
    let operand = validate(operand)?;

    let raw = match operation {
        Operation::Add => parent_result.checked_add(operand),
        Operation::Subtract => parent_result.checked_sub(operand),
        Operation::Multiply => parent_result.checked_mul(operand),
        Operation::Divide => {
            if operand.is_zero() {
                return Err(EngineError::DivisionByZero);
            }
            parent_result.checked_div(operand)
        }
    }
    // checked_* returns None when the 96-bit coefficient overflows.
    .ok_or(EngineError::Overflow)?;

    let result = raw.round_dp_with_strategy(RESULT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if result.abs() > MAX_MAGNITUDE {
        return Err(EngineError::Overflow);
    }
    Ok(result)
}
