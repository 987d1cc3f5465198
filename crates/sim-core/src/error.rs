//! Error types for sim-core operations.

use std::fmt;
use types::Symbol;

/// Result type for sim-core operations.
pub type Result<T> = std::result::Result<T, SimCoreError>;

/// Errors that can occur during market operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SimCoreError {
    /// The requested symbol has no commodity or order book.
    UnknownSymbol(Symbol),
    /// A date string did not parse as strict `YYYY-MM-DD`.
    InvalidDate(String),
    /// Order quantity must be positive.
    InvalidQuantity(i64),
    /// Limit order price must be positive and finite.
    InvalidPrice(f64),
}

impl fmt::Display for SimCoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimCoreError::UnknownSymbol(s) => write!(f, "unknown symbol: {}", s),
            SimCoreError::InvalidDate(s) => write!(f, "failed to parse date: {}", s),
            SimCoreError::InvalidQuantity(q) => write!(f, "order quantity must be positive: {}", q),
            SimCoreError::InvalidPrice(p) => {
                write!(f, "limit price must be positive and finite: {}", p)
            }
        }
    }
}

impl std::error::Error for SimCoreError {}
