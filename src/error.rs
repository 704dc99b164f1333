//! Error types for index construction.

use thiserror::Error;

/// Error variants surfaced while building an index.
///
/// The query path is total and has no error type of its own; construction is
/// the only place invalid input can be observed, and no partial index is
/// ever returned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The item at this buffer position has `beg > end` (or endpoints that
    /// do not compare, such as NaN).
    #[error("invalid interval: item {0} has beg > end")]
    InvalidInterval(usize),

    /// The item at this buffer position uses the reserved sentinel position
    /// as an endpoint.
    #[error("invalid interval: item {0} uses the reserved sentinel position")]
    ReservedPosition(usize),
}

/// A specialized Result type for index construction.
pub type Result<T> = std::result::Result<T, Error>;
