//! Error types for tally-sheets-core

use crate::formula::ParseError;
use crate::position::Position;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tally-sheets-core
///
/// These are structural errors returned from mutating calls and never stored
/// in cells. Evaluation outcomes such as `#DIV/0!` are not errors in this
/// sense; they are [`CellError`](crate::CellError) values a read produces.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u32),

    /// Formula text rejected by the formula engine
    #[error("Formula parse error: {0}")]
    FormulaParse(#[from] ParseError),

    /// Committing the new content would create a dependency cycle
    #[error("Circular reference detected involving cell {0}")]
    CircularReference(Position),
}
