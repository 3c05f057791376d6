//! Prelude module - common imports for tally-sheets users
//!
//! ```rust
//! use tally_sheets::prelude::*;
//! ```

pub use crate::{
    // Engine types
    new_sheet,
    ArithmeticEngine,
    // Cell types
    CellContent,
    CellError,
    CellValue,
    // Error types
    Error,
    Formula,
    FormulaEngine,
    ParseError,
    Position,
    Result,
    // Main types
    Sheet,
    // Constants
    MAX_COLS,
    MAX_ROWS,
};
