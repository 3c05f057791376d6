//! # tally-sheets-core
//!
//! Cell dependency graph and incremental recomputation core for the
//! tally-sheets spreadsheet engine.
//!
//! This crate provides the fundamental machinery:
//! - [`Position`] - Cell addressing with validity checking
//! - [`CellValue`] and [`CellError`] - The observable results of reading a cell
//! - [`CellContent`] and [`Cell`] - Content variants plus per-cell graph edges
//! - [`Sheet`] - The cell arena: content classification, cycle rejection,
//!   bidirectional edge maintenance, cache invalidation, and lazy evaluation
//! - [`Formula`] and [`FormulaEngine`] - The contract a formula implementation
//!   plugs into
//!
//! The crate is grammar-agnostic: it never parses expression text itself.
//! Formula cells hold opaque engine objects and the sheet only talks to them
//! through the [`Formula`] trait.
//!
//! ## Example
//!
//! ```rust
//! use tally_sheets_core::{CellError, CellValue, Position};
//!
//! let pos = Position::parse("B2").unwrap();
//! assert_eq!(pos.row, 1);
//! assert_eq!(pos.col, 1);
//! assert_eq!(pos.to_string(), "B2");
//!
//! assert_eq!(CellValue::Error(CellError::Div0).to_string(), "#DIV/0!");
//! ```

pub mod cell;
pub mod error;
pub mod formula;
pub mod position;
pub mod sheet;
pub mod value;

// Re-exports for convenience
pub use cell::{Cell, CellContent, FormulaContent};
pub use error::{Error, Result};
pub use formula::{EvalResult, Formula, FormulaEngine, ParseError, ParseResult};
pub use position::Position;
pub use sheet::Sheet;
pub use value::{CellError, CellValue};

/// Maximum number of rows in a sheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a sheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;
