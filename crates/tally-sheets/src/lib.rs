//! # tally-sheets
//!
//! An incremental spreadsheet calculation engine.
//!
//! Cells hold text or formulas; formulas reference other cells by A1-style
//! address. The sheet tracks the dependency graph between cells, rejects
//! writes that would close a reference cycle, caches formula results, and
//! invalidates exactly the caches an edit makes stale.
//!
//! ## Features
//!
//! - Content classification: plain text, `=`-prefixed formulas, and a
//!   leading-apostrophe escape for literal text
//! - Arithmetic formulas: numbers, A1 references, `+ - * /`, unary sign,
//!   parentheses
//! - Write-time cycle rejection; the sheet never enters a cyclic state
//! - Lazy evaluation with memoized results and targeted invalidation
//! - Error values (`#REF!`, `#VALUE!`, `#DIV/0!`) that flow through
//!   dependent formulas
//!
//! ## Example
//!
//! ```rust
//! use tally_sheets::prelude::*;
//!
//! let mut sheet = new_sheet();
//!
//! sheet.set_content("A1", "4").unwrap();
//! sheet.set_content("B1", "=A1*A1").unwrap();
//! assert_eq!(sheet.get_value("B1").unwrap(), CellValue::Number(16.0));
//!
//! // Editing A1 invalidates B1's cached result
//! sheet.set_content("A1", "5").unwrap();
//! assert_eq!(sheet.get_value("B1").unwrap(), CellValue::Number(25.0));
//! ```

pub mod prelude;

// Re-export core types
pub use tally_sheets_core::{
    Cell, CellContent, CellError, CellValue, Error, EvalResult, Formula, FormulaContent,
    FormulaEngine, ParseError, ParseResult, Position, Result, Sheet, MAX_COLS, MAX_ROWS,
};

// Re-export formula types
pub use tally_sheets_formula::{
    evaluate, parse_expression, ArithmeticEngine, BinaryOperator, CompiledFormula, FormulaExpr,
    UnaryOperator,
};

/// Create a sheet wired to the arithmetic formula engine
pub fn new_sheet() -> Sheet {
    Sheet::new(Box::new(ArithmeticEngine::new()))
}
