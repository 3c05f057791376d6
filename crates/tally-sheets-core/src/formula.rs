//! Formula abstraction shared between the sheet core and formula engines
//!
//! The core tracks dependencies and caches results; it never looks inside a
//! formula. Engines compile formula bodies into [`Formula`] values behind the
//! [`FormulaEngine`] trait, and the sheet drives evaluation through a resolver
//! callback so the engine never sees the sheet itself.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::position::Position;
use crate::value::CellError;

/// Result of evaluating a formula or resolving a referenced cell
pub type EvalResult = Result<f64, CellError>;

/// Result of compiling a formula body
pub type ParseResult = Result<Arc<dyn Formula>, ParseError>;

/// Error raised when formula text cannot be compiled
///
/// Unlike [`CellError`](crate::value::CellError), a parse error never becomes
/// a cell value: the write that produced it is rejected and the cell keeps its
/// previous content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ParseError(String);

impl ParseError {
    /// Create a parse error with the given message
    pub fn new(message: impl Into<String>) -> Self {
        ParseError(message.into())
    }

    /// The error message
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// A compiled formula
pub trait Formula: fmt::Debug {
    /// Evaluate the formula, resolving cell references through `resolver`
    ///
    /// The first error returned by an operand wins; evaluation is
    /// left-to-right.
    fn evaluate(&self, resolver: &mut dyn FnMut(Position) -> EvalResult) -> EvalResult;

    /// Render the formula in canonical form, without the leading `=`
    fn expression(&self) -> String;

    /// Every position the formula mentions, in source order
    ///
    /// Duplicates and invalid positions are included; callers that build
    /// dependency edges filter and deduplicate.
    fn referenced_cells(&self) -> Vec<Position>;
}

/// Compiles formula bodies into [`Formula`] values
pub trait FormulaEngine {
    /// Compile the body of a formula (the text after the leading `=`)
    fn parse(&self, source: &str) -> ParseResult;
}
