//! # tally-sheets-formula
//!
//! Arithmetic formula engine for tally-sheets.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Formula evaluation (AST → number or cell error)
//! - Canonical rendering with minimal parentheses
//! - The [`FormulaEngine`] implementation the sheet core plugs in
//!
//! The grammar covers number literals, A1-style cell references, unary
//! `+`/`-`, the binary operators `+ - * /`, and parentheses.
//!
//! ## Example
//!
//! ```rust
//! use tally_sheets_core::FormulaEngine;
//! use tally_sheets_formula::ArithmeticEngine;
//!
//! let engine = ArithmeticEngine::new();
//! let formula = engine.parse("1 + 2*B1").unwrap();
//!
//! // Whitespace is gone; the rendering is canonical
//! assert_eq!(formula.expression(), "1+2*B1");
//!
//! let result = formula.evaluate(&mut |_| Ok(10.0));
//! assert_eq!(result, Ok(21.0));
//! ```

pub mod ast;
pub mod evaluator;
pub mod parser;

use std::sync::Arc;

use tally_sheets_core::{
    EvalResult, Formula, FormulaEngine, ParseError, ParseResult, Position,
};

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use evaluator::evaluate;
pub use parser::parse_expression;

/// A compiled arithmetic formula
///
/// Wraps the AST and exposes it through the core's [`Formula`] contract.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFormula {
    ast: FormulaExpr,
}

impl CompiledFormula {
    /// Compile an expression body (the text after the leading `=`)
    pub fn compile(source: &str) -> Result<Self, ParseError> {
        let ast = parser::parse_expression(source)?;
        Ok(Self { ast })
    }

    /// The underlying expression tree
    pub fn ast(&self) -> &FormulaExpr {
        &self.ast
    }
}

impl Formula for CompiledFormula {
    fn evaluate(&self, resolver: &mut dyn FnMut(Position) -> EvalResult) -> EvalResult {
        evaluator::evaluate(&self.ast, resolver)
    }

    fn expression(&self) -> String {
        self.ast.to_string()
    }

    fn referenced_cells(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        self.ast.collect_references(&mut positions);
        positions
    }
}

/// The arithmetic formula engine
///
/// Stateless; one instance serves any number of sheets.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticEngine;

impl ArithmeticEngine {
    /// Create a new engine
    pub fn new() -> Self {
        Self
    }
}

impl FormulaEngine for ArithmeticEngine {
    fn parse(&self, source: &str) -> ParseResult {
        let formula = CompiledFormula::compile(source)?;
        Ok(Arc::new(formula))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_reports_references_in_source_order() {
        let engine = ArithmeticEngine::new();
        let formula = engine.parse("A1+B2*A1").unwrap();
        let a1 = Position::parse("A1").unwrap();
        let b2 = Position::parse("B2").unwrap();
        // Duplicates stay in; the sheet decides how to dedupe
        assert_eq!(formula.referenced_cells(), vec![a1, b2, a1]);
    }

    #[test]
    fn test_engine_rejects_malformed_input() {
        let engine = ArithmeticEngine::new();
        assert!(engine.parse("").is_err());
        assert!(engine.parse("1+").is_err());
        assert!(engine.parse("=5").is_err());
        assert!(engine.parse("(1").is_err());
        assert!(engine.parse("hello").is_err());
    }

    #[test]
    fn test_engine_keeps_out_of_range_references() {
        let engine = ArithmeticEngine::new();
        let formula = engine.parse("ZZZZZ1+1").unwrap();

        let refs = formula.referenced_cells();
        assert_eq!(refs.len(), 1);
        assert!(!refs[0].is_valid());

        assert_eq!(formula.expression(), "#REF!+1");
    }

    #[test]
    fn test_compiled_formula_round_trip() {
        let formula = CompiledFormula::compile("(B1+B2) * 2").unwrap();
        assert_eq!(formula.expression(), "(B1+B2)*2");

        let reparsed = CompiledFormula::compile(&formula.expression()).unwrap();
        assert_eq!(reparsed.ast(), formula.ast());
    }
}
