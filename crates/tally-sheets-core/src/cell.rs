//! Cell content and dependency bookkeeping

use std::sync::Arc;

use ahash::AHashSet;

use crate::formula::{EvalResult, Formula, FormulaEngine, ParseError};
use crate::position::Position;

/// Leading character that marks formula input
pub const FORMULA_MARKER: char = '=';

/// Leading character that shields text from formula interpretation
pub const ESCAPE_MARKER: char = '\'';

/// Content committed into a cell
#[derive(Debug, Clone, Default)]
pub enum CellContent {
    /// No content
    #[default]
    Empty,
    /// Literal text, stored as entered (escape marker included)
    Text(String),
    /// Compiled formula plus its cached result
    Formula(FormulaContent),
}

impl CellContent {
    /// Classify raw input text, compiling formula bodies through `engine`
    ///
    /// Input of two or more characters starting with `=` is a formula; a lone
    /// `=` is ordinary text. Classification touches no sheet state, so a
    /// parse failure leaves nothing to roll back.
    pub fn classify(text: &str, engine: &dyn FormulaEngine) -> Result<Self, ParseError> {
        if text.is_empty() {
            return Ok(CellContent::Empty);
        }
        if text.len() >= 2 && text.starts_with(FORMULA_MARKER) {
            let formula = engine.parse(&text[1..])?;
            return Ok(CellContent::Formula(FormulaContent::new(formula)));
        }
        Ok(CellContent::Text(text.to_string()))
    }

    /// Check if this is empty content
    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Empty)
    }

    /// Check if this is a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, CellContent::Formula(_))
    }

    /// The raw text form of the content
    ///
    /// Formulas render canonically with the leading `=`; text comes back
    /// exactly as entered, escape marker included.
    pub fn text(&self) -> String {
        match self {
            CellContent::Empty => String::new(),
            CellContent::Text(text) => text.clone(),
            CellContent::Formula(content) => {
                format!("{}{}", FORMULA_MARKER, content.formula.expression())
            }
        }
    }
}

/// Strip the leading escape marker from text content, if present
pub fn unescape_text(text: &str) -> &str {
    text.strip_prefix(ESCAPE_MARKER).unwrap_or(text)
}

/// A compiled formula together with its memoized result
#[derive(Debug, Clone)]
pub struct FormulaContent {
    /// The compiled formula
    pub(crate) formula: Arc<dyn Formula>,
    /// Memoized evaluation result; `None` while invalidated
    pub(crate) cache: Option<EvalResult>,
}

impl FormulaContent {
    /// Wrap a compiled formula with an empty cache
    pub(crate) fn new(formula: Arc<dyn Formula>) -> Self {
        Self {
            formula,
            cache: None,
        }
    }

    /// The compiled formula
    pub fn formula(&self) -> &Arc<dyn Formula> {
        &self.formula
    }

    /// The cached result, if the cache is currently valid
    pub fn cached(&self) -> Option<EvalResult> {
        self.cache
    }

    /// Valid positions the formula references, first occurrence kept
    pub fn referenced_cells(&self) -> Vec<Position> {
        let mut seen = AHashSet::new();
        let mut cells = Vec::new();
        for position in self.formula.referenced_cells() {
            if position.is_valid() && seen.insert(position) {
                cells.push(position);
            }
        }
        cells
    }
}

/// A single cell: content plus dependency edges
///
/// Edges are stored bidirectionally: `dependencies` holds the cells this
/// cell's formula reads, `dependents` holds the cells whose formulas read
/// this one. The two sides mirror each other across the whole sheet.
#[derive(Debug, Default)]
pub struct Cell {
    /// Committed content
    pub(crate) content: CellContent,
    /// Positions this cell's formula references
    pub(crate) dependencies: AHashSet<Position>,
    /// Positions whose formulas reference this cell
    pub(crate) dependents: AHashSet<Position>,
}

impl Cell {
    /// Create an empty cell with no edges
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The committed content
    pub fn content(&self) -> &CellContent {
        &self.content
    }

    /// Check if any formula on the sheet references this cell
    pub fn is_referenced(&self) -> bool {
        !self.dependents.is_empty()
    }

    /// Valid positions referenced by this cell's formula, if it has one
    pub fn referenced_cells(&self) -> Vec<Position> {
        match &self.content {
            CellContent::Formula(content) => content.referenced_cells(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::ParseResult;

    struct RejectAll;

    impl FormulaEngine for RejectAll {
        fn parse(&self, source: &str) -> ParseResult {
            Err(ParseError::new(format!("unsupported formula: {source}")))
        }
    }

    #[test]
    fn test_classify_empty() {
        let content = CellContent::classify("", &RejectAll).unwrap();
        assert!(content.is_empty());
        assert_eq!(content.text(), "");
    }

    #[test]
    fn test_classify_text() {
        let content = CellContent::classify("hello", &RejectAll).unwrap();
        assert!(!content.is_formula());
        assert_eq!(content.text(), "hello");
    }

    #[test]
    fn test_lone_equals_is_text() {
        let content = CellContent::classify("=", &RejectAll).unwrap();
        assert!(!content.is_formula());
        assert_eq!(content.text(), "=");
    }

    #[test]
    fn test_escaped_formula_is_text() {
        let content = CellContent::classify("'=1+2", &RejectAll).unwrap();
        assert!(!content.is_formula());
        assert_eq!(content.text(), "'=1+2");
        assert_eq!(unescape_text("'=1+2"), "=1+2");
    }

    #[test]
    fn test_formula_parse_failure_propagates() {
        let err = CellContent::classify("=1+", &RejectAll).unwrap_err();
        assert_eq!(err.message(), "unsupported formula: 1+");
    }

    #[test]
    fn test_unescape_only_strips_leading_marker() {
        assert_eq!(unescape_text("'text"), "text");
        assert_eq!(unescape_text("''double"), "'double");
        assert_eq!(unescape_text("plain"), "plain");
        assert_eq!(unescape_text("mid'dle"), "mid'dle");
    }

    #[test]
    fn test_new_cell_is_unreferenced() {
        let cell = Cell::new();
        assert!(cell.content().is_empty());
        assert!(!cell.is_referenced());
        assert!(cell.referenced_cells().is_empty());
    }
}
