//! Sheet: the cell arena and its dependency graph
//!
//! The sheet owns every cell, keyed by [`Position`]. Mutation funnels through
//! one pipeline: classify the input, reject cycles before anything changes,
//! commit the content, rewire both edge directions, invalidate downstream
//! caches. Reads are pull-based: a formula evaluates on first access and
//! memoizes its result until a dependency changes.

use std::fmt;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};

use crate::cell::{unescape_text, Cell, CellContent};
use crate::error::{Error, Result};
use crate::formula::{EvalResult, Formula, FormulaEngine};
use crate::position::Position;
use crate::value::{CellError, CellValue};
use crate::{MAX_COLS, MAX_ROWS};

/// A sheet of cells with dependency tracking and cached evaluation
pub struct Sheet {
    /// Cell arena, keyed by position
    cells: AHashMap<Position, Cell>,
    /// Engine used to compile formula input
    engine: Box<dyn FormulaEngine>,
}

impl Sheet {
    /// Create an empty sheet backed by the given formula engine
    pub fn new(engine: Box<dyn FormulaEngine>) -> Self {
        Self {
            cells: AHashMap::new(),
            engine,
        }
    }

    // === Cell Access ===

    /// Get a cell by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<Option<&Cell>> {
        let position = Position::parse(address)?;
        Ok(self.cell_at(position))
    }

    /// Get a cell by position
    ///
    /// `None` means the position was never set and never referenced.
    pub fn cell_at(&self, position: Position) -> Option<&Cell> {
        self.cells.get(&position)
    }

    /// Get a cell's raw text by address string
    pub fn get_text(&self, address: &str) -> Result<String> {
        let position = Position::parse(address)?;
        Ok(self.get_text_at(position))
    }

    /// Get a cell's raw text by position
    ///
    /// Formula cells render as `=` followed by the canonical expression;
    /// missing cells read as empty text.
    pub fn get_text_at(&self, position: Position) -> String {
        self.cells
            .get(&position)
            .map(|cell| cell.content.text())
            .unwrap_or_default()
    }

    /// Get a cell's computed value by address string
    pub fn get_value(&mut self, address: &str) -> Result<CellValue> {
        let position = Position::parse(address)?;
        Ok(self.get_value_at(position))
    }

    /// Get a cell's computed value by position
    ///
    /// Formula cells evaluate lazily; the borrow is mutable because a read
    /// can populate caches anywhere in the dependency chain. Missing and
    /// empty cells read as empty text.
    pub fn get_value_at(&mut self, position: Position) -> CellValue {
        let formula = match self.cells.get(&position) {
            None => return CellValue::Text(String::new()),
            Some(cell) => match &cell.content {
                CellContent::Empty => return CellValue::Text(String::new()),
                CellContent::Text(text) => {
                    return CellValue::Text(unescape_text(text).to_string());
                }
                CellContent::Formula(content) => {
                    if let Some(cached) = content.cache {
                        return CellValue::from(cached);
                    }
                    Arc::clone(&content.formula)
                }
            },
        };
        CellValue::from(self.evaluate_and_cache(position, formula))
    }

    /// Check if any formula references the cell at the given address
    pub fn is_referenced(&self, address: &str) -> Result<bool> {
        let position = Position::parse(address)?;
        Ok(self.is_referenced_at(position))
    }

    /// Check if any formula references the cell at the given position
    pub fn is_referenced_at(&self, position: Position) -> bool {
        self.cells
            .get(&position)
            .map(|cell| cell.is_referenced())
            .unwrap_or(false)
    }

    /// Valid positions referenced by the formula at the given address
    pub fn referenced_cells(&self, address: &str) -> Result<Vec<Position>> {
        let position = Position::parse(address)?;
        Ok(self.referenced_cells_at(position))
    }

    /// Valid positions referenced by the formula at the given position
    ///
    /// Deduplicated, first occurrence first. Empty for text, empty, and
    /// missing cells.
    pub fn referenced_cells_at(&self, position: Position) -> Vec<Position> {
        self.cells
            .get(&position)
            .map(|cell| cell.referenced_cells())
            .unwrap_or_default()
    }

    /// Number of cells the sheet has materialized
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    // === Cell Modification ===

    /// Set a cell's content by address string
    pub fn set_content(&mut self, address: &str, text: &str) -> Result<()> {
        let position = Position::parse(address)?;
        self.set_content_at(position, text)
    }

    /// Set a cell's content by position
    ///
    /// The input is classified as empty, text, or formula. A malformed
    /// formula or a formula that would close a dependency cycle rejects the
    /// whole set: the cell keeps its previous content and edges, and nothing
    /// is materialized.
    pub fn set_content_at(&mut self, position: Position, text: &str) -> Result<()> {
        self.validate_position(position)?;
        let content = CellContent::classify(text, self.engine.as_ref())?;
        if self.would_create_cycle(position, &content) {
            log::debug!("rejected content at {position}: circular reference");
            return Err(Error::CircularReference(position));
        }
        self.commit_content(position, content);
        self.invalidate_from(position);
        Ok(())
    }

    /// Clear a cell by address string
    pub fn clear_cell(&mut self, address: &str) -> Result<()> {
        let position = Position::parse(address)?;
        self.clear_cell_at(position)
    }

    /// Clear a cell by position
    ///
    /// Equivalent to setting empty content. Clearing a cell that was never
    /// materialized is a no-op.
    pub fn clear_cell_at(&mut self, position: Position) -> Result<()> {
        self.validate_position(position)?;
        if self.cells.contains_key(&position) {
            self.commit_content(position, CellContent::Empty);
            self.invalidate_from(position);
        }
        Ok(())
    }

    // === Graph Maintenance ===

    /// Check whether committing `content` at `position` would close a cycle
    ///
    /// Walks the existing dependents relation starting at `position` and
    /// tests every visited cell for membership in the candidate dependency
    /// set. The start cell is tested first, so a direct self-reference is
    /// caught on the first comparison. Touches no state.
    fn would_create_cycle(&self, position: Position, content: &CellContent) -> bool {
        let candidates: AHashSet<Position> = match content {
            CellContent::Formula(formula_content) => {
                formula_content.referenced_cells().into_iter().collect()
            }
            _ => return false,
        };
        if candidates.is_empty() {
            return false;
        }

        let mut visited = AHashSet::new();
        let mut stack = vec![position];
        while let Some(current) = stack.pop() {
            if candidates.contains(&current) {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(cell) = self.cells.get(&current) {
                stack.extend(cell.dependents.iter().copied());
            }
        }
        false
    }

    /// Replace the content at `position` and rewire both edge directions
    ///
    /// Referenced positions missing from the arena are materialized as empty
    /// cells so the reverse edge has somewhere to live.
    fn commit_content(&mut self, position: Position, content: CellContent) {
        let new_deps: AHashSet<Position> = match &content {
            CellContent::Formula(formula_content) => {
                formula_content.referenced_cells().into_iter().collect()
            }
            _ => AHashSet::new(),
        };

        let old_deps = {
            let cell = self.cells.entry(position).or_insert_with(Cell::new);
            cell.content = content;
            std::mem::replace(&mut cell.dependencies, new_deps.clone())
        };

        for dep in old_deps.difference(&new_deps) {
            if let Some(dep_cell) = self.cells.get_mut(dep) {
                dep_cell.dependents.remove(&position);
            }
        }
        for dep in new_deps.difference(&old_deps) {
            let dep_cell = self.cells.entry(*dep).or_insert_with(|| {
                log::trace!("materializing empty cell at {dep}");
                Cell::new()
            });
            dep_cell.dependents.insert(position);
        }
    }

    /// Clear cached results downstream of a change at `origin`
    ///
    /// Depth-first over dependents. The origin's dependents are always
    /// visited; past the origin, the walk stops at any formula cell whose
    /// cache is already empty, because its dependents were cleared when it
    /// was. Non-formula cells carry no cache and pass the walk through.
    fn invalidate_from(&mut self, origin: Position) {
        let mut stack: Vec<Position> = match self.cells.get(&origin) {
            Some(cell) => cell.dependents.iter().copied().collect(),
            None => return,
        };
        while let Some(position) = stack.pop() {
            if let Some(cell) = self.cells.get_mut(&position) {
                let proceed = match &mut cell.content {
                    CellContent::Formula(content) => content.cache.take().is_some(),
                    _ => true,
                };
                if proceed {
                    stack.extend(cell.dependents.iter().copied());
                }
            }
        }
    }

    // === Evaluation ===

    /// Evaluate `formula`, memoize the result at `position`, and return it
    fn evaluate_and_cache(&mut self, position: Position, formula: Arc<dyn Formula>) -> EvalResult {
        let result = formula.evaluate(&mut |referenced| self.lookup_number(referenced));
        if let Some(cell) = self.cells.get_mut(&position) {
            if let CellContent::Formula(content) = &mut cell.content {
                content.cache = Some(result);
            }
        }
        result
    }

    /// Resolve a referenced position to a number during evaluation
    ///
    /// Invalid positions yield `Ref`. Missing and empty cells read as zero.
    /// Text must coerce to a number. Formula cells evaluate recursively,
    /// reusing their cache; write-time cycle rejection bounds the recursion.
    fn lookup_number(&mut self, position: Position) -> EvalResult {
        if !position.is_valid() {
            return Err(CellError::Ref);
        }
        let formula = match self.cells.get(&position) {
            None => return Ok(0.0),
            Some(cell) => match &cell.content {
                CellContent::Empty => return Ok(0.0),
                CellContent::Text(text) => return coerce_number(unescape_text(text)),
                CellContent::Formula(content) => {
                    if let Some(cached) = content.cache {
                        return cached;
                    }
                    Arc::clone(&content.formula)
                }
            },
        };
        self.evaluate_and_cache(position, formula)
    }

    fn validate_position(&self, position: Position) -> Result<()> {
        if position.row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(position.row, MAX_ROWS - 1));
        }
        if position.col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(position.col, MAX_COLS - 1));
        }
        Ok(())
    }

    /// Walk the arena and assert the bidirectional edge invariant
    #[cfg(test)]
    fn assert_consistent(&self) {
        for (position, cell) in &self.cells {
            match &cell.content {
                CellContent::Formula(content) => {
                    let expected: AHashSet<Position> =
                        content.referenced_cells().into_iter().collect();
                    assert_eq!(
                        cell.dependencies, expected,
                        "dependencies of {position} drifted from its formula"
                    );
                }
                _ => assert!(
                    cell.dependencies.is_empty(),
                    "non-formula cell {position} has dependencies"
                ),
            }
            for dep in &cell.dependencies {
                let dep_cell = self
                    .cells
                    .get(dep)
                    .unwrap_or_else(|| panic!("dependency {dep} of {position} not materialized"));
                assert!(
                    dep_cell.dependents.contains(position),
                    "missing reverse edge {dep} -> {position}"
                );
            }
            for dependent in &cell.dependents {
                let dependent_cell = self
                    .cells
                    .get(dependent)
                    .unwrap_or_else(|| panic!("dependent {dependent} of {position} missing"));
                assert!(
                    dependent_cell.dependencies.contains(position),
                    "missing forward edge {dependent} -> {position}"
                );
            }
        }
    }
}

impl fmt::Debug for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sheet")
            .field("cells", &self.cells)
            .finish_non_exhaustive()
    }
}

/// Coerce text content to a number for formula evaluation
///
/// Empty text reads as zero. Otherwise leading whitespace is skipped and the
/// remainder must parse in full as a finite number, or the coercion yields
/// `Value`. Trailing characters reject, whitespace included.
fn coerce_number(text: &str) -> EvalResult {
    if text.is_empty() {
        return Ok(0.0);
    }
    match text.trim_start().parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(CellError::Value),
    }
}
