//! Formula abstract syntax tree types

use std::fmt;

use tally_sheets_core::Position;

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Numeric literal
    Number(f64),
    /// Cell reference; out-of-range references are kept as invalid
    /// positions so they render as `#REF!` and fail at evaluation
    CellRef(Position),
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },
}

impl FormulaExpr {
    /// Binding strength used by the canonical printer; higher binds tighter
    fn precedence(&self) -> u8 {
        match self {
            FormulaExpr::Number(_) | FormulaExpr::CellRef(_) => 4,
            FormulaExpr::UnaryOp { .. } => 3,
            FormulaExpr::BinaryOp { op, .. } => op.precedence(),
        }
    }

    /// Append every referenced position to `out`, in source order
    ///
    /// Duplicates and invalid positions are included; callers decide how
    /// to filter them.
    pub fn collect_references(&self, out: &mut Vec<Position>) {
        match self {
            FormulaExpr::Number(_) => {}
            FormulaExpr::CellRef(position) => out.push(*position),
            FormulaExpr::UnaryOp { operand, .. } => operand.collect_references(out),
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.collect_references(out);
                right.collect_references(out);
            }
        }
    }
}

/// Renders the expression in canonical form: no whitespace, uppercase
/// references, and only the parentheses needed to preserve the tree.
///
/// A child is parenthesized when it binds looser than its parent, or when
/// it is the right operand of subtraction or division at equal precedence.
/// Rendering and reparsing the result yields the same text.
impl fmt::Display for FormulaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaExpr::Number(number) => write!(f, "{number}"),
            FormulaExpr::CellRef(position) => write!(f, "{position}"),
            FormulaExpr::UnaryOp { op, operand } => {
                write!(f, "{}", op.symbol())?;
                if operand.precedence() < self.precedence() {
                    write!(f, "({operand})")
                } else {
                    write!(f, "{operand}")
                }
            }
            FormulaExpr::BinaryOp { op, left, right } => {
                if left.precedence() < op.precedence() {
                    write!(f, "({left})")?;
                } else {
                    write!(f, "{left}")?;
                }
                write!(f, "{}", op.symbol())?;
                let grouped = right.precedence() < op.precedence()
                    || (right.precedence() == op.precedence() && op.right_needs_parens());
                if grouped {
                    write!(f, "({right})")
                } else {
                    write!(f, "{right}")
                }
            }
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    /// The operator's source character
    pub fn symbol(&self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
        }
    }

    /// Binding strength; multiplication and division bind tighter
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => 1,
            BinaryOperator::Multiply | BinaryOperator::Divide => 2,
        }
    }

    /// True when a right operand of equal precedence must stay
    /// parenthesized; subtraction and division do not associate
    pub fn right_needs_parens(&self) -> bool {
        matches!(self, BinaryOperator::Subtract | BinaryOperator::Divide)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Unary plus; evaluates to its operand unchanged
    Plus,
    /// Numeric negation
    Negate,
}

impl UnaryOperator {
    /// The operator's source character
    pub fn symbol(&self) -> char {
        match self {
            UnaryOperator::Plus => '+',
            UnaryOperator::Negate => '-',
        }
    }
}
