//! Formula evaluation
//!
//! Walks a formula AST and reduces it to a number or a cell error.

use tally_sheets_core::{CellError, EvalResult, Position};

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};

/// Evaluate an expression, resolving cell references through `resolver`
///
/// Operands evaluate left to right and the first error wins. Division
/// yields `Div0` when the divisor is exactly zero.
pub fn evaluate(
    expr: &FormulaExpr,
    resolver: &mut dyn FnMut(Position) -> EvalResult,
) -> EvalResult {
    match expr {
        FormulaExpr::Number(number) => Ok(*number),

        FormulaExpr::CellRef(position) => resolver(*position),

        FormulaExpr::UnaryOp { op, operand } => {
            let value = evaluate(operand, resolver)?;
            match op {
                UnaryOperator::Plus => Ok(value),
                UnaryOperator::Negate => Ok(-value),
            }
        }

        FormulaExpr::BinaryOp { op, left, right } => {
            let lhs = evaluate(left, resolver)?;
            let rhs = evaluate(right, resolver)?;
            match op {
                BinaryOperator::Add => Ok(lhs + rhs),
                BinaryOperator::Subtract => Ok(lhs - rhs),
                BinaryOperator::Multiply => Ok(lhs * rhs),
                BinaryOperator::Divide => {
                    if rhs == 0.0 {
                        Err(CellError::Div0)
                    } else {
                        Ok(lhs / rhs)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;

    /// Evaluates with every reference resolving to `value`
    fn eval_with_constant(source: &str, value: f64) -> EvalResult {
        let expr = parse_expression(source).unwrap();
        evaluate(&expr, &mut |_| Ok(value))
    }

    #[test]
    fn test_evaluate_literal_arithmetic() {
        assert_eq!(eval_with_constant("2+3*4", 0.0), Ok(14.0));
        assert_eq!(eval_with_constant("(2+3)*4", 0.0), Ok(20.0));
        assert_eq!(eval_with_constant("10/4", 0.0), Ok(2.5));
        assert_eq!(eval_with_constant("1-2-3", 0.0), Ok(-4.0));
    }

    #[test]
    fn test_evaluate_unary_operators() {
        assert_eq!(eval_with_constant("-5", 0.0), Ok(-5.0));
        assert_eq!(eval_with_constant("--5", 0.0), Ok(5.0));
        assert_eq!(eval_with_constant("+7", 0.0), Ok(7.0));
        assert_eq!(eval_with_constant("2*-3", 0.0), Ok(-6.0));
        assert_eq!(eval_with_constant("-(2+3)", 0.0), Ok(-5.0));
    }

    #[test]
    fn test_evaluate_division_by_zero() {
        assert_eq!(eval_with_constant("1/0", 0.0), Err(CellError::Div0));
        assert_eq!(eval_with_constant("1/(2-2)", 0.0), Err(CellError::Div0));
        // A zero-valued reference divides the same way
        assert_eq!(eval_with_constant("1/B1", 0.0), Err(CellError::Div0));
        assert_eq!(eval_with_constant("0/5", 0.0), Ok(0.0));
    }

    #[test]
    fn test_evaluate_resolves_references() {
        let expr = parse_expression("A1*2+1").unwrap();
        let result = evaluate(&expr, &mut |position| {
            assert_eq!(position.to_string(), "A1");
            Ok(20.5)
        });
        assert_eq!(result, Ok(42.0));
    }

    #[test]
    fn test_evaluate_propagates_resolver_errors() {
        let expr = parse_expression("A1+1").unwrap();
        let result = evaluate(&expr, &mut |_| Err(CellError::Value));
        assert_eq!(result, Err(CellError::Value));

        let expr = parse_expression("-A1").unwrap();
        let result = evaluate(&expr, &mut |_| Err(CellError::Ref));
        assert_eq!(result, Err(CellError::Ref));
    }

    #[test]
    fn test_evaluate_first_error_wins() {
        let expr = parse_expression("B1+C1").unwrap();
        let mut resolved = Vec::new();
        let result = evaluate(&expr, &mut |position| {
            resolved.push(position);
            Err(CellError::Value)
        });
        assert_eq!(result, Err(CellError::Value));
        // C1 is never consulted once B1 has failed
        assert_eq!(resolved, vec![Position::parse("B1").unwrap()]);
    }

    #[test]
    fn test_evaluate_out_of_range_reference() {
        // A sheet-backed resolver turns invalid positions into Ref errors
        let expr = parse_expression("ZZZZZ1+1").unwrap();
        let result = evaluate(&expr, &mut |position| {
            if position.is_valid() {
                Ok(0.0)
            } else {
                Err(CellError::Ref)
            }
        });
        assert_eq!(result, Err(CellError::Ref));
    }
}
