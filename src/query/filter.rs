// Filter evaluation
// Decides, row by row, whether a WHERE clause holds

use super::ast::{ComparisonOperator, FilterCondition, FilterExpression, Operand};
use crate::error::{Clause, QueryError, Result};
use crate::storage::{Row, Scalar};
use std::cmp::Ordering;

impl FilterExpression {
    /// Evaluate the expression against one row
    ///
    /// AND stops at the first false operand and OR at the first true one;
    /// the right operand is not looked at in that case, so a column missing
    /// only on the right can't raise an error
    pub fn evaluate(&self, row: &Row) -> Result<bool> {
        match self {
            FilterExpression::Condition(condition) => condition.evaluate(row),
            FilterExpression::And(left, right) => {
                Ok(left.evaluate(row)? && right.evaluate(row)?)
            }
            FilterExpression::Or(left, right) => Ok(left.evaluate(row)? || right.evaluate(row)?),
        }
    }
}

impl FilterCondition {
    /// Evaluate a single `column op value` comparison against one row
    pub fn evaluate(&self, row: &Row) -> Result<bool> {
        let actual = row
            .get(&self.column)
            .ok_or_else(|| QueryError::MissingColumn {
                column: self.column.clone(),
                clause: Clause::Where,
            })?;

        let holds = match (&self.operand, self.op) {
            (Operand::List(values), ComparisonOperator::In) => self.contains(actual, values)?,
            (Operand::List(values), ComparisonOperator::NotIn) => !self.contains(actual, values)?,
            (Operand::Value(expected), ComparisonOperator::Eq) => {
                self.compare(actual, expected)? == Ordering::Equal
            }
            (Operand::Value(expected), ComparisonOperator::NotEq) => {
                self.compare(actual, expected)? != Ordering::Equal
            }
            (Operand::Value(expected), ComparisonOperator::Gt) => {
                self.compare(actual, expected)? == Ordering::Greater
            }
            (Operand::Value(expected), ComparisonOperator::GtEq) => {
                self.compare(actual, expected)? != Ordering::Less
            }
            (Operand::Value(expected), ComparisonOperator::Lt) => {
                self.compare(actual, expected)? == Ordering::Less
            }
            (Operand::Value(expected), ComparisonOperator::LtEq) => {
                self.compare(actual, expected)? != Ordering::Greater
            }
            // Only reachable for hand-built conditions, the parser never pairs these
            (operand, op) => {
                return Err(QueryError::TypeMismatch {
                    column: self.column.clone(),
                    left: op_shape(op),
                    right: match operand {
                        Operand::Value(_) => "single value",
                        Operand::List(_) => "value list",
                    },
                })
            }
        };

        tracing::trace!(condition = %self, holds, "evaluated condition");
        Ok(holds)
    }

    fn compare(&self, actual: &Scalar, expected: &Scalar) -> Result<Ordering> {
        actual
            .compare(expected)
            .ok_or_else(|| QueryError::TypeMismatch {
                column: self.column.clone(),
                left: actual.type_name(),
                right: expected.type_name(),
            })
    }

    /// Membership uses the same equality as `=`
    /// Every element is type-checked before any is matched, so a foreign-typed
    /// element fails the condition wherever it sits in the list
    fn contains(&self, actual: &Scalar, values: &[Scalar]) -> Result<bool> {
        let orderings = values
            .iter()
            .map(|value| self.compare(actual, value))
            .collect::<Result<Vec<_>>>()?;
        Ok(orderings.contains(&Ordering::Equal))
    }
}

fn op_shape(op: ComparisonOperator) -> &'static str {
    if op.takes_list() {
        "list operator"
    } else {
        "comparison operator"
    }
}
