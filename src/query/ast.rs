// Parsed representation of a SELECT statement
// Built fresh by the parser for each query and consumed by the executor

use crate::storage::Scalar;
use std::fmt;

/// What the SELECT list asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `SELECT *`
    Wildcard,
    /// `SELECT a, b, a` - order and duplicates kept as written
    Columns(Vec<String>),
}

/// Comparison operators allowed in a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
    In,
    NotIn,
}

impl ComparisonOperator {
    /// IN and NOT IN take a parenthesized list instead of a single value
    pub fn takes_list(self) -> bool {
        matches!(self, ComparisonOperator::In | ComparisonOperator::NotIn)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::NotEq => "!=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::GtEq => ">=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::LtEq => "<=",
            ComparisonOperator::In => "IN",
            ComparisonOperator::NotIn => "NOT IN",
        };
        write!(f, "{}", symbol)
    }
}

/// Right-hand side of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Scalar),
    /// Non-empty; only valid with IN / NOT IN
    List(Vec<Scalar>),
}

/// A single leaf comparison: `column op value`
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub column: String,
    pub op: ComparisonOperator,
    pub operand: Operand,
}

/// The WHERE clause as a binary tree
/// AND binds tighter than OR; chains at one level nest to the left,
/// so `a AND b AND c` is `And(And(a, b), c)`
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    Condition(FilterCondition),
    And(Box<FilterExpression>, Box<FilterExpression>),
    Or(Box<FilterExpression>, Box<FilterExpression>),
}

impl FilterExpression {
    pub fn and(left: FilterExpression, right: FilterExpression) -> Self {
        FilterExpression::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: FilterExpression, right: FilterExpression) -> Self {
        FilterExpression::Or(Box::new(left), Box::new(right))
    }
}

impl From<FilterCondition> for FilterExpression {
    fn from(condition: FilterCondition) -> Self {
        FilterExpression::Condition(condition)
    }
}

/// A parsed `SELECT <columns> FROM <table> [WHERE <filter>]`
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub columns: Projection,
    pub table: String,
    pub filter: Option<FilterExpression>,
}

// --- Rendering back to SQL ---
// Identifiers are always backticked and strings single-quoted (double-quoted
// if they contain a single quote), so a parsed statement renders to text that
// parses back to the same statement. Strings holding both quote characters
// can't be written without escapes and only come from hand-built statements;
// their rendering does not parse.

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Scalar) -> fmt::Result {
    match value {
        Scalar::Text(s) if s.contains('\'') => write!(f, "\"{}\"", s),
        Scalar::Text(s) => write!(f, "'{}'", s),
        other => write!(f, "{}", other),
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` {} ", self.column, self.op)?;
        match &self.operand {
            Operand::Value(value) => write_literal(f, value),
            Operand::List(values) => {
                write!(f, "(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_literal(f, value)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpression::Condition(condition) => write!(f, "{}", condition),
            FilterExpression::And(left, right) => write!(f, "{} AND {}", left, right),
            FilterExpression::Or(left, right) => write!(f, "{} OR {}", left, right),
        }
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        match &self.columns {
            Projection::Wildcard => write!(f, "*")?,
            Projection::Columns(columns) => {
                let list: Vec<String> = columns.iter().map(|c| format!("`{}`", c)).collect();
                write!(f, "{}", list.join(", "))?;
            }
        }
        write!(f, " FROM `{}`", self.table)?;
        if let Some(filter) = &self.filter {
            write!(f, " WHERE {}", filter)?;
        }
        Ok(())
    }
}
