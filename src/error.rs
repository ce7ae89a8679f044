// Error types
// Every failure aborts the query being evaluated and is handed back to the caller

use std::fmt;
use thiserror::Error;

/// Result type used throughout the query engine
pub type Result<T> = std::result::Result<T, QueryError>;

/// The clause of a SELECT statement an error was raised from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Select,
    Where,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Select => write!(f, "SELECT"),
            Clause::Where => write!(f, "WHERE"),
        }
    }
}

/// Everything that can go wrong while parsing or evaluating a query
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The query text does not conform to the grammar.
    /// `position` is a byte offset into the query text.
    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// The table named in FROM is not in the store
    #[error("Table '{0}' not found")]
    UnknownTable(String),

    /// A row has no field with the referenced name
    #[error("Column '{column}' not found (referenced in {clause} clause)")]
    MissingColumn { column: String, clause: Clause },

    /// Two scalars of incompatible types were compared
    #[error("Type mismatch on column '{column}': cannot compare {left} with {right}")]
    TypeMismatch {
        column: String,
        left: &'static str,
        right: &'static str,
    },
}

impl QueryError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        QueryError::Syntax {
            position,
            message: message.into(),
        }
    }
}
