// RustyQL - SELECT queries over an in-memory store
// This is the library root that exposes the public API

pub mod error;
pub mod query;
pub mod storage;

// Re-export commonly used types for convenience
pub use error::{Clause, QueryError, Result};
pub use query::{
    execute_select, ComparisonOperator, FilterCondition, FilterExpression, Operand, Projection,
    QueryExecutor, QueryParser, QueryResult, SelectStatement,
};
pub use storage::{Row, Scalar, Store, Table};
