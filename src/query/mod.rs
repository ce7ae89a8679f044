// Query module - handles SQL parsing and execution
pub mod ast;
pub mod executor;
pub mod filter;
pub mod parser;
pub mod tokenizer;

pub use ast::{
    ComparisonOperator, FilterCondition, FilterExpression, Operand, Projection, SelectStatement,
};
pub use executor::{execute_select, QueryExecutor, QueryResult};
pub use parser::QueryParser;
