// Query Executor
// This module runs parsed SELECT statements against a caller-supplied store

use super::ast::{Projection, SelectStatement};
use super::parser::QueryParser;
use crate::error::{Clause, QueryError, Result};
use crate::storage::{Row, Store};

/// Executes SELECT statements against a store
/// The executor only borrows the store, it never modifies tables or rows
pub struct QueryExecutor<'a> {
    store: &'a Store,
}

impl<'a> QueryExecutor<'a> {
    /// Create an executor over a store
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Parse and execute a SQL string in one go
    pub fn query(&self, sql: &str) -> Result<QueryResult> {
        let statement = QueryParser::parse(sql)?;
        self.execute(&statement)
    }

    /// Execute a statement and return the projected rows
    ///
    /// Rows come back in table order. The first error aborts the whole query,
    /// there are no partial results.
    pub fn execute(&self, statement: &SelectStatement) -> Result<QueryResult> {
        let table = self
            .store
            .table(&statement.table)
            .ok_or_else(|| QueryError::UnknownTable(statement.table.clone()))?;

        let mut rows = Vec::new();
        for row in table {
            let matched = match &statement.filter {
                Some(filter) => filter.evaluate(row)?,
                // Missing WHERE clause => no filtering
                None => true,
            };
            if matched {
                rows.push(project(row, &statement.columns)?);
            }
        }

        tracing::debug!(
            table = %statement.table,
            scanned = table.len(),
            matched = rows.len(),
            "select executed"
        );

        Ok(QueryResult { rows })
    }
}

/// Build the output row for a matched row
/// `*` copies every field in its original order. An explicit list is looked up
/// in the order requested; a column asked for twice only shows up once.
fn project(row: &Row, columns: &Projection) -> Result<Row> {
    match columns {
        Projection::Wildcard => Ok(row.clone()),
        Projection::Columns(names) => {
            let mut projected = Row::new();
            for name in names {
                let value = row.get(name).ok_or_else(|| QueryError::MissingColumn {
                    column: name.clone(),
                    clause: Clause::Select,
                })?;
                projected.insert(name.as_str(), value.clone());
            }
            Ok(projected)
        }
    }
}

/// Parse `sql` and run it against `store`
pub fn execute_select(store: &Store, sql: &str) -> Result<Vec<Row>> {
    QueryExecutor::new(store).query(sql).map(|result| result.rows)
}

/// The rows returned by a SELECT
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Column names across all rows, in order of first appearance
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for row in &self.rows {
            for column in row.columns() {
                if !names.iter().any(|name| name == column) {
                    names.push(column.to_string());
                }
            }
        }
        names
    }

    /// Render the rows as a JSON array of objects
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.rows)
    }

    /// Format the result as a string for display
    /// This creates a box-drawn table; a field a row doesn't have is left blank
    pub fn format(&self) -> String {
        if self.rows.is_empty() {
            return "No rows found".to_string();
        }

        let column_names = self.column_names();
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                column_names
                    .iter()
                    .map(|name| row.get(name).map(|v| v.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();

        // Calculate column widths
        let mut widths: Vec<usize> = column_names.iter().map(|c| c.chars().count()).collect();
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut result = String::new();

        result.push_str(&border(&widths, '┌', '┬', '┐'));
        result.push_str(&line(&column_names, &widths));
        result.push_str(&border(&widths, '├', '┼', '┤'));
        for row in &cells {
            result.push_str(&line(row, &widths));
        }
        result.push_str(&border(&widths, '└', '┴', '┘'));

        result.push_str(&format!("\n{} row(s) returned", self.rows.len()));

        result
    }
}

fn border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{}{}{}\n", left, segments.join(&middle.to_string()), right)
}

fn line(cells: &[String], widths: &[usize]) -> String {
    let mut result = String::from("│");
    for (cell, width) in cells.iter().zip(widths) {
        result.push_str(&format!(" {:<width$} │", cell, width = width));
    }
    result.push('\n');
    result
}
