// SQL Parser
// Recursive descent over the token list produced by the tokenizer.
//
// Grammar (keywords are case-insensitive):
//
//   statement  := SELECT projection FROM ident [WHERE or_expr] [;]
//   projection := '*' | ident (',' ident)*
//   or_expr    := and_expr (OR and_expr)*
//   and_expr   := condition (AND condition)*
//   condition  := ident cmp_op scalar
//               | ident [NOT] IN '(' scalar (',' scalar)* ')'
//
// There is no grouping with parentheses at the boolean level.

use super::ast::{
    ComparisonOperator, FilterCondition, FilterExpression, Operand, Projection, SelectStatement,
};
use super::tokenizer::{Token, TokenKind, Tokenizer};
use crate::error::{QueryError, Result};
use crate::storage::Scalar;

/// The query parser
/// Stateless: keywords are fixed literals matched case-insensitively and every
/// call to `parse` builds its own tokenizer and cursor, so it can be used from
/// any number of threads at once
pub struct QueryParser;

impl QueryParser {
    /// Parse a SQL string into a SelectStatement
    /// This is the main entry point for parsing SQL
    pub fn parse(sql: &str) -> Result<SelectStatement> {
        let tokens = Tokenizer::new(sql).tokenize()?;
        let statement = Cursor::new(&tokens).parse_statement()?;
        tracing::trace!(%statement, "parsed select statement");
        Ok(statement)
    }
}

/// Position in the token list for a single parse
struct Cursor<'t> {
    tokens: &'t [Token],
    position: usize,
}

impl<'t> Cursor<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    fn parse_statement(&mut self) -> Result<SelectStatement> {
        self.expect_keyword("SELECT")?;
        let columns = self.parse_projection()?;
        self.expect_keyword("FROM")?;
        let table = self.expect_identifier("table name")?;

        let filter = if self.current().is_keyword("WHERE") {
            self.advance();
            Some(self.parse_or()?)
        } else {
            None
        };

        // The semicolon is optional, anything else after the statement is an error
        if matches!(self.current().kind, TokenKind::Semicolon) {
            self.advance();
        }
        if !matches!(self.current().kind, TokenKind::Eof) {
            return Err(self.unexpected("end of statement"));
        }

        Ok(SelectStatement {
            columns,
            table,
            filter,
        })
    }

    // --- Helpers ---

    fn current(&self) -> &'t Token {
        let tokens = self.tokens;
        &tokens[self.position]
    }

    fn peek(&self) -> &'t Token {
        let tokens = self.tokens;
        &tokens[(self.position + 1).min(tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn unexpected(&self, expected: &str) -> QueryError {
        let token = self.current();
        QueryError::syntax(
            token.offset,
            format!("expected {}, found {}", expected, token.describe()),
        )
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.current().is_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<()> {
        if self.current().kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String> {
        match &self.current().kind {
            TokenKind::Ident { name, .. } => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    // --- Clauses ---

    fn parse_projection(&mut self) -> Result<Projection> {
        if matches!(self.current().kind, TokenKind::Star) {
            self.advance();
            return Ok(Projection::Wildcard);
        }

        let mut columns = vec![self.expect_identifier("'*' or column name")?];
        while matches!(self.current().kind, TokenKind::Comma) {
            self.advance();
            columns.push(self.expect_identifier("column name")?);
        }
        Ok(Projection::Columns(columns))
    }

    /// OR level: folds to the left, `a OR b OR c` => `Or(Or(a, b), c)`
    fn parse_or(&mut self) -> Result<FilterExpression> {
        let mut expr = self.parse_and()?;
        while self.current().is_keyword("OR") {
            self.advance();
            let right = self.parse_and()?;
            expr = FilterExpression::or(expr, right);
        }
        Ok(expr)
    }

    /// AND level: binds tighter than OR and also folds to the left
    fn parse_and(&mut self) -> Result<FilterExpression> {
        let mut expr = FilterExpression::Condition(self.parse_condition()?);
        while self.current().is_keyword("AND") {
            self.advance();
            let right = self.parse_condition()?;
            expr = FilterExpression::and(expr, FilterExpression::Condition(right));
        }
        Ok(expr)
    }

    fn parse_condition(&mut self) -> Result<FilterCondition> {
        let column = self.expect_identifier("column name")?;
        let op = self.parse_operator()?;

        let operand = if op.takes_list() {
            Operand::List(self.parse_scalar_list()?)
        } else {
            Operand::Value(self.parse_scalar()?)
        };

        Ok(FilterCondition {
            column,
            op,
            operand,
        })
    }

    fn parse_operator(&mut self) -> Result<ComparisonOperator> {
        let token = self.current();
        let op = match &token.kind {
            TokenKind::Eq => ComparisonOperator::Eq,
            TokenKind::NotEq => ComparisonOperator::NotEq,
            TokenKind::Gt => ComparisonOperator::Gt,
            TokenKind::GtEq => ComparisonOperator::GtEq,
            TokenKind::Lt => ComparisonOperator::Lt,
            TokenKind::LtEq => ComparisonOperator::LtEq,
            _ if token.is_keyword("IN") => ComparisonOperator::In,
            _ if token.is_keyword("NOT") && self.peek().is_keyword("IN") => {
                self.advance();
                ComparisonOperator::NotIn
            }
            _ => return Err(self.unexpected("comparison operator")),
        };
        self.advance();
        Ok(op)
    }

    fn parse_scalar(&mut self) -> Result<Scalar> {
        let value = match &self.current().kind {
            TokenKind::Integer(i) => Scalar::Integer(*i),
            TokenKind::Real(r) => Scalar::Real(*r),
            TokenKind::Text(s) => Scalar::Text(s.clone()),
            _ => return Err(self.unexpected("number or quoted string")),
        };
        self.advance();
        Ok(value)
    }

    /// `( scalar [, scalar]* )`, at least one element
    fn parse_scalar_list(&mut self) -> Result<Vec<Scalar>> {
        self.expect(TokenKind::LeftParen, "'('")?;
        let mut values = vec![self.parse_scalar()?];
        while matches!(self.current().kind, TokenKind::Comma) {
            self.advance();
            values.push(self.parse_scalar()?);
        }
        self.expect(TokenKind::RightParen, "',' or ')'")?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(column: &str, op: ComparisonOperator, value: impl Into<Scalar>) -> FilterExpression {
        FilterExpression::Condition(FilterCondition {
            column: column.to_string(),
            op,
            operand: Operand::Value(value.into()),
        })
    }

    fn syntax_position(sql: &str) -> usize {
        match QueryParser::parse(sql) {
            Err(QueryError::Syntax { position, .. }) => position,
            other => panic!("expected syntax error for {:?}, got {:?}", sql, other),
        }
    }

    #[test]
    fn test_parse_select_star() {
        let stmt = QueryParser::parse("SELECT * FROM records").unwrap();
        assert_eq!(stmt.columns, Projection::Wildcard);
        assert_eq!(stmt.table, "records");
        assert!(stmt.filter.is_none());
    }

    #[test]
    fn test_parse_column_list_keeps_order_and_duplicates() {
        let stmt = QueryParser::parse("SELECT name, `id`, name FROM `records`;").unwrap();
        assert_eq!(
            stmt.columns,
            Projection::Columns(vec!["name".into(), "id".into(), "name".into()])
        );
        assert_eq!(stmt.table, "records");
    }

    #[test]
    fn test_parse_where_with_or() {
        let stmt =
            QueryParser::parse("SELECT * FROM records WHERE value > 30 OR name = 'Name2'").unwrap();
        assert_eq!(
            stmt.filter,
            Some(FilterExpression::or(
                cond("value", ComparisonOperator::Gt, 30),
                cond("name", ComparisonOperator::Eq, "Name2"),
            ))
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let stmt = QueryParser::parse("SELECT * FROM t WHERE a = 1 OR b = 2 AND c = 3").unwrap();
        assert_eq!(
            stmt.filter,
            Some(FilterExpression::or(
                cond("a", ComparisonOperator::Eq, 1),
                FilterExpression::and(
                    cond("b", ComparisonOperator::Eq, 2),
                    cond("c", ComparisonOperator::Eq, 3),
                ),
            ))
        );

        let stmt = QueryParser::parse("SELECT * FROM t WHERE a = 1 AND b = 2 OR c = 3").unwrap();
        assert_eq!(
            stmt.filter,
            Some(FilterExpression::or(
                FilterExpression::and(
                    cond("a", ComparisonOperator::Eq, 1),
                    cond("b", ComparisonOperator::Eq, 2),
                ),
                cond("c", ComparisonOperator::Eq, 3),
            ))
        );
    }

    #[test]
    fn test_chains_fold_left() {
        let stmt = QueryParser::parse("SELECT * FROM t WHERE a = 1 AND b = 2 AND c = 3").unwrap();
        assert_eq!(
            stmt.filter,
            Some(FilterExpression::and(
                FilterExpression::and(
                    cond("a", ComparisonOperator::Eq, 1),
                    cond("b", ComparisonOperator::Eq, 2),
                ),
                cond("c", ComparisonOperator::Eq, 3),
            ))
        );

        let stmt = QueryParser::parse("SELECT * FROM t WHERE a = 1 OR b = 2 OR c = 3").unwrap();
        assert_eq!(
            stmt.filter,
            Some(FilterExpression::or(
                FilterExpression::or(
                    cond("a", ComparisonOperator::Eq, 1),
                    cond("b", ComparisonOperator::Eq, 2),
                ),
                cond("c", ComparisonOperator::Eq, 3),
            ))
        );
    }

    #[test]
    fn test_all_comparison_operators() {
        let cases = [
            ("=", ComparisonOperator::Eq),
            ("!=", ComparisonOperator::NotEq),
            ("<>", ComparisonOperator::NotEq),
            (">", ComparisonOperator::Gt),
            (">=", ComparisonOperator::GtEq),
            ("<", ComparisonOperator::Lt),
            ("<=", ComparisonOperator::LtEq),
        ];
        for (symbol, op) in cases {
            let stmt = QueryParser::parse(&format!("SELECT * FROM t WHERE v {} 1", symbol)).unwrap();
            assert_eq!(stmt.filter, Some(cond("v", op, 1)), "operator {}", symbol);
        }
    }

    #[test]
    fn test_in_and_not_in_lists() {
        let stmt = QueryParser::parse("SELECT * FROM t WHERE id in (3, 1, 'x', 2.5)").unwrap();
        assert_eq!(
            stmt.filter,
            Some(FilterExpression::Condition(FilterCondition {
                column: "id".into(),
                op: ComparisonOperator::In,
                operand: Operand::List(vec![
                    Scalar::Integer(3),
                    Scalar::Integer(1),
                    Scalar::from("x"),
                    Scalar::Real(2.5),
                ]),
            }))
        );

        let stmt = QueryParser::parse("SELECT * FROM t WHERE id Not   In (7)").unwrap();
        assert_eq!(
            stmt.filter,
            Some(FilterExpression::Condition(FilterCondition {
                column: "id".into(),
                op: ComparisonOperator::NotIn,
                operand: Operand::List(vec![Scalar::Integer(7)]),
            }))
        );
    }

    #[test]
    fn test_numeric_literals() {
        let stmt = QueryParser::parse("SELECT * FROM t WHERE a = 10 AND b = 10.5 AND c = -5").unwrap();
        assert_eq!(
            stmt.filter,
            Some(FilterExpression::and(
                FilterExpression::and(
                    cond("a", ComparisonOperator::Eq, 10),
                    cond("b", ComparisonOperator::Eq, 10.5),
                ),
                cond("c", ComparisonOperator::Eq, -5),
            ))
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let lower = QueryParser::parse("select * from T where V > 30 or n = 'x'").unwrap();
        let upper = QueryParser::parse("SELECT * FROM T WHERE V > 30 OR n = 'x'").unwrap();
        let mixed = QueryParser::parse("SeLeCt * FrOm T wHeRe V > 30 Or n = 'x'").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower, mixed);

        // Names and strings stay case-sensitive
        assert_eq!(lower.table, "T");
        assert_eq!(lower.filter, Some(FilterExpression::or(
            cond("V", ComparisonOperator::Gt, 30),
            cond("n", ComparisonOperator::Eq, "x"),
        )));
        let other = QueryParser::parse("select * from t where v > 30 or n = 'X'").unwrap();
        assert_ne!(lower, other);
    }

    #[test]
    fn test_keywords_are_contextual() {
        let stmt = QueryParser::parse("SELECT from, `where` FROM select").unwrap();
        assert_eq!(
            stmt.columns,
            Projection::Columns(vec!["from".into(), "where".into()])
        );
        assert_eq!(stmt.table, "select");
    }

    #[test]
    fn test_syntax_errors_report_position() {
        assert_eq!(syntax_position("UPDATE t"), 0);
        assert_eq!(syntax_position("SELECT * records"), 9);
        assert_eq!(syntax_position("SELECT * FROM"), 13);
        assert_eq!(syntax_position("SELECT a, FROM t"), 15);
        assert_eq!(syntax_position("SELECT * FROM t WHERE"), 21);
        assert_eq!(syntax_position("SELECT * FROM t WHERE a LIKE 'x'"), 24);
        assert_eq!(syntax_position("SELECT * FROM t WHERE a IN ()"), 28);
        assert_eq!(syntax_position("SELECT * FROM t WHERE a IN 1"), 27);
        assert_eq!(syntax_position("SELECT * FROM t WHERE a = b"), 26);
        assert_eq!(syntax_position("SELECT * FROM t extra"), 16);
        assert_eq!(syntax_position("SELECT * FROM t; SELECT * FROM u"), 17);
    }

    #[test]
    fn test_parenthesized_groups_are_rejected() {
        assert_eq!(
            syntax_position("SELECT * FROM t WHERE (a = 1 OR b = 2) AND c = 3"),
            22
        );
        assert_eq!(syntax_position("SELECT * FROM t WHERE NOT a = 1"), 26);
    }

    #[test]
    fn test_display_round_trips() {
        let sql = "select id, name from records where value >= 10.0 and name != \"it's\" \
                   or id not in (1, -2) and value < 3";
        let stmt = QueryParser::parse(sql).unwrap();
        let rendered = stmt.to_string();
        assert_eq!(QueryParser::parse(&rendered).unwrap(), stmt);
    }

    #[test]
    fn test_display_of_text_with_both_quotes_does_not_parse() {
        // Only a hand-built statement can hold such a string
        let stmt = SelectStatement {
            columns: Projection::Wildcard,
            table: "t".to_string(),
            filter: Some(cond("name", ComparisonOperator::Eq, r#"it's "quoted""#)),
        };
        let rendered = stmt.to_string();
        assert_eq!(rendered, r#"SELECT * FROM `t` WHERE `name` = "it's "quoted"""#);
        assert!(matches!(
            QueryParser::parse(&rendered),
            Err(QueryError::Syntax { .. })
        ));
    }
}
