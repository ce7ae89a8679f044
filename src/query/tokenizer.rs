// SQL Tokenizer
// Turns query text into a flat list of tokens, each tagged with its byte offset
// so the parser can point at the exact spot of a syntax error

use crate::error::{QueryError, Result};

/// The kinds of token the SELECT grammar is built from
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A bare word (`value`, `SELECT`) or a backtick-delimited name.
    /// Keywords are recognized by the parser, and only in unquoted words.
    Ident { name: String, quoted: bool },
    /// Integer literal, sign included
    Integer(i64),
    /// Real literal, sign included (`10.5`, `-0.25`)
    Real(f64),
    /// Single- or double-quoted string with the quotes stripped
    Text(String),
    Eq,
    /// `!=` or `<>`
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
    Star,
    Comma,
    LeftParen,
    RightParen,
    Semicolon,
    Eof,
}

/// A token and where it starts in the query text
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

impl Token {
    /// True if this is the given keyword (case-insensitive, unquoted only)
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident { name, quoted: false } if name.eq_ignore_ascii_case(keyword))
    }

    /// Short human readable description, used in error messages
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Ident { name, quoted: true } => format!("`{}`", name),
            TokenKind::Ident { name, .. } => format!("'{}'", name),
            TokenKind::Integer(i) => format!("number {}", i),
            TokenKind::Real(r) => format!("number {}", r),
            TokenKind::Text(s) => format!("string '{}'", s),
            TokenKind::Eq => "'='".to_string(),
            TokenKind::NotEq => "'!='".to_string(),
            TokenKind::Gt => "'>'".to_string(),
            TokenKind::GtEq => "'>='".to_string(),
            TokenKind::Lt => "'<'".to_string(),
            TokenKind::LtEq => "'<='".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::LeftParen => "'('".to_string(),
            TokenKind::RightParen => "')'".to_string(),
            TokenKind::Semicolon => "';'".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

/// Splits a query string into tokens
/// Holds nothing but the input and a cursor, so every query gets a fresh one
pub struct Tokenizer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            position: 0,
        }
    }

    /// Tokenize the whole input; the last token is always `Eof`
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            let offset = self.position;
            let kind = self.next_token()?;
            tokens.push(Token { kind, offset });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            offset: self.input.len(),
        });
        tracing::trace!(count = tokens.len(), "tokenized query");
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<TokenKind> {
        let start = self.position;
        let ch = self.current();

        match ch {
            b'*' => self.single(TokenKind::Star),
            b',' => self.single(TokenKind::Comma),
            b'(' => self.single(TokenKind::LeftParen),
            b')' => self.single(TokenKind::RightParen),
            b';' => self.single(TokenKind::Semicolon),
            b'=' => self.single(TokenKind::Eq),
            // Two-character operators are tried before their one-character prefixes
            b'>' if self.peek() == Some(b'=') => self.double(TokenKind::GtEq),
            b'>' => self.single(TokenKind::Gt),
            b'<' if self.peek() == Some(b'=') => self.double(TokenKind::LtEq),
            b'<' if self.peek() == Some(b'>') => self.double(TokenKind::NotEq),
            b'<' => self.single(TokenKind::Lt),
            b'!' if self.peek() == Some(b'=') => self.double(TokenKind::NotEq),
            b'+' | b'-' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            b'0'..=b'9' => self.read_number(),
            b'\'' | b'"' => self.read_string(ch),
            b'`' => self.read_quoted_identifier(),
            c if c.is_ascii_alphabetic() || c == b'_' => Ok(self.read_identifier()),
            _ => {
                let found = self.input[start..].chars().next().unwrap_or_default();
                Err(QueryError::syntax(
                    start,
                    format!("unexpected character {:?}", found),
                ))
            }
        }
    }

    // --- Navigation helpers ---

    fn current(&self) -> u8 {
        self.bytes[self.position]
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position + 1).copied()
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.bytes.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current().is_ascii_whitespace() {
            self.position += 1;
        }
    }

    fn single(&mut self, kind: TokenKind) -> Result<TokenKind> {
        self.position += 1;
        Ok(kind)
    }

    fn double(&mut self, kind: TokenKind) -> Result<TokenKind> {
        self.position += 2;
        Ok(kind)
    }

    fn consume_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.position;
        while !self.is_at_end() && pred(self.current()) {
            self.position += 1;
        }
        &self.input[start..self.position]
    }

    // --- Literal readers ---

    /// `[A-Za-z_][A-Za-z0-9_$]*`
    fn read_identifier(&mut self) -> TokenKind {
        let name = self.consume_while(is_identifier_char);
        TokenKind::Ident {
            name: name.to_string(),
            quoted: false,
        }
    }

    /// A bare identifier wrapped in backticks; the backticks are dropped
    fn read_quoted_identifier(&mut self) -> Result<TokenKind> {
        let start = self.position;
        self.position += 1;

        if self.is_at_end() || !(self.current().is_ascii_alphabetic() || self.current() == b'_') {
            return Err(QueryError::syntax(
                self.position,
                "expected identifier after '`'",
            ));
        }
        let name = self.consume_while(is_identifier_char).to_string();

        if self.is_at_end() || self.current() != b'`' {
            return Err(QueryError::syntax(start, "unterminated quoted identifier"));
        }
        self.position += 1;

        Ok(TokenKind::Ident { name, quoted: true })
    }

    /// Optional sign, digits, then an optional `.digits` fraction
    fn read_number(&mut self) -> Result<TokenKind> {
        let start = self.position;
        if matches!(self.current(), b'+' | b'-') {
            self.position += 1;
        }
        self.consume_while(|c| c.is_ascii_digit());

        let mut is_real = false;
        if !self.is_at_end() && self.current() == b'.' {
            self.position += 1;
            if self.consume_while(|c| c.is_ascii_digit()).is_empty() {
                return Err(QueryError::syntax(
                    self.position,
                    "expected digits after decimal point",
                ));
            }
            is_real = true;
        }

        // `10abc` is not a number followed by an identifier
        if !self.is_at_end() && (self.current().is_ascii_alphabetic() || self.current() == b'_') {
            return Err(QueryError::syntax(self.position, "invalid numeric literal"));
        }

        let text = &self.input[start..self.position];
        if is_real {
            text.parse::<f64>()
                .map(TokenKind::Real)
                .map_err(|e| QueryError::syntax(start, format!("invalid real '{}': {}", text, e)))
        } else {
            text.parse::<i64>()
                .map(TokenKind::Integer)
                .map_err(|e| QueryError::syntax(start, format!("invalid integer '{}': {}", text, e)))
        }
    }

    /// Everything up to the matching quote, taken verbatim
    fn read_string(&mut self, quote: u8) -> Result<TokenKind> {
        let start = self.position;
        self.position += 1;
        let content = self.consume_while(|c| c != quote);

        if self.is_at_end() {
            return Err(QueryError::syntax(start, "unterminated string literal"));
        }
        self.position += 1;

        Ok(TokenKind::Text(content.to_string()))
    }
}

fn is_identifier_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
}
