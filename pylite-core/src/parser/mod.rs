pub mod error;
pub mod expressions;
pub mod statements;

use crate::ast::{Expression, Identifier, Program};
use crate::lexer::{Token, TokenKind, Tokenizer};
pub use error::ParseError;
use expressions::{parse_expression, Precedence};
use statements::parse_statement;

/// Deepest expression tree the parser builds. Evaluation recurses over the
/// tree, so this also bounds the evaluator's stack use.
pub const MAX_EXPRESSION_DEPTH: usize = 256;

pub struct Parser<'a> {
    pub iter: std::iter::Peekable<Tokenizer<'a>>,
    previous: TokenKind,
    depth: usize,
}

fn end_of_input() -> Token {
    Token {
        kind: TokenKind::Eof,
        text: "".into(),
        line: 0,
        col: 0,
    }
}

impl<'a> Parser<'a> {
    pub fn new(tokenizer: Tokenizer<'a>) -> Self {
        let iter = tokenizer.peekable();
        Self {
            iter,
            previous: TokenKind::Newline,
            depth: 0,
        }
    }

    /// Runs `parse` one expression level deeper, failing once the tree
    /// would exceed [`MAX_EXPRESSION_DEPTH`].
    pub(crate) fn nested<T>(
        &mut self,
        levels: usize,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth + levels > MAX_EXPRESSION_DEPTH {
            let line = self.iter.peek().map_or(0, |token| token.line);
            return Err(ParseError::NestingTooDeep {
                line,
                limit: MAX_EXPRESSION_DEPTH,
            });
        }
        self.depth += levels;
        let result = parse(self);
        self.depth -= levels;
        result
    }

    pub(crate) fn peek_kind(&mut self) -> TokenKind {
        self.iter.peek().map_or(TokenKind::Eof, |token| token.kind)
    }

    /// Consumes the next token. The trailing `Eof` is never consumed, so
    /// asking past the end keeps returning it.
    pub(crate) fn next_token(&mut self) -> Token {
        let token = match self.iter.next_if(|token| token.kind != TokenKind::Eof) {
            Some(token) => token,
            None => self.iter.peek().cloned().unwrap_or_else(end_of_input),
        };
        self.previous = token.kind;
        token
    }

    pub(crate) fn next_if_kind(&mut self, kind: TokenKind) -> bool {
        self.iter.next_if(|token| token.kind == kind).is_some()
    }

    pub(crate) fn parse_ident(&mut self) -> Result<Identifier, ParseError> {
        let token = self.next_token();
        match token.kind {
            TokenKind::Ident => Ok(Identifier {
                name: token.text.clone(),
            }),
            _ => Err(ParseError::unexpected_other(
                error::Expected::Identifier,
                token,
            )),
        }
    }

    pub(crate) fn expect_token(&mut self, token_kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.next_token();
        if token.kind == token_kind {
            Ok(token)
        } else {
            Err(ParseError::unexpected_token(token_kind, token))
        }
    }

    /// Skips the rest of a broken statement, up to and including its newline.
    fn synchronize(&mut self) {
        if self.previous == TokenKind::Newline {
            return;
        }
        loop {
            match self.next_token().kind {
                TokenKind::Newline | TokenKind::Eof => return,
                _ => {}
            }
        }
    }

    /// Parses every statement it can. A statement that fails to parse is
    /// reported and skipped; parsing resumes on the next line.
    pub fn parse_program(&mut self) -> (Program, Vec<ParseError>) {
        let mut statements = Vec::new();
        let mut errors = Vec::new();

        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Newline | TokenKind::SemiColon => {
                    self.next_token();
                    continue;
                }
                _ => {}
            }

            match parse_statement(self) {
                Ok(statement) => match self.peek_kind() {
                    TokenKind::Newline | TokenKind::SemiColon | TokenKind::Eof => {
                        statements.push(statement);
                    }
                    _ => {
                        let got = self.next_token();
                        errors.push(ParseError::unexpected_other(
                            error::Expected::EndOfStatement,
                            got,
                        ));
                        self.synchronize();
                    }
                },
                Err(err) => {
                    tracing::debug!(%err, "skipping statement");
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        (Program { statements }, errors)
    }

    /// Like [`Parser::parse_program`], but any error fails the whole parse.
    pub fn parse_program_strict(&mut self) -> Result<Program, Vec<ParseError>> {
        let (program, errors) = self.parse_program();
        if errors.is_empty() {
            Ok(program)
        } else {
            Err(errors)
        }
    }

    /// Parses input consisting of exactly one expression, optionally
    /// surrounded by blank lines.
    pub fn parse_single_expression(&mut self) -> Result<Expression, ParseError> {
        while self.next_if_kind(TokenKind::Newline) {}
        let expression = parse_expression(self, Precedence::Lowest)?;
        while self.next_if_kind(TokenKind::Newline) {}

        let token = self.next_token();
        match token.kind {
            TokenKind::Eof => Ok(expression),
            _ => Err(ParseError::unexpected_other(
                error::Expected::EndOfInput,
                token,
            )),
        }
    }
}

/// Scans and parses `input` with error recovery.
pub fn parse(input: &str) -> (Program, Vec<ParseError>) {
    Parser::new(Tokenizer::new(input)).parse_program()
}
