use std::fmt::Display;

use thiserror::Error;

use crate::lexer::{Token, TokenKind};

#[derive(Debug, PartialEq, Clone, Error)]
pub enum ParseError {
    #[error("expected {expected}, found {} at line {}", .got.kind.describe(), .got.line)]
    UnexpectedToken { expected: Expected, got: Token },
    #[error("expected expression, found {} at line {}", .0.kind.describe(), .0.line)]
    NoPrefixFunction(Token),
    #[error("invalid number literal '{}' at line {}", .0.text, .0.line)]
    InvalidLiteral(Token),
    #[error("cannot assign to expression at line {line}")]
    InvalidAssignmentTarget { line: usize },
    #[error("'{}' statements are not supported at line {}", .0.text, .0.line)]
    UnsupportedKeyword(Token),
    #[error("expression nested deeper than {limit} levels at line {line}")]
    NestingTooDeep { line: usize, limit: usize },
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expected {
    Token(TokenKind),
    Identifier,
    EndOfStatement,
    EndOfInput,
}

impl Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{}", kind.describe()),
            Expected::Identifier => write!(f, "identifier"),
            Expected::EndOfStatement => write!(f, "end of statement"),
            Expected::EndOfInput => write!(f, "end of input"),
        }
    }
}

impl ParseError {
    pub fn unexpected_token(expected: TokenKind, got: Token) -> ParseError {
        ParseError::UnexpectedToken {
            expected: Expected::Token(expected),
            got,
        }
    }

    pub fn unexpected_other(expected: Expected, got: Token) -> ParseError {
        ParseError::UnexpectedToken { expected, got }
    }

    /// Source line the error was detected on.
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { got, .. } => got.line,
            ParseError::NoPrefixFunction(token)
            | ParseError::InvalidLiteral(token)
            | ParseError::UnsupportedKeyword(token) => token.line,
            ParseError::InvalidAssignmentTarget { line }
            | ParseError::NestingTooDeep { line, .. } => *line,
        }
    }
}
