use crate::ast::{AssignStatement, Expression, Statement, WithStatement};
use crate::lexer::TokenKind;
use crate::parser::error::Expected;
use crate::parser::expressions::{parse_arguments, parse_expression, Precedence};
use crate::parser::{ParseError, Parser};

pub fn parse_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    match parser.peek_kind() {
        TokenKind::Print => parse_print_statement(parser),
        TokenKind::With => Ok(Statement::With(parse_with_statement(parser)?)),
        TokenKind::If
        | TokenKind::Else
        | TokenKind::Elif
        | TokenKind::For
        | TokenKind::While
        | TokenKind::Def
        | TokenKind::Return => Err(ParseError::UnsupportedKeyword(parser.next_token())),
        _ => parse_expression_or_assignment(parser),
    }
}

fn parse_print_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    parser.expect_token(TokenKind::Print)?;
    parser.expect_token(TokenKind::LParen)?;
    let expressions = parse_arguments(parser)?;

    Ok(Statement::Print(expressions))
}

fn parse_expression_or_assignment(parser: &mut Parser) -> Result<Statement, ParseError> {
    let expression = parse_expression(parser, Precedence::Lowest)?;
    if parser.peek_kind() != TokenKind::Assign {
        return Ok(Statement::Expression(expression));
    }

    let assign = parser.next_token();
    let Expression::Identifier(identifier) = expression else {
        return Err(ParseError::InvalidAssignmentTarget { line: assign.line });
    };
    let value = parse_expression(parser, Precedence::Lowest)?;

    Ok(Statement::Assign(AssignStatement { identifier, value }))
}

/// `with expr [as name]:` followed by the statements on the rest of the line,
/// or on the next line when the colon ends its line.
fn parse_with_statement(parser: &mut Parser) -> Result<WithStatement, ParseError> {
    parser.expect_token(TokenKind::With)?;
    let context = parse_expression(parser, Precedence::Lowest)?;
    let binding = if parser.next_if_kind(TokenKind::As) {
        Some(parser.parse_ident()?)
    } else {
        None
    };
    parser.expect_token(TokenKind::Colon)?;
    parser.next_if_kind(TokenKind::Newline);

    let mut body = Vec::new();
    loop {
        match parser.peek_kind() {
            TokenKind::Newline | TokenKind::Eof => break,
            _ => body.push(parse_statement(parser)?),
        }
        match parser.peek_kind() {
            TokenKind::SemiColon => {
                parser.next_token();
            }
            TokenKind::Newline | TokenKind::Eof => break,
            _ => {
                let got = parser.next_token();
                return Err(ParseError::unexpected_other(Expected::EndOfStatement, got));
            }
        }
    }

    Ok(WithStatement {
        context,
        binding,
        body,
    })
}
