use super::error::ParseError;
use crate::ast::{BinaryOperator, Expression, Identifier, LiteralKind};
use crate::lexer::{Token, TokenKind};
use crate::parser::Parser;

#[derive(PartialOrd, PartialEq, Debug)]
pub enum Precedence {
    Lowest = 0,
    Comparison,
    Sum,
    Product,
    Prefix,
    Call,
}

pub fn precedence_of(token: &TokenKind) -> Precedence {
    match token {
        TokenKind::Equal => Precedence::Comparison,
        TokenKind::NotEqual => Precedence::Comparison,
        TokenKind::LessThan => Precedence::Comparison,
        TokenKind::GreaterThan => Precedence::Comparison,
        TokenKind::Plus => Precedence::Sum,
        TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk => Precedence::Product,
        TokenKind::Slash => Precedence::Product,
        TokenKind::Percent => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Call,
        TokenKind::Dot => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

pub fn parse_expression(
    parser: &mut Parser,
    precedence: Precedence,
) -> Result<Expression, ParseError> {
    parser.nested(1, |parser| {
        let token = parser.next_token();
        let mut left_expression = prefix_parsing(token, parser)?;

        // every infix step wraps the left side one level deeper
        let mut chained = 0;
        loop {
            let next_precedence = precedence_of(&parser.peek_kind());
            if precedence >= next_precedence {
                break;
            }

            let next_token = parser.next_token();
            let Some(infix_parse_function) = infix_parsing_function(next_token.kind) else {
                break;
            };
            chained += 1;
            left_expression =
                parser.nested(chained, |parser| infix_parse_function(left_expression, parser))?;
        }

        Ok(left_expression)
    })
}

fn parse_grouped_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expression = parse_expression(parser, Precedence::Lowest)?;
    parser.expect_token(TokenKind::RParen)?;

    Ok(expression)
}

pub(crate) fn parse_sequence<T>(
    parser: &mut Parser,
    parse_element: impl Fn(&mut Parser) -> Result<T, ParseError>,
    separator: TokenKind,
    terminator: TokenKind,
) -> Result<Vec<T>, ParseError> {
    let mut elements = Vec::new();

    loop {
        match parser.peek_kind() {
            kind if kind == terminator => {
                parser.next_token();
                return Ok(elements);
            }
            TokenKind::Eof => {
                let got = parser.next_token();
                return Err(ParseError::unexpected_token(terminator, got));
            }
            _ => {
                elements.push(parse_element(parser)?);
            }
        }

        let next = parser.next_token();
        match next.kind {
            kind if kind == separator => continue,
            kind if kind == terminator => return Ok(elements),
            _ => return Err(ParseError::unexpected_token(separator, next)),
        }
    }
}

pub(crate) fn parse_arguments(parser: &mut Parser) -> Result<Vec<Expression>, ParseError> {
    parse_sequence(
        parser,
        |parser| parse_expression(parser, Precedence::Lowest),
        TokenKind::Comma,
        TokenKind::RParen,
    )
}

fn parse_list_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expressions = parse_sequence(
        parser,
        |parser| parse_expression(parser, Precedence::Lowest),
        TokenKind::Comma,
        TokenKind::RBracket,
    )?;
    Ok(Expression::List(expressions))
}

fn parse_number_literal(token: Token) -> Result<Expression, ParseError> {
    if token.text.parse::<f64>().is_err() {
        return Err(ParseError::InvalidLiteral(token));
    }
    Ok(Expression::Literal(LiteralKind::Number, token.text))
}

pub fn prefix_parsing(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    match token.kind {
        TokenKind::Ident => Ok(Expression::Identifier(Identifier { name: token.text })),
        // `print(...)` used inside an expression is an ordinary builtin call.
        TokenKind::Print => Ok(Expression::Identifier(Identifier { name: token.text })),
        TokenKind::Number => parse_number_literal(token),
        TokenKind::String => Ok(Expression::Literal(LiteralKind::String, token.text)),
        TokenKind::Template => Ok(Expression::Template(token.text)),
        TokenKind::True | TokenKind::False => {
            Ok(Expression::Literal(LiteralKind::Boolean, token.text))
        }
        TokenKind::None => Ok(Expression::Literal(LiteralKind::None, token.text)),
        TokenKind::Minus => Ok(Expression::Negate(Box::new(parse_expression(
            parser,
            Precedence::Prefix,
        )?))),
        TokenKind::LParen => parse_grouped_expression(parser),
        TokenKind::LBracket => parse_list_literal(parser),
        _ => Err(ParseError::NoPrefixFunction(token)),
    }
}

type InfixFunction = Box<dyn FnOnce(Expression, &mut Parser) -> Result<Expression, ParseError>>;

fn infix_operation(token: TokenKind, operator: BinaryOperator) -> InfixFunction {
    Box::new(
        move |left: Expression, parser: &mut Parser| -> Result<Expression, ParseError> {
            let new_precedence = precedence_of(&token);

            Ok(Expression::Binary(
                operator,
                Box::new(left),
                Box::new(parse_expression(parser, new_precedence)?),
            ))
        },
    )
}

fn parse_call_expression(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let arguments = parse_arguments(parser)?;

    Ok(Expression::Call {
        callee: Box::new(left),
        arguments,
    })
}

fn parse_index_expression(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let index = parse_expression(parser, Precedence::Lowest)?;
    parser.expect_token(TokenKind::RBracket)?;

    Ok(Expression::Index {
        collection: Box::new(left),
        index: Box::new(index),
    })
}

fn parse_method_call(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let method = parser.parse_ident()?;
    parser.expect_token(TokenKind::LParen)?;
    let arguments = parse_arguments(parser)?;

    Ok(Expression::MethodCall {
        receiver: Box::new(left),
        method,
        arguments,
    })
}

pub fn infix_parsing_function(token: TokenKind) -> Option<InfixFunction> {
    use crate::ast::BinaryOperator as Op;

    match token {
        TokenKind::Plus => Some(infix_operation(TokenKind::Plus, Op::Plus)),
        TokenKind::Minus => Some(infix_operation(TokenKind::Minus, Op::Minus)),
        TokenKind::Asterisk => Some(infix_operation(TokenKind::Asterisk, Op::Multiply)),
        TokenKind::Slash => Some(infix_operation(TokenKind::Slash, Op::Divide)),
        TokenKind::Percent => Some(infix_operation(TokenKind::Percent, Op::Modulo)),
        TokenKind::LessThan => Some(infix_operation(TokenKind::LessThan, Op::LessThan)),
        TokenKind::GreaterThan => Some(infix_operation(TokenKind::GreaterThan, Op::GreaterThan)),
        TokenKind::Equal => Some(infix_operation(TokenKind::Equal, Op::Equal)),
        TokenKind::NotEqual => Some(infix_operation(TokenKind::NotEqual, Op::NotEqual)),
        TokenKind::LParen => Some(Box::new(parse_call_expression)),
        TokenKind::LBracket => Some(Box::new(parse_index_expression)),
        TokenKind::Dot => Some(Box::new(parse_method_call)),
        _ => None,
    }
}
