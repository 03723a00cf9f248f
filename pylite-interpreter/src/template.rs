//! Template (f-string) rendering and the small arithmetic evaluator used for
//! `{...}` substitutions and as the fallback of `eval`.

use pylite_core::ast::BinaryOperator;
use pylite_core::lexer::escaped_char;
use pylite_core::parser::MAX_EXPRESSION_DEPTH;

use crate::environment::Environment;
use crate::evaluator::eval_binary_operation;
use crate::value::Value;

/// Renders raw template text. A substitution that cannot be resolved is kept
/// literally, braces included.
pub fn render(template: &str, environment: &Environment) -> String {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(escaped @ ('{' | '}')) => output.push(escaped),
                Some(other) => match escaped_char(other) {
                    Some(escaped) => output.push(escaped),
                    None => {
                        output.push('\\');
                        output.push(other);
                    }
                },
                None => output.push('\\'),
            },
            '{' => {
                let mut depth = 1;
                let mut inner = String::new();
                for next in chars.by_ref() {
                    match next {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    inner.push(next);
                }

                if depth > 0 {
                    // unmatched, the remainder is literal text
                    output.push('{');
                    output.push_str(&inner);
                    break;
                }

                match evaluate_fragment(&inner, environment) {
                    Some(value) => output.push_str(&value.to_string()),
                    None => {
                        tracing::trace!(fragment = %inner, "unresolved substitution");
                        output.push('{');
                        output.push_str(&inner);
                        output.push('}');
                    }
                }
            }
            ch => output.push(ch),
        }
    }

    output
}

pub(crate) fn is_number_span(text: &str) -> bool {
    text.chars().all(|ch| ch.is_ascii_digit() || ch == '.')
        && text.chars().any(|ch| ch.is_ascii_digit())
}

fn is_identifier_span(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|ch| ch.is_alphanumeric() || ch == '_')
}

/// Right-most occurrence of one of `operators`. Position 0 is never a split
/// point, so a leading sign stays with its operand.
fn rightmost_operator(
    text: &str,
    operators: &[(char, BinaryOperator)],
) -> Option<(usize, BinaryOperator)> {
    text.char_indices().rev().find_map(|(index, ch)| {
        if index == 0 {
            return None;
        }
        operators
            .iter()
            .find(|(symbol, _)| *symbol == ch)
            .map(|(_, operator)| (index, *operator))
    })
}

/// Evaluates numbers, identifiers and `+ - * / %` combinations of them.
/// Returns `None` when the text is outside that grammar, refers to an unbound
/// name, or fails to evaluate.
pub fn evaluate_fragment(text: &str, environment: &Environment) -> Option<Value> {
    evaluate_fragment_at(text, environment, 0)
}

fn evaluate_fragment_at(text: &str, environment: &Environment, depth: usize) -> Option<Value> {
    if depth > MAX_EXPRESSION_DEPTH {
        return None;
    }
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if is_number_span(text) {
        return text.parse().ok().map(Value::Number);
    }
    if is_identifier_span(text) {
        return environment.get(text).cloned();
    }

    let levels: [&[(char, BinaryOperator)]; 2] = [
        &[('+', BinaryOperator::Plus), ('-', BinaryOperator::Minus)],
        &[
            ('*', BinaryOperator::Multiply),
            ('/', BinaryOperator::Divide),
            ('%', BinaryOperator::Modulo),
        ],
    ];
    for operators in levels {
        if let Some((index, operator)) = rightmost_operator(text, operators) {
            let left = evaluate_fragment_at(&text[..index], environment, depth + 1)?;
            let right = evaluate_fragment_at(&text[index + 1..], environment, depth + 1)?;
            return eval_binary_operation(operator, left, right).ok();
        }
    }

    None
}
