use std::fmt::Display;
use std::rc::Rc;

use thiserror::Error;

#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    None,
    List(Vec<Value>),
    File(FileHandle),
}

/// Metadata of an opened file. No OS handle is held: every read or write
/// opens and closes `path` on its own, so copying a handle copies only this
/// record.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FileHandle {
    pub path: String,
    pub mode: String,
    pub binary: bool,
    pub open: bool,
}

impl FileHandle {
    pub fn new(path: String, mode: String) -> Self {
        let binary = mode.contains('b');
        FileHandle {
            path,
            mode,
            binary,
            open: true,
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "str",
            Value::Boolean(_) => "bool",
            Value::None => "NoneType",
            Value::List(_) => "list",
            Value::File(_) => "file",
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(value) => *value,
            Value::String(value) => parse_number_prefix(value),
            Value::Boolean(value) => f64::from(u8::from(*value)),
            Value::None | Value::List(_) | Value::File(_) => 0.0,
        }
    }

    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Number(value) => *value != 0.0,
            Value::String(value) => !value.is_empty(),
            Value::Boolean(value) => *value,
            Value::None => false,
            Value::List(elements) => !elements.is_empty(),
            Value::File(_) => true,
        }
    }

    /// Source-like rendering used by `repr`: strings are quoted.
    pub fn repr(&self) -> String {
        match self {
            Value::String(value) => quote(value),
            Value::List(elements) => {
                let parts = elements.iter().map(Value::repr).collect::<Vec<_>>();
                format!("[{}]", parts.join(", "))
            }
            other => other.to_string(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(value) => write!(f, "{}", format_number(*value)),
            Value::String(value) => write!(f, "{}", value),
            Value::Boolean(true) => write!(f, "True"),
            Value::Boolean(false) => write!(f, "False"),
            Value::None => write!(f, "None"),
            Value::List(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Value::File(handle) => {
                let state = if handle.open { "" } else { "closed " };
                write!(f, "<{}file '{}' mode '{}'>", state, handle.path, handle.mode)
            }
        }
    }
}

/// Integral values print without a fractional part, so `5.0` prints as `5`.
/// Everything else uses six significant digits, like C's `%g`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "nan".to_owned()
    } else if value == f64::INFINITY {
        "inf".to_owned()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_owned()
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{}", value as i64)
    } else {
        format_significant(value)
    }
}

const SIGNIFICANT_DIGITS: i32 = 6;

fn format_significant(value: f64) -> String {
    // the exponent is taken after rounding, so 999999.5 becomes 1e+06
    let scientific = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent = exponent.parse::<i32>().unwrap_or(0);

    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_owned()
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// Parses the longest numeric prefix of `text` (after leading whitespace),
/// yielding 0 when there is none.
pub fn parse_number_prefix(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    let mut digits = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return 0.0;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_digits_start = exponent_end;
        while exponent_end < bytes.len() && bytes[exponent_end].is_ascii_digit() {
            exponent_end += 1;
        }
        if exponent_end > exponent_digits_start {
            end = exponent_end;
        }
    }

    text[..end].parse().unwrap_or(0.0)
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        match ch {
            '\'' => quoted.push_str("\\'"),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            ch => quoted.push(ch),
        }
    }
    quoted.push('\'');
    quoted
}

#[derive(Debug, PartialEq, Error)]
pub enum EvaluationError {
    #[error("undefined function '{0}'")]
    UndefinedFunction(Rc<str>),
    #[error("name '{0}' is not defined")]
    UndefinedName(Rc<str>),
    #[error("'{0}' is not callable")]
    NotCallable(String),
    #[error("{function}() takes {expected} argument(s) but {actual} were given")]
    WrongArgumentCount {
        function: &'static str,
        expected: String,
        actual: usize,
    },
    #[error("list index out of range: {index} (length {length})")]
    IndexOutOfRange { index: i64, length: usize },
    #[error("list indices must be integers, not {0}")]
    InvalidIndex(String),
    #[error("'{0}' object is not subscriptable")]
    IndexNotSupported(&'static str),
    #[error("object of type '{0}' has no len()")]
    NoLength(&'static str),
    #[error("'{type_name}' object has no method '{method}'")]
    UnknownMethod {
        type_name: &'static str,
        method: String,
    },
    #[error("I/O operation on closed file '{0}'")]
    ClosedFile(String),
    #[error("cannot access '{path}': {message}")]
    Io { path: String, message: String },
    #[error("cannot read input: {0}")]
    Input(String),
    #[error("cannot write output: {0}")]
    Output(String),
    #[error("exec error: {0}")]
    Exec(String),
    #[error("with statement failed: {0}")]
    With(Box<EvaluationError>),
    #[error("eval/exec nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_number_rendering() {
        let tests = vec![
            (5.0, "5"),
            (-3.0, "-3"),
            (2.5, "2.5"),
            (0.1 + 0.2, "0.3"),
            (1.0 / 3.0, "0.333333"),
            (-2.0 / 3.0, "-0.666667"),
            (1234567.5, "1.23457e+06"),
            (999999.5, "1e+06"),
            (123456.75, "123457"),
            (0.0001, "0.0001"),
            (0.000015, "1.5e-05"),
            (1e20, "1e+20"),
            (f64::INFINITY, "inf"),
            (f64::NEG_INFINITY, "-inf"),
            (f64::NAN, "nan"),
        ];

        for (value, expected) in tests {
            assert_eq!(Value::Number(value).to_string(), expected, "{value:?}");
        }
    }

    #[test]
    fn test_to_string() {
        let list = Value::List(vec![
            Value::Number(1.0),
            Value::String("a".to_owned()),
            Value::List(vec![Value::Boolean(true), Value::None]),
        ]);

        assert_eq!(list.to_string(), "[1, a, [True, None]]");
        assert_eq!(list.repr(), "[1, 'a', [True, None]]");
        assert_eq!(
            Value::File(FileHandle::new("f.txt".to_owned(), "w".to_owned())).to_string(),
            "<file 'f.txt' mode 'w'>"
        );
    }

    #[test]
    fn test_to_number() {
        let tests = vec![
            ("42", 42.0),
            ("  3.5abc", 3.5),
            ("-2", -2.0),
            ("1e3", 1000.0),
            ("7e", 7.0),
            ("abc", 0.0),
            ("", 0.0),
            (".", 0.0),
        ];

        for (text, expected) in tests {
            assert_eq!(Value::String(text.to_owned()).to_number(), expected, "{text:?}");
        }
        assert_eq!(Value::Boolean(true).to_number(), 1.0);
        assert_eq!(Value::None.to_number(), 0.0);
    }

    #[test]
    fn test_to_boolean() {
        assert!(Value::Number(2.0).to_boolean());
        assert!(!Value::Number(0.0).to_boolean());
        assert!(!Value::String(String::new()).to_boolean());
        assert!(Value::String("x".to_owned()).to_boolean());
        assert!(!Value::None.to_boolean());
        assert!(!Value::List(vec![]).to_boolean());
    }

    #[test]
    fn test_repr_escapes_quotes() {
        assert_eq!(Value::String("it's\n".to_owned()).repr(), "'it\\'s\\n'");
    }

    #[test]
    fn test_binary_mode_is_detected() {
        assert!(FileHandle::new("a".to_owned(), "rb".to_owned()).binary);
        assert!(!FileHandle::new("a".to_owned(), "r".to_owned()).binary);
    }
}
