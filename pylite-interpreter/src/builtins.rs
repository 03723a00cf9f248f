use crate::evaluator::Evaluator;
use crate::value::{EvaluationError, FileHandle, Value};

pub type BuiltinFn = fn(&mut Evaluator<'_>, Vec<Value>) -> Result<Value, EvaluationError>;

#[derive(Clone, Copy)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub func: BuiltinFn,
}

fn check_argument_count(
    function: &'static str,
    arguments: &[Value],
    min: usize,
    max: usize,
) -> Result<(), EvaluationError> {
    if (min..=max).contains(&arguments.len()) {
        return Ok(());
    }
    let expected = if min == max {
        min.to_string()
    } else {
        format!("{} or {}", min, max)
    };
    Err(EvaluationError::WrongArgumentCount {
        function,
        expected,
        actual: arguments.len(),
    })
}

fn builtin_print(evaluator: &mut Evaluator<'_>, args: Vec<Value>) -> Result<Value, EvaluationError> {
    let mut line = args
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    line.push('\n');
    evaluator.write(&line)?;
    Ok(Value::None)
}

fn builtin_input(evaluator: &mut Evaluator<'_>, args: Vec<Value>) -> Result<Value, EvaluationError> {
    check_argument_count("input", &args, 0, 1)?;
    let prompt = args.first().map(ToString::to_string).unwrap_or_default();
    let line = evaluator.read_line(&prompt)?;
    Ok(Value::String(line.unwrap_or_default()))
}

fn builtin_str(_: &mut Evaluator<'_>, args: Vec<Value>) -> Result<Value, EvaluationError> {
    check_argument_count("str", &args, 0, 1)?;
    Ok(Value::String(
        args.first().map(ToString::to_string).unwrap_or_default(),
    ))
}

fn builtin_repr(_: &mut Evaluator<'_>, args: Vec<Value>) -> Result<Value, EvaluationError> {
    check_argument_count("repr", &args, 1, 1)?;
    Ok(Value::String(args[0].repr()))
}

fn builtin_int(_: &mut Evaluator<'_>, args: Vec<Value>) -> Result<Value, EvaluationError> {
    check_argument_count("int", &args, 0, 1)?;
    let number = args.first().map_or(0.0, Value::to_number);
    Ok(Value::Number(number.trunc()))
}

fn builtin_float(_: &mut Evaluator<'_>, args: Vec<Value>) -> Result<Value, EvaluationError> {
    check_argument_count("float", &args, 0, 1)?;
    Ok(Value::Number(args.first().map_or(0.0, Value::to_number)))
}

fn builtin_bool(_: &mut Evaluator<'_>, args: Vec<Value>) -> Result<Value, EvaluationError> {
    check_argument_count("bool", &args, 0, 1)?;
    Ok(Value::Boolean(args.first().is_some_and(Value::to_boolean)))
}

fn builtin_len(_: &mut Evaluator<'_>, args: Vec<Value>) -> Result<Value, EvaluationError> {
    check_argument_count("len", &args, 1, 1)?;
    match &args[0] {
        Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
        Value::List(elements) => Ok(Value::Number(elements.len() as f64)),
        other => Err(EvaluationError::NoLength(other.type_name())),
    }
}

fn builtin_open(_: &mut Evaluator<'_>, args: Vec<Value>) -> Result<Value, EvaluationError> {
    check_argument_count("open", &args, 1, 2)?;
    let path = args[0].to_string();
    let mode = args
        .get(1)
        .map_or_else(|| "r".to_owned(), ToString::to_string);
    Ok(Value::File(FileHandle::new(path, mode)))
}

fn builtin_eval(evaluator: &mut Evaluator<'_>, args: Vec<Value>) -> Result<Value, EvaluationError> {
    check_argument_count("eval", &args, 1, 1)?;
    evaluator.eval_source(&args[0].to_string())
}

fn builtin_exec(evaluator: &mut Evaluator<'_>, args: Vec<Value>) -> Result<Value, EvaluationError> {
    check_argument_count("exec", &args, 1, 1)?;
    evaluator.exec_source(&args[0].to_string())?;
    Ok(Value::None)
}

pub const BUILTIN_NAMES: [&str; 11] = [
    "print", "input", "str", "repr", "int", "float", "bool", "len", "open", "eval", "exec",
];

pub(crate) fn map_builtins(name: &str) -> Option<BuiltinFunction> {
    let (name, func): (&'static str, BuiltinFn) = match name {
        "print" => ("print", builtin_print),
        "input" => ("input", builtin_input),
        "str" => ("str", builtin_str),
        "repr" => ("repr", builtin_repr),
        "int" => ("int", builtin_int),
        "float" => ("float", builtin_float),
        "bool" => ("bool", builtin_bool),
        "len" => ("len", builtin_len),
        "open" => ("open", builtin_open),
        "eval" => ("eval", builtin_eval),
        "exec" => ("exec", builtin_exec),
        _ => return None,
    };
    Some(BuiltinFunction { name, func })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::IoConsole;
    use crate::environment::Environment;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn call(name: &str, args: Vec<Value>) -> Result<Value, EvaluationError> {
        let mut environment = Environment::new();
        let mut console = IoConsole::new(Cursor::new(""), Vec::new());
        let mut evaluator = Evaluator::new(&mut environment, &mut console, false);
        let builtin = map_builtins(name).unwrap();
        (builtin.func)(&mut evaluator, args)
    }

    fn string(s: &str) -> Value {
        Value::String(s.to_owned())
    }

    #[test]
    fn test_every_name_is_mapped() {
        for name in BUILTIN_NAMES {
            assert_eq!(map_builtins(name).map(|builtin| builtin.name), Some(name));
        }
        assert!(map_builtins("first").is_none());
    }

    #[test]
    fn test_len() {
        let no_arguments = call("len", vec![]);
        assert_eq!(
            no_arguments,
            Err(EvaluationError::WrongArgumentCount {
                function: "len",
                expected: "1".to_owned(),
                actual: 0,
            })
        );
        assert_eq!(
            no_arguments.unwrap_err().to_string(),
            "len() takes 1 argument(s) but 0 were given"
        );

        assert_eq!(call("len", vec![string("héllo")]), Ok(Value::Number(5.0)));
        assert_eq!(
            call("len", vec![Value::List(vec![Value::None, Value::None])]),
            Ok(Value::Number(2.0))
        );
        assert_eq!(
            call("len", vec![Value::Number(42.0)]),
            Err(EvaluationError::NoLength("number"))
        );
    }

    #[test]
    fn test_conversions() {
        let tests = vec![
            ("str", vec![Value::Number(5.0)], string("5")),
            ("str", vec![], string("")),
            ("repr", vec![string("a")], string("'a'")),
            ("int", vec![string("3.9")], Value::Number(3.0)),
            ("int", vec![Value::Number(-3.9)], Value::Number(-3.0)),
            ("int", vec![], Value::Number(0.0)),
            ("float", vec![string("2.5kg")], Value::Number(2.5)),
            ("float", vec![string("abc")], Value::Number(0.0)),
            ("bool", vec![string("")], Value::Boolean(false)),
            ("bool", vec![Value::Number(3.0)], Value::Boolean(true)),
            ("bool", vec![], Value::Boolean(false)),
        ];

        for (name, args, expected) in tests {
            assert_eq!(call(name, args), Ok(expected), "{name}");
        }
    }

    #[test]
    fn test_open_does_no_io() {
        let handle = call("open", vec![string("/nonexistent/dir/file.txt")]).unwrap();
        assert_eq!(
            handle,
            Value::File(FileHandle {
                path: "/nonexistent/dir/file.txt".to_owned(),
                mode: "r".to_owned(),
                binary: false,
                open: true,
            })
        );

        let Value::File(handle) = call("open", vec![string("x"), string("ab")]).unwrap() else {
            panic!("expected a file handle");
        };
        assert!(handle.binary);
        assert_eq!(handle.mode, "ab");
    }

    #[test]
    fn test_open_argument_count() {
        assert_eq!(
            call("open", vec![]).unwrap_err().to_string(),
            "open() takes 1 or 2 argument(s) but 0 were given"
        );
    }
}
