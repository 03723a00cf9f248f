use std::path::{Path, PathBuf};

use pylite_core::parser::{self, ParseError};
use pylite_interpreter::{Console, EvaluationError, Interpreter, IoConsole};
use rustyline::error::ReadlineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("nothing executed, '{}' is empty", .0.display())]
    EmptySource(PathBuf),
    #[error("cannot start line editor: {0}")]
    Editor(#[from] ReadlineError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

pub fn report_syntax_errors(errors: &[ParseError]) {
    for error in errors {
        tracing::warn!(line = error.line(), "syntax error");
        eprintln!("SyntaxError: {}", error);
    }
}

/// Parses `source` and runs every statement that parsed. Syntax errors are
/// reported and skipped; the first runtime failure ends the run.
pub fn execute<C: Console + 'static>(
    source: &str,
    interpreter: &mut Interpreter<C>,
) -> Result<(), EvaluationError> {
    let (program, errors) = parser::parse(source);
    report_syntax_errors(&errors);
    tracing::debug!(
        statements = program.statements.len(),
        errors = errors.len(),
        "parsed script"
    );

    interpreter.run(&program)
}

pub fn execute_file(path: &Path) -> Result<(), RunError> {
    let source = std::fs::read_to_string(path).map_err(|source| RunError::Read {
        path: path.to_owned(),
        source,
    })?;
    if source.is_empty() {
        return Err(RunError::EmptySource(path.to_owned()));
    }

    let mut interpreter = Interpreter::new(IoConsole::stdio());
    execute(&source, &mut interpreter)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn run(source: &str) -> (Result<(), EvaluationError>, String) {
        let mut interpreter = Interpreter::new(IoConsole::new(Cursor::new(""), Vec::new()));
        let result = execute(source, &mut interpreter);
        let (_, output) = interpreter.into_console().into_parts();
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_malformed_statement_is_skipped() {
        let (result, output) = run("print('first')\nx = (1 +\nprint('second')\n");

        assert_eq!(result, Ok(()));
        assert_eq!(output, "first\nsecond\n");
    }

    #[test]
    fn test_runtime_error_stops_the_run() {
        let (result, output) = run("print(1)\nx = [1][3]\nprint(2)");

        assert_eq!(
            result,
            Err(EvaluationError::IndexOutOfRange {
                index: 3,
                length: 1
            })
        );
        assert_eq!(output, "1\n");
    }

    #[test]
    fn test_execute_file_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.py");
        assert!(matches!(
            execute_file(&missing),
            Err(RunError::Read { .. })
        ));

        let empty = dir.path().join("empty.py");
        std::fs::write(&empty, "").unwrap();
        let err = execute_file(&empty).unwrap_err();
        assert!(matches!(err, RunError::EmptySource(_)));
        assert!(err.to_string().starts_with("nothing executed"), "{err}");
    }
}
