use pylite_core::ast::Program;
use pylite_interpreter::{Console, EvaluationError, Interpreter};

pub trait Evaluator {
    type Object;

    fn evaluate(&mut self, program: Program) -> Self::Object;
}

pub struct InterpreterEvaluator<C: Console + 'static> {
    interpreter: Interpreter<C>,
}

impl<C: Console + 'static> InterpreterEvaluator<C> {
    pub fn new(console: C) -> Self {
        Self {
            interpreter: Interpreter::interactive(console),
        }
    }
}

impl<C: Console + 'static> Evaluator for InterpreterEvaluator<C> {
    type Object = Result<(), EvaluationError>;

    fn evaluate(&mut self, program: Program) -> Self::Object {
        self.interpreter.run(&program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pylite_core::parser::parse;
    use pylite_interpreter::IoConsole;
    use std::io::Cursor;

    #[test]
    fn test_state_survives_between_lines() {
        let mut evaluator = InterpreterEvaluator::new(IoConsole::new(Cursor::new(""), Vec::new()));

        for line in ["x = 2", "y = x * 3", "y"] {
            let (program, errors) = parse(line);
            assert!(errors.is_empty());
            evaluator.evaluate(program).unwrap();
        }
        let (program, _) = parse("len(5)");
        assert_eq!(
            evaluator.evaluate(program),
            Err(EvaluationError::NoLength("number"))
        );

        let (_, output) = evaluator.interpreter.into_console().into_parts();
        assert_eq!(String::from_utf8(output).unwrap(), "6\n");
    }
}
