use std::cmp::Ordering;

use pylite_core::ast::{
    BinaryOperator, Expression, Identifier, LiteralKind, Program, Statement, WithStatement,
};
use pylite_core::lexer::Tokenizer;
use pylite_core::parser::Parser;

use crate::builtins::map_builtins;
use crate::console::Console;
use crate::environment::Environment;
use crate::files;
use crate::template;
use crate::value::{EvaluationError, FileHandle, Value};

/// How deep `eval`/`exec` may re-enter the evaluator.
pub const MAX_NESTING: usize = 64;

/// A session: one global environment plus the console it reads and writes.
pub struct Interpreter<C: Console + 'static> {
    environment: Environment,
    console: C,
    interactive: bool,
}

impl<C: Console + 'static> Interpreter<C> {
    /// Batch mode: expression statement results are discarded.
    pub fn new(console: C) -> Self {
        Interpreter {
            environment: Environment::new(),
            console,
            interactive: false,
        }
    }

    /// Interactive mode: non-None expression statement results are echoed.
    pub fn interactive(console: C) -> Self {
        Interpreter {
            interactive: true,
            ..Interpreter::new(console)
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn into_console(self) -> C {
        self.console
    }

    fn evaluator(&mut self) -> Evaluator<'_> {
        Evaluator::new(&mut self.environment, &mut self.console, self.interactive)
    }

    /// Runs every statement in order, stopping at the first failure.
    pub fn run(&mut self, program: &Program) -> Result<(), EvaluationError> {
        self.evaluator().eval_program(program)
    }

    pub fn evaluate(&mut self, expression: &Expression) -> Result<Value, EvaluationError> {
        self.evaluator().eval_expression(expression)
    }
}

/// Walks the syntax tree against borrowed session state. `eval` and `exec`
/// run on a nested evaluator that reborrows the same environment and console.
pub struct Evaluator<'a> {
    environment: &'a mut Environment,
    console: &'a mut (dyn Console + 'static),
    interactive: bool,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        environment: &'a mut Environment,
        console: &'a mut (dyn Console + 'static),
        interactive: bool,
    ) -> Self {
        Evaluator {
            environment,
            console,
            interactive,
            depth: 0,
        }
    }

    fn nested(&mut self) -> Result<Evaluator<'_>, EvaluationError> {
        if self.depth >= MAX_NESTING {
            return Err(EvaluationError::NestingTooDeep(MAX_NESTING));
        }
        tracing::debug!(depth = self.depth + 1, "entering nested evaluation");

        Ok(Evaluator {
            environment: &mut *self.environment,
            console: &mut *self.console,
            interactive: false,
            depth: self.depth + 1,
        })
    }

    pub(crate) fn write(&mut self, text: &str) -> Result<(), EvaluationError> {
        self.console
            .write(text)
            .map_err(|err| EvaluationError::Output(err.to_string()))
    }

    pub(crate) fn read_line(&mut self, prompt: &str) -> Result<Option<String>, EvaluationError> {
        self.console
            .read_line(prompt)
            .map_err(|err| EvaluationError::Input(err.to_string()))
    }

    pub fn eval_program(&mut self, program: &Program) -> Result<(), EvaluationError> {
        self.eval_statements(&program.statements)
    }

    fn eval_statements(&mut self, statements: &[Statement]) -> Result<(), EvaluationError> {
        for statement in statements {
            self.eval_statement(statement)?;
        }
        Ok(())
    }

    pub fn eval_statement(&mut self, statement: &Statement) -> Result<(), EvaluationError> {
        tracing::trace!(%statement, "executing");

        match statement {
            Statement::Print(expressions) => {
                let mut line = String::new();
                for value in self.eval_expressions(expressions)? {
                    line.push_str(&value.to_string());
                }
                line.push('\n');
                self.write(&line)
            }
            Statement::Assign(statement) => {
                let value = self.eval_expression(&statement.value)?;
                self.environment
                    .set(statement.identifier.name.clone(), value);
                Ok(())
            }
            Statement::Expression(expression) => {
                let value = self.eval_expression(expression)?;
                if self.interactive && value != Value::None {
                    self.write(&format!("{}\n", value))?;
                }
                Ok(())
            }
            Statement::With(statement) => self.eval_with_statement(statement),
        }
    }

    fn eval_with_statement(&mut self, statement: &WithStatement) -> Result<(), EvaluationError> {
        let context = self
            .eval_expression(&statement.context)
            .map_err(|err| EvaluationError::With(Box::new(err)))?;

        if let Some(binding) = &statement.binding {
            self.environment.set(binding.name.clone(), context);
        }
        let result = self.eval_statements(&statement.body);
        if let Some(binding) = &statement.binding {
            self.environment.remove(&binding.name);
        }

        result.map_err(|err| EvaluationError::With(Box::new(err)))
    }

    fn eval_expressions(&mut self, expressions: &[Expression]) -> Result<Vec<Value>, EvaluationError> {
        expressions
            .iter()
            .map(|expression| self.eval_expression(expression))
            .collect()
    }

    pub fn eval_expression(&mut self, expression: &Expression) -> Result<Value, EvaluationError> {
        match expression {
            Expression::Literal(kind, text) => Ok(eval_literal(*kind, text)),
            Expression::Template(raw) => Ok(Value::String(template::render(raw, self.environment))),
            Expression::Identifier(identifier) => Ok(self
                .environment
                .get(&identifier.name)
                .cloned()
                .unwrap_or(Value::None)),
            Expression::Negate(operand) => {
                let operand = self.eval_expression(operand)?;
                Ok(Value::Number(-operand.to_number()))
            }
            Expression::Binary(operator, left, right) => {
                let left = self.eval_expression(left)?;
                let right = self.eval_expression(right)?;
                eval_binary_operation(*operator, left, right)
            }
            Expression::Call { callee, arguments } => self.eval_call(callee, arguments),
            Expression::MethodCall {
                receiver,
                method,
                arguments,
            } => self.eval_method_call(receiver, method, arguments),
            Expression::List(elements) => Ok(Value::List(self.eval_expressions(elements)?)),
            Expression::Index { collection, index } => {
                let collection = self.eval_expression(collection)?;
                let index = self.eval_expression(index)?;
                eval_index(collection, index)
            }
        }
    }

    fn eval_call(
        &mut self,
        callee: &Expression,
        arguments: &[Expression],
    ) -> Result<Value, EvaluationError> {
        let Expression::Identifier(identifier) = callee else {
            return Err(EvaluationError::NotCallable(callee.to_string()));
        };

        // `fh("write", data)`: a file binding called with the method name first
        if let Some(Value::File(handle)) = self.environment.get(&identifier.name) {
            let handle = handle.clone();
            let mut arguments = self.eval_expressions(arguments)?;
            let method = match arguments.first() {
                Some(Value::String(method)) => method.clone(),
                _ => return Err(EvaluationError::NotCallable(identifier.name.to_string())),
            };
            arguments.remove(0);
            return self.call_file_method(Some(identifier), handle, &method, arguments);
        }

        let Some(builtin) = map_builtins(&identifier.name) else {
            return Err(EvaluationError::UndefinedFunction(identifier.name.clone()));
        };
        let arguments = self.eval_expressions(arguments)?;
        (builtin.func)(self, arguments)
    }

    fn eval_method_call(
        &mut self,
        receiver: &Expression,
        method: &Identifier,
        arguments: &[Expression],
    ) -> Result<Value, EvaluationError> {
        let binding = match receiver {
            Expression::Identifier(identifier) => {
                if self.environment.get(&identifier.name).is_none() {
                    return Err(EvaluationError::UndefinedName(identifier.name.clone()));
                }
                Some(identifier)
            }
            _ => None,
        };

        let target = self.eval_expression(receiver)?;
        let arguments = self.eval_expressions(arguments)?;
        match target {
            Value::File(handle) => self.call_file_method(binding, handle, &method.name, arguments),
            other => Err(EvaluationError::UnknownMethod {
                type_name: other.type_name(),
                method: method.name.to_string(),
            }),
        }
    }

    /// `read`, `write` and `close` on a file handle. `close` marks the handle
    /// bound to `binding` as closed.
    fn call_file_method(
        &mut self,
        binding: Option<&Identifier>,
        handle: FileHandle,
        method: &str,
        arguments: Vec<Value>,
    ) -> Result<Value, EvaluationError> {
        let expect_arguments = |function: &'static str, count: usize| {
            if arguments.len() == count {
                Ok(())
            } else {
                Err(EvaluationError::WrongArgumentCount {
                    function,
                    expected: count.to_string(),
                    actual: arguments.len(),
                })
            }
        };

        match method {
            "read" => {
                expect_arguments("read", 0)?;
                Ok(Value::String(files::read(&handle)?))
            }
            "write" => {
                expect_arguments("write", 1)?;
                let written = files::write(&handle, &arguments[0].to_string())?;
                Ok(Value::Number(written as f64))
            }
            "close" => {
                expect_arguments("close", 0)?;
                if let Some(identifier) = binding {
                    if let Some(Value::File(bound)) = self.environment.get_mut(&identifier.name) {
                        bound.open = false;
                    }
                }
                Ok(Value::None)
            }
            other => Err(EvaluationError::UnknownMethod {
                type_name: "file",
                method: other.to_owned(),
            }),
        }
    }

    /// `eval(source)`. Text the parser or the evaluator rejects goes through
    /// the template fragment evaluator; if that fails too the result is the
    /// text in braces.
    pub(crate) fn eval_source(&mut self, source: &str) -> Result<Value, EvaluationError> {
        let trimmed = source.trim();
        if template::is_number_span(trimmed) {
            if let Ok(number) = trimmed.parse() {
                return Ok(Value::Number(number));
            }
        }

        let failure = match Parser::new(Tokenizer::new(source)).parse_single_expression() {
            Ok(expression) => match self.nested()?.eval_expression(&expression) {
                Ok(value) => return Ok(value),
                Err(err @ EvaluationError::NestingTooDeep(_)) => return Err(err),
                Err(err) => err.to_string(),
            },
            Err(err) => err.to_string(),
        };
        tracing::debug!(%failure, "eval falling back to fragment evaluation");

        Ok(template::evaluate_fragment(trimmed, self.environment)
            .unwrap_or_else(|| Value::String(format!("{{{}}}", trimmed))))
    }

    /// `exec(source)`. The source must parse cleanly; its statements then run
    /// against the shared environment.
    pub(crate) fn exec_source(&mut self, source: &str) -> Result<(), EvaluationError> {
        let mut code = source.to_owned();
        if !code.ends_with('\n') {
            code.push('\n');
        }

        let program = Parser::new(Tokenizer::new(&code))
            .parse_program_strict()
            .map_err(|errors| {
                let messages = errors.iter().map(ToString::to_string).collect::<Vec<_>>();
                EvaluationError::Exec(messages.join("; "))
            })?;

        self.nested()?.eval_program(&program)
    }
}

fn eval_literal(kind: LiteralKind, text: &str) -> Value {
    match kind {
        LiteralKind::Number => Value::Number(text.parse().unwrap_or(0.0)),
        LiteralKind::String => Value::String(text.to_owned()),
        LiteralKind::Boolean => Value::Boolean(text == "True"),
        LiteralKind::None => Value::None,
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(_), Value::Boolean(_)) | (Value::Boolean(_), Value::Number(_)) => {
            left.to_number() == right.to_number()
        }
        _ => left == right,
    }
}

fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}

pub fn eval_binary_operation(
    operator: BinaryOperator,
    left: Value,
    right: Value,
) -> Result<Value, EvaluationError> {
    let value = match operator {
        BinaryOperator::Plus => match (left, right) {
            (Value::List(mut left), Value::List(right)) => {
                left.extend(right);
                Value::List(left)
            }
            (left @ Value::String(_), right) | (left, right @ Value::String(_)) => {
                Value::String(format!("{}{}", left, right))
            }
            (left, right) => Value::Number(left.to_number() + right.to_number()),
        },
        BinaryOperator::Minus => Value::Number(left.to_number() - right.to_number()),
        BinaryOperator::Multiply => Value::Number(left.to_number() * right.to_number()),
        // IEEE semantics: dividing by zero gives inf or nan, and `%` keeps
        // the sign of the dividend.
        BinaryOperator::Divide => Value::Number(left.to_number() / right.to_number()),
        BinaryOperator::Modulo => Value::Number(left.to_number() % right.to_number()),
        BinaryOperator::Equal => Value::Boolean(values_equal(&left, &right)),
        BinaryOperator::NotEqual => Value::Boolean(!values_equal(&left, &right)),
        BinaryOperator::LessThan => {
            Value::Boolean(compare_values(&left, &right) == Some(Ordering::Less))
        }
        BinaryOperator::GreaterThan => {
            Value::Boolean(compare_values(&left, &right) == Some(Ordering::Greater))
        }
    };

    Ok(value)
}

fn eval_index(collection: Value, index: Value) -> Result<Value, EvaluationError> {
    let length = match &collection {
        Value::List(elements) => elements.len(),
        Value::String(s) => s.chars().count(),
        other => return Err(EvaluationError::IndexNotSupported(other.type_name())),
    };

    let position = match index {
        Value::Number(n) if n.fract() == 0.0 => n as i64,
        Value::Number(_) => return Err(EvaluationError::InvalidIndex("float".to_owned())),
        other => return Err(EvaluationError::InvalidIndex(other.type_name().to_owned())),
    };
    // negative positions count from the end
    let resolved = if position < 0 {
        position + length as i64
    } else {
        position
    };
    if resolved < 0 || resolved >= length as i64 {
        return Err(EvaluationError::IndexOutOfRange {
            index: position,
            length,
        });
    }

    let resolved = resolved as usize;
    match collection {
        Value::List(elements) => Ok(elements.into_iter().nth(resolved).unwrap_or(Value::None)),
        Value::String(s) => Ok(Value::String(
            s.chars().nth(resolved).map(String::from).unwrap_or_default(),
        )),
        _ => Ok(Value::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::IoConsole;
    use pretty_assertions::assert_eq;
    use pylite_core::parser::parse;
    use std::io::Cursor;

    type TestConsole = IoConsole<Cursor<String>, Vec<u8>>;

    fn console(input: &str) -> TestConsole {
        IoConsole::new(Cursor::new(input.to_owned()), Vec::new())
    }

    fn output(interpreter: Interpreter<TestConsole>) -> String {
        let (_, written) = interpreter.into_console().into_parts();
        String::from_utf8(written).unwrap()
    }

    fn run_program(
        interpreter: &mut Interpreter<TestConsole>,
        source: &str,
    ) -> Result<(), EvaluationError> {
        let (program, errors) = parse(source);
        assert_eq!(errors, vec![], "source: {source}");
        interpreter.run(&program)
    }

    /// Runs `source` in batch mode and returns everything it printed.
    fn run(source: &str) -> String {
        let mut interpreter = Interpreter::new(console(""));
        run_program(&mut interpreter, source).unwrap();
        output(interpreter)
    }

    fn run_err(source: &str) -> EvaluationError {
        let mut interpreter = Interpreter::new(console(""));
        run_program(&mut interpreter, source).unwrap_err()
    }

    fn evaluate(interpreter: &mut Interpreter<TestConsole>, source: &str) -> Value {
        let mut parser = Parser::new(Tokenizer::new(source));
        let expression = parser.parse_single_expression().unwrap();
        interpreter.evaluate(&expression).unwrap()
    }

    fn test_expressions(tests: Vec<(&str, &str)>) {
        for (input, expected) in tests {
            let mut interpreter = Interpreter::new(console(""));
            let value = evaluate(&mut interpreter, input);
            assert_eq!(value.to_string(), expected, "input: {input}");
        }
    }

    #[test]
    fn test_arithmetic() {
        let tests = vec![
            ("5", "5"),
            ("2 + 3 * 4", "14"),
            ("(2 + 3) * 4", "20"),
            ("7 / 2", "3.5"),
            ("7 % 3", "1"),
            ("-7 % 3", "-1"),
            ("7 % -3", "1"),
            ("7.5 % 2", "1.5"),
            ("-(2 + 3)", "-5"),
            ("0.1 + 0.2", "0.3"),
            ("1 / 3", "0.333333"),
            ("True + 1", "2"),
            ("'3' * 2", "6"),
        ];

        test_expressions(tests);
    }

    #[test]
    fn test_string_and_list_concatenation() {
        let tests = vec![
            ("'a' + 1", "a1"),
            ("1 + 'a'", "1a"),
            ("'x' + True", "xTrue"),
            ("'n: ' + None", "n: None"),
            ("[1, 2] + [3]", "[1, 2, 3]"),
            ("'l' + [1, 'a']", "l[1, a]"),
            ("[1] + 1", "1"),
        ];

        test_expressions(tests);
    }

    #[test]
    fn test_comparisons() {
        let tests = vec![
            ("1 == 1", "True"),
            ("1 == '1'", "False"),
            ("1 == True", "True"),
            ("'a' != 'b'", "True"),
            ("[1, 2] == [1, 2]", "True"),
            ("2 < 10", "True"),
            ("'2' < '10'", "False"),
            ("'b' > 'a'", "True"),
            ("None == None", "True"),
        ];

        test_expressions(tests);
    }

    #[test]
    fn test_indexing() {
        let tests = vec![
            ("[1, 2, 3][0]", "1"),
            ("[1, 2, 3][-1]", "3"),
            ("[[1, 2], [3, 4]][1][0]", "3"),
            ("'hey'[1]", "e"),
        ];
        test_expressions(tests);

        let tests = vec![
            (
                "x = [1, 2][2]",
                EvaluationError::IndexOutOfRange {
                    index: 2,
                    length: 2,
                },
            ),
            (
                "x = [1][-2]",
                EvaluationError::IndexOutOfRange {
                    index: -2,
                    length: 1,
                },
            ),
            ("x = [1]['a']", EvaluationError::InvalidIndex("str".to_owned())),
            ("x = [1][0.5]", EvaluationError::InvalidIndex("float".to_owned())),
            ("x = 5[0]", EvaluationError::IndexNotSupported("number")),
        ];
        for (input, expected) in tests {
            assert_eq!(run_err(input), expected, "input: {input}");
        }
    }

    #[test]
    fn test_division_by_zero() {
        let tests = vec![
            ("1 / 0", "inf"),
            ("-1 / 0", "-inf"),
            ("0 / 0", "nan"),
            ("1 % 0", "nan"),
        ];
        test_expressions(tests);

        assert_eq!(run("x = 1 / 0\nprint(x)\nprint('done')"), "inf\ndone\n");
    }

    #[test]
    fn test_assignment_and_lookup() {
        let mut interpreter = Interpreter::new(console(""));
        run_program(&mut interpreter, "x = 1\ny = 'a' + x\nx = x + 1").unwrap();

        assert_eq!(
            interpreter.environment().get("y"),
            Some(&Value::String("a1".to_owned()))
        );
        assert_eq!(interpreter.environment().get("x"), Some(&Value::Number(2.0)));
        assert_eq!(evaluate(&mut interpreter, "unbound"), Value::None);
    }

    #[test]
    fn test_print_statement_and_call() {
        assert_eq!(run("print('a', 1, True)"), "a1True\n");
        assert_eq!(run("print()"), "\n");
        assert_eq!(run("x = print('a', 1, [2])"), "a 1 [2]\n");
        assert_eq!(run("x = 2.50\nprint(x, ' ', x * 2)"), "2.5 5\n");
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(
            run_err("foo(1)").to_string(),
            "undefined function 'foo'"
        );
        assert_eq!(
            run_err("x = 1\nx(2)"),
            EvaluationError::UndefinedFunction("x".into())
        );
    }

    #[test]
    fn test_batch_mode_discards_results() {
        assert_eq!(run("1 + 2\n'text'"), "");
    }

    #[test]
    fn test_interactive_mode_echoes() {
        let mut interpreter = Interpreter::interactive(console(""));
        run_program(&mut interpreter, "1 + 2\nNone\nx = 4\n'text'\nprint(x)").unwrap();

        assert_eq!(output(interpreter), "3\ntext\n4\n");
    }

    #[test]
    fn test_input() {
        let mut interpreter = Interpreter::new(console("Ada\r\n"));
        run_program(
            &mut interpreter,
            "name = input('Name: ')\nprint('Hi ', name)\nrest = input()",
        )
        .unwrap();

        assert_eq!(
            interpreter.environment().get("rest"),
            Some(&Value::String(String::new()))
        );
        assert_eq!(output(interpreter), "Name: Hi Ada\n");
    }

    #[test]
    fn test_templates() {
        let mut interpreter = Interpreter::new(console(""));
        run_program(&mut interpreter, "x = 5\nname = 'Ada'").unwrap();

        let tests = vec![
            ("f\"{x+1}\"", "6"),
            ("f\"{y}\"", "{y}"),
            ("f'{name} is {x} \\{x\\}'", "Ada is 5 {x}"),
            ("f\"a\\tb\"", "a\tb"),
        ];
        for (input, expected) in tests {
            assert_eq!(evaluate(&mut interpreter, input).to_string(), expected, "{input}");
        }
    }

    #[test]
    fn test_eval() {
        let mut interpreter = Interpreter::new(console(""));
        run_program(&mut interpreter, "x = 4").unwrap();

        let tests = vec![
            ("eval('1+2')", Value::Number(3.0)),
            ("eval('12.5')", Value::Number(12.5)),
            ("eval('x * 2')", Value::Number(8.0)),
            ("eval('[x, \"a\"]')", Value::List(vec![Value::Number(4.0), Value::String("a".to_owned())])),
            ("eval(\"eval('1+1')\")", Value::Number(2.0)),
            ("eval('x +')", Value::String("{x +}".to_owned())),
            ("eval('nope(1)')", Value::String("{nope(1)}".to_owned())),
            ("eval('missing')", Value::None),
        ];
        for (input, expected) in tests {
            assert_eq!(evaluate(&mut interpreter, input), expected, "{input}");
        }
    }

    #[test]
    fn test_exec_mutates_caller_environment() {
        let mut interpreter = Interpreter::new(console(""));
        run_program(&mut interpreter, "exec('a=1\\nb=2')").unwrap();

        assert_eq!(evaluate(&mut interpreter, "a + b"), Value::Number(3.0));
    }

    #[test]
    fn test_exec_does_not_echo() {
        let mut interpreter = Interpreter::interactive(console(""));
        run_program(&mut interpreter, "exec('1 + 1\\nprint(7)')").unwrap();

        assert_eq!(output(interpreter), "7\n");
    }

    #[test]
    fn test_exec_parse_error() {
        let err = run_err("exec('x = (')");

        assert!(matches!(err, EvaluationError::Exec(_)), "{err:?}");
        assert!(err.to_string().starts_with("exec error: "), "{err}");
    }

    #[test]
    fn test_runaway_recursion_fails_cleanly() {
        let err = run_err("s = 'eval(s)'\neval(s)");
        assert_eq!(err, EvaluationError::NestingTooDeep(MAX_NESTING));

        let err = run_err("s = 'exec(s)'\nexec(s)");
        assert_eq!(err, EvaluationError::NestingTooDeep(MAX_NESTING));
    }

    #[test]
    fn test_deeply_nested_source_is_not_evaluated() {
        let nested = format!("{}1{}", "(".repeat(20000), ")".repeat(20000));
        let mut interpreter = Interpreter::new(console(""));
        run_program(&mut interpreter, &format!("x = eval('{nested}')")).unwrap();
        assert_eq!(
            interpreter.environment().get("x"),
            Some(&Value::String(format!("{{{nested}}}")))
        );

        let err = run_err(&format!("exec('y = {nested}')"));
        assert!(
            err.to_string().contains("nested deeper than 256 levels"),
            "{err}"
        );
    }

    #[test]
    fn test_with_writes_file_and_unbinds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let source = format!(
            "with open({:?}, 'w') as fh: fh.write('hello')\nfh.read()",
            path.to_string_lossy()
        );

        let err = run_err(&source);

        assert_eq!(err, EvaluationError::UndefinedName("fh".into()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_with_legacy_method_convention() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let path = path.to_string_lossy();

        let source = format!(
            "with open({path:?}, 'w') as fh: n = fh('write', 'abc')\n\
             with open({path:?}, 'a') as fh: fh.write('def')\n\
             with open({path:?}) as fh:\n    print(fh('read'), n)\n\
             fh('read')"
        );
        let mut interpreter = Interpreter::new(console(""));
        let err = run_program(&mut interpreter, &source).unwrap_err();

        assert_eq!(err, EvaluationError::UndefinedFunction("fh".into()));
        assert_eq!(interpreter.environment().get("fh"), None);
        assert_eq!(output(interpreter), "abcdef3\n");
    }

    #[test]
    fn test_with_body_failure() {
        let mut interpreter = Interpreter::new(console(""));
        let err = run_program(&mut interpreter, "with open('x.txt') as fh: y = len(5)").unwrap_err();

        assert_eq!(
            err.to_string(),
            "with statement failed: object of type 'number' has no len()"
        );
        assert_eq!(interpreter.environment().get("fh"), None);
    }

    #[test]
    fn test_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.txt");
        let source = format!(
            "fh = open({:?}, 'w')\nfh.close()\ns = str(fh)",
            path.to_string_lossy()
        );
        let mut interpreter = Interpreter::new(console(""));
        run_program(&mut interpreter, &source).unwrap();

        let Some(Value::String(rendered)) = interpreter.environment().get("s") else {
            panic!("expected a string");
        };
        assert!(rendered.starts_with("<closed file"), "{rendered}");
        assert!(matches!(
            run_program(&mut interpreter, "fh.write('x')"),
            Err(EvaluationError::ClosedFile(_))
        ));
        assert!(matches!(
            run_program(&mut interpreter, "fh('read')"),
            Err(EvaluationError::ClosedFile(_))
        ));
    }

    #[test]
    fn test_unknown_methods() {
        assert_eq!(
            run_err("x = 'abc'\nx.upper()"),
            EvaluationError::UnknownMethod {
                type_name: "str",
                method: "upper".to_owned(),
            }
        );
        assert_eq!(
            run_err("fh = open('a')\nfh('seek', 0)"),
            EvaluationError::UnknownMethod {
                type_name: "file",
                method: "seek".to_owned(),
            }
        );
    }
}
