use pylite_interpreter::EvaluationError;

pub trait Printer {
    type Object;

    fn print(&mut self, object: Self::Object);
}

/// Results are echoed by the interpreter itself; only failures are left to
/// report.
pub struct InterpreterPrinter {}

impl Printer for InterpreterPrinter {
    type Object = Result<(), EvaluationError>;

    fn print(&mut self, object: Self::Object) {
        if let Err(err) = object {
            eprintln!("Error: {}", err);
        }
    }
}
