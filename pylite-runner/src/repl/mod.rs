mod console;
mod evaluator;
mod printer;
mod reader;

use std::cell::RefCell;
use std::rc::Rc;

use rustyline::DefaultEditor;

use console::EditorConsole;
use evaluator::{Evaluator, InterpreterEvaluator};
use printer::{InterpreterPrinter, Printer};
use reader::{ReadOutput, Reader};

use crate::runner::RunError;

struct Repl<E: Evaluator, P: Printer> {
    reader: Reader,
    evaluator: E,
    printer: P,
}

impl<O, E: Evaluator<Object = O>, P: Printer<Object = O>> Repl<E, P> {
    fn run(mut self) {
        loop {
            match self.reader.read() {
                ReadOutput::Exit => break,
                ReadOutput::Clear => continue,
                ReadOutput::Value(program) => {
                    let result = self.evaluator.evaluate(program);
                    self.printer.print(result)
                }
            }
        }
    }
}

pub fn start() -> Result<(), RunError> {
    // the prompt loop and `input()` share one editor, and with it the history
    let editor = Rc::new(RefCell::new(DefaultEditor::new()?));

    println!(
        "pylite {} interactive shell\nType \"help()\" for help, \"exit()\" or \"quit()\" to leave.",
        env!("CARGO_PKG_VERSION")
    );

    Repl {
        reader: Reader::new(Rc::clone(&editor)),
        evaluator: InterpreterEvaluator::new(EditorConsole::new(editor)),
        printer: InterpreterPrinter {},
    }
    .run();

    Ok(())
}
