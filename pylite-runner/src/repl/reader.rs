use std::cell::RefCell;
use std::rc::Rc;

use pylite_core::ast::Program;
use pylite_core::parser;
use pylite_interpreter::builtins::BUILTIN_NAMES;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::runner::report_syntax_errors;

const PROMPT: &str = ">>> ";

#[derive(Debug, PartialEq)]
pub enum ReadOutput {
    Exit,
    Clear,
    Value(Program),
}

pub struct Reader {
    rl: Rc<RefCell<DefaultEditor>>,
}

impl Reader {
    pub fn new(rl: Rc<RefCell<DefaultEditor>>) -> Self {
        Self { rl }
    }

    pub fn read(&mut self) -> ReadOutput {
        let Ok(mut rl) = self.rl.try_borrow_mut() else {
            return ReadOutput::Exit;
        };
        let line = match rl.readline(PROMPT) {
            Err(ReadlineError::Interrupted) => {
                println!("KeyboardInterrupt");
                return ReadOutput::Clear;
            }
            Err(ReadlineError::Eof) => return ReadOutput::Exit,
            Err(err) => {
                eprintln!("Error: {}", err);
                return ReadOutput::Exit;
            }
            Ok(line) => line,
        };
        if !line.trim().is_empty() {
            if let Err(err) = rl.add_history_entry(line.as_str()) {
                tracing::debug!(%err, "history entry dropped");
            }
        }

        interpret_line(&line)
    }
}

fn print_help() {
    println!("Statements: assignment (x = 5), print(...), with expr as name: body");
    println!("Expressions: numbers, strings, f\"{{templates}}\", lists, + - * / % == != < >");
    println!("Builtins: {}", BUILTIN_NAMES.join(", "));
    println!("File handles from open() support read(), write(data) and close().");
    println!("Type \"exit()\" or \"quit()\" to leave.");
}

/// Replies to the bare words the shell answers without evaluating them.
fn shell_reply(command: &str) -> Option<&'static str> {
    match command {
        "help" => Some("Type help() for interactive help, or exit() to leave."),
        "copyright" => Some("Copyright (c) the pylite authors."),
        "credits" => Some("Thanks to everyone who has contributed to pylite."),
        "license" => Some("See the LICENSE file distributed with pylite."),
        _ => None,
    }
}

/// Turns one line of input into the next step of the session. Shell
/// commands are handled here; anything else is parsed.
pub fn interpret_line(line: &str) -> ReadOutput {
    match line.trim() {
        "" => return ReadOutput::Clear,
        "exit()" | "quit()" => return ReadOutput::Exit,
        "help()" => {
            print_help();
            return ReadOutput::Clear;
        }
        command => {
            if let Some(reply) = shell_reply(command) {
                println!("{}", reply);
                return ReadOutput::Clear;
            }
        }
    }

    let (program, errors) = parser::parse(line);
    report_syntax_errors(&errors);
    if program.statements.is_empty() {
        ReadOutput::Clear
    } else {
        ReadOutput::Value(program)
    }
}
