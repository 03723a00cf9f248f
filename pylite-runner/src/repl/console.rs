use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use pylite_interpreter::Console;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Console for `input()` during an interactive session: prompts go through
/// the shared line editor, output goes to stdout.
pub struct EditorConsole {
    editor: Rc<RefCell<DefaultEditor>>,
}

impl EditorConsole {
    pub fn new(editor: Rc<RefCell<DefaultEditor>>) -> Self {
        Self { editor }
    }
}

impl Console for EditorConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut editor = self
            .editor
            .try_borrow_mut()
            .map_err(|err| io::Error::other(err.to_string()))?;

        match editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Interrupted) => Err(io::ErrorKind::Interrupted.into()),
            Err(ReadlineError::Io(err)) => Err(err),
            Err(err) => Err(io::Error::other(err.to_string())),
        }
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()
    }
}
