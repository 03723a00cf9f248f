use std::io::{self, BufRead, Write};

/// Line-oriented terminal the evaluator talks to: `print` output, `input`
/// prompts and interactive echo all go through it.
pub trait Console {
    /// Shows `prompt` without a newline and blocks for one line of input.
    /// The line terminator is stripped; `Ok(None)` marks end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Writes `text` and flushes it.
    fn write(&mut self, text: &str) -> io::Result<()>;
}

impl<C: Console + ?Sized> Console for Box<C> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        (**self).read_line(prompt)
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        (**self).write(text)
    }
}

pub struct IoConsole<R, W> {
    reader: R,
    writer: W,
}

impl IoConsole<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        IoConsole::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> IoConsole<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        IoConsole { reader, writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

pub fn strip_line_ending(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}

impl<R: BufRead, W: Write> Console for IoConsole<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if !prompt.is_empty() {
            self.write(prompt)?;
        }

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        strip_line_ending(&mut line);
        Ok(Some(line))
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())?;
        self.writer.flush()
    }
}
