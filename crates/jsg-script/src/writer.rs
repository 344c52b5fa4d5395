use std::io::{self, Write};

use crate::audit::{marked, PARAM_INFO, PARAM_VALUE};

/// Line-oriented shell script writer.
///
/// Tracks whether the shebang was already written so a file never carries
/// two of them, whatever the emitter asks for.
pub struct ScriptWriter<'a> {
    out: &'a mut dyn Write,
    shebang_written: bool,
    lines: usize,
}

impl<'a> ScriptWriter<'a> {
    /// Wraps an output sink.
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self {
            out,
            shebang_written: false,
            lines: 0,
        }
    }

    /// Writes `line` followed by a newline.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Writes `#! <interpreter>` unless a shebang was already written.
    pub fn shebang(&mut self, interpreter: &str) -> io::Result<()> {
        if self.shebang_written {
            return Ok(());
        }
        self.write_line(&format!("#! {interpreter}"))?;
        self.shebang_written = true;
        Ok(())
    }

    /// Echoes the column names of the invocations that follow.
    pub fn echo_param_info(&mut self, columns: &str) -> io::Result<()> {
        self.write_line(&format!("echo \"{}\"", marked(PARAM_INFO, columns)))
    }

    /// Echoes the values of the next invocation.
    pub fn echo_param_value(&mut self, values: &str) -> io::Result<()> {
        self.write_line(&format!("echo \"{}\"", marked(PARAM_VALUE, values)))
    }

    /// Number of lines written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Flushes the underlying sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
