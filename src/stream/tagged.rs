use super::LogStream;
use crate::domain::{LogStreamError, Severity};
use std::io::{self, Write};

/// Handle bound to one severity, returned by
/// [`LogStream::tag_severity`]. While it is alive the stream cannot be
/// re-tagged, so everything written through it carries `severity`.
pub struct Tagged<'a, W: Write> {
    stream: &'a mut LogStream<W>,
    severity: Severity,
}

impl<'a, W: Write> Tagged<'a, W> {
    pub(crate) fn new(stream: &'a mut LogStream<W>, severity: Severity) -> Self {
        Self { stream, severity }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn write_text(&mut self, text: &str) -> Result<&mut Self, LogStreamError> {
        self.stream.write_text(text)?;
        Ok(self)
    }

    /// Writes `text` followed by a newline and ends the line.
    pub fn line(&mut self, text: &str) -> Result<&mut Self, LogStreamError> {
        self.stream.write_text(text)?;
        self.stream.end_line()?;
        Ok(self)
    }
}

impl<W: Write> Write for Tagged<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.stream.buf_mut().write(buf)?)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        Ok(self.stream.buf_mut().write_all(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.stream.sync()?)
    }
}
