//! Ordered-output facade over [`LogStreamBuf`].

pub mod shared;
pub mod tagged;

pub use shared::SharedLogStream;
pub use tagged::Tagged;

use crate::buffer::LogStreamBuf;
use crate::destination::{self, FileOptions, StdoutDestination};
use crate::domain::{LogStreamError, Severity, SeverityMask};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

#[cfg(unix)]
use crate::destination::FdDestination;
#[cfg(unix)]
use std::os::fd::RawFd;

/// Log stream controller.
///
/// Writes are attributed to the current severity (initially `Debug`) and
/// only reach the destination when that severity is enabled by the mask
/// (initially `Emerg` only). Out of the box a stream is therefore quiet
/// until [`set_level`](Self::set_level) or [`set_mask`](Self::set_mask)
/// raises the mask.
///
/// `io::Write` is implemented so `write!`/`writeln!` work; its `flush`
/// ends the current line, like [`sync`](Self::sync). An `Err` from
/// `io::Write::write` means none of its bytes were taken.
pub struct LogStream<W: Write = StdoutDestination> {
    buf: LogStreamBuf<W>,
}

impl LogStream<StdoutDestination> {
    /// Stream writing to standard output.
    pub fn new() -> Self {
        Self::with_destination(destination::default_destination())
    }
}

impl Default for LogStream<StdoutDestination> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl LogStream<FdDestination> {
    /// Stream writing to an already open descriptor, which stays owned by
    /// the caller.
    pub fn from_fd(fd: RawFd) -> Result<Self, LogStreamError> {
        Ok(Self::with_destination(FdDestination::new(fd)?))
    }
}

impl LogStream<File> {
    /// Stream writing to a file it opens and owns. The file is closed when
    /// the stream is dropped.
    pub fn open(path: impl AsRef<Path>, options: &FileOptions) -> Result<Self, LogStreamError> {
        Ok(Self::with_destination(destination::open_file(path, options)?))
    }
}

impl<W: Write> LogStream<W> {
    pub fn with_destination(destination: W) -> Self {
        Self {
            buf: LogStreamBuf::new(destination),
        }
    }

    pub fn with_capacity(destination: W, capacity: usize) -> Result<Self, LogStreamError> {
        Ok(Self {
            buf: LogStreamBuf::with_capacity(destination, capacity)?,
        })
    }

    pub fn from_buf(buf: LogStreamBuf<W>) -> Self {
        Self { buf }
    }

    /// Appends text to the current line.
    pub fn write_text(&mut self, text: &str) -> Result<usize, LogStreamError> {
        self.write_bytes(text.as_bytes())
    }

    /// Appends all of `bytes`. On failure the bytes taken before the
    /// failed emission stay buffered; nothing is written twice.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize, LogStreamError> {
        self.buf.write_all(bytes)?;
        Ok(bytes.len())
    }

    /// Switches to `severity` and returns a handle whose writes are
    /// attributed to it. Pending bytes are resolved under the previous
    /// severity first.
    pub fn tag_severity(&mut self, severity: Severity) -> Result<Tagged<'_, W>, LogStreamError> {
        self.buf.set_severity(severity)?;
        Ok(Tagged::new(self, severity))
    }

    /// Returns the previous severity.
    pub fn set_severity(&mut self, severity: Severity) -> Result<Severity, LogStreamError> {
        self.buf.set_severity(severity)
    }

    pub fn severity(&self) -> Severity {
        self.buf.severity()
    }

    /// Enables every severity from `Emerg` through `level` and returns the
    /// resulting mask.
    pub fn set_level(&mut self, level: Severity) -> SeverityMask {
        let mask = SeverityMask::up_to(level);
        self.buf.set_mask(mask);
        mask
    }

    /// Returns the previous mask; an empty mask changes nothing.
    pub fn set_mask(&mut self, mask: SeverityMask) -> SeverityMask {
        self.buf.set_mask(mask)
    }

    pub fn mask(&self) -> SeverityMask {
        self.buf.mask()
    }

    pub fn set_line_prefix(&mut self, prefix: impl Into<String>) -> String {
        self.buf.set_prefix(prefix)
    }

    pub fn line_prefix(&self) -> &str {
        self.buf.prefix()
    }

    /// Writes `text` as one complete line at `severity`: switches severity,
    /// appends the text and a newline, then ends the line.
    pub fn log(&mut self, severity: Severity, text: &str) -> Result<(), LogStreamError> {
        self.buf.set_severity(severity)?;
        self.buf.write_all(text.as_bytes())?;
        self.buf.write_all(b"\n")?;
        self.buf.sync()?;
        Ok(())
    }

    /// Appends a newline and ends the current line.
    pub fn end_line(&mut self) -> Result<(), LogStreamError> {
        self.buf.write_all(b"\n")?;
        self.buf.sync()?;
        Ok(())
    }

    /// Ends the current line, emitting any buffered bytes.
    pub fn sync(&mut self) -> Result<(), LogStreamError> {
        self.buf.sync().map(|_| ())
    }

    pub fn buf(&self) -> &LogStreamBuf<W> {
        &self.buf
    }

    pub fn buf_mut(&mut self) -> &mut LogStreamBuf<W> {
        &mut self.buf
    }

    pub fn destination(&self) -> &W {
        self.buf.get_ref()
    }
}

impl<W: Write> Write for LogStream<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.buf.write(buf)?)
    }

    /// One emission attempt per filled buffer; the default loop would
    /// re-enter `write` and attempt a failed emission again.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        Ok(self.buf.write_all(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.sync()?)
    }
}

impl<W: Write> std::fmt::Debug for LogStream<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStream").field("buf", &self.buf).finish()
    }
}
