//! Output destinations for a log stream.
//!
//! Any [`std::io::Write`] implementor can receive log lines. Each emission is
//! issued as a single `write` call and the returned count is checked, so a
//! destination that accepts fewer bytes than offered is reported as a
//! failure rather than retried.

use crate::domain::LogStreamError;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

#[cfg(unix)]
use std::os::fd::{AsRawFd, RawFd};

/// Default permission bits for log files created by [`open_file`].
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Borrowed raw file descriptor. The descriptor is never closed by the
/// destination; its owner keeps that responsibility.
#[cfg(unix)]
#[derive(Debug)]
pub struct FdDestination {
    fd: RawFd,
}

#[cfg(unix)]
impl FdDestination {
    /// Validates `fd` and wraps it.
    ///
    /// Fails with `InvalidDestination` when the descriptor is negative, not
    /// open, or not open for writing.
    pub fn new(fd: RawFd) -> Result<Self, LogStreamError> {
        if fd < 0 {
            return Err(LogStreamError::invalid_destination(format!(
                "invalid file descriptor {fd}"
            )));
        }

        // SAFETY: F_GETFL only reads the descriptor's status flags.
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
        if flags == -1 {
            return Err(LogStreamError::InvalidDestination {
                reason: format!("file descriptor {fd} is not open"),
                source: Some(io::Error::last_os_error()),
            });
        }

        let access = flags & libc::O_ACCMODE;
        if access != libc::O_WRONLY && access != libc::O_RDWR {
            return Err(LogStreamError::invalid_destination(format!(
                "file descriptor {fd} is not open for writing"
            )));
        }

        Ok(Self { fd })
    }

    pub fn stdout() -> Self {
        Self {
            fd: libc::STDOUT_FILENO,
        }
    }

    pub fn stderr() -> Self {
        Self {
            fd: libc::STDERR_FILENO,
        }
    }
}

#[cfg(unix)]
impl AsRawFd for FdDestination {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

#[cfg(unix)]
impl io::Write for FdDestination {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // SAFETY: `buf` is valid for reads of `buf.len()` bytes for the
        // duration of the call.
        let written = unsafe { libc::write(self.fd, buf.as_ptr().cast(), buf.len()) };
        if written < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(written as usize)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Destination used when none is supplied.
#[cfg(unix)]
pub type StdoutDestination = FdDestination;
#[cfg(not(unix))]
pub type StdoutDestination = io::Stdout;

#[cfg(unix)]
pub type StderrDestination = FdDestination;
#[cfg(not(unix))]
pub type StderrDestination = io::Stderr;

/// Standard output, written without an intermediate userspace buffer on unix.
pub fn default_destination() -> StdoutDestination {
    #[cfg(unix)]
    {
        FdDestination::stdout()
    }
    #[cfg(not(unix))]
    {
        io::stdout()
    }
}

pub fn stderr_destination() -> StderrDestination {
    #[cfg(unix)]
    {
        FdDestination::stderr()
    }
    #[cfg(not(unix))]
    {
        io::stderr()
    }
}

/// How [`open_file`] creates or opens a log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOptions {
    /// Append to existing content; when false the file is truncated.
    pub append: bool,
    /// Permission bits applied when the file is created (unix only).
    pub mode: u32,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            append: true,
            mode: DEFAULT_FILE_MODE,
        }
    }
}

impl FileOptions {
    pub fn truncate() -> Self {
        Self {
            append: false,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }
}

/// Opens (creating if needed) a log file for writing. The returned file is
/// owned by the caller and closed when dropped.
pub fn open_file(path: impl AsRef<Path>, options: &FileOptions) -> Result<File, LogStreamError> {
    let path = path.as_ref();

    let mut open = OpenOptions::new();
    open.create(true);
    if options.append {
        open.append(true);
    } else {
        open.write(true).truncate(true);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        open.mode(options.mode);
    }

    let file = open
        .open(path)
        .map_err(|e| LogStreamError::InvalidDestination {
            reason: format!("cannot open log file '{}'", path.display()),
            source: Some(e),
        })?;

    tracing::debug!(
        path = %path.display(),
        append = options.append,
        "opened log file destination"
    );
    Ok(file)
}
