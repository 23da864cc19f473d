use std::io;
use thiserror::Error;

/// Errors surfaced by log stream construction and line emission.
#[derive(Error, Debug)]
pub enum LogStreamError {
    /// The destination handle or path could not be used. Fatal to the
    /// construction that produced it.
    #[error("Invalid destination: {reason}")]
    InvalidDestination {
        reason: String,
        #[source]
        source: Option<io::Error>,
    },

    /// A write to the destination did not complete. Short writes are
    /// reported here too, with `written < expected` and no source.
    #[error("Write to destination failed: {written} of {expected} bytes written")]
    WriteFailed {
        written: usize,
        expected: usize,
        #[source]
        source: Option<io::Error>,
    },

    #[error("Invalid buffer capacity: {capacity} (minimum {minimum})")]
    InvalidCapacity { capacity: usize, minimum: usize },
}

impl LogStreamError {
    pub fn invalid_destination(reason: impl Into<String>) -> Self {
        LogStreamError::InvalidDestination {
            reason: reason.into(),
            source: None,
        }
    }

    pub fn is_invalid_destination(&self) -> bool {
        matches!(self, LogStreamError::InvalidDestination { .. })
    }

    pub fn is_write_failure(&self) -> bool {
        matches!(self, LogStreamError::WriteFailed { .. })
    }
}

/// An `Interrupted` source maps to `Other`; emission is never repeated by
/// callers such as `io::Write::write_all`.
impl From<LogStreamError> for io::Error {
    fn from(error: LogStreamError) -> Self {
        let kind = match &error {
            LogStreamError::WriteFailed {
                source: Some(source),
                ..
            } if source.kind() == io::ErrorKind::Interrupted => io::ErrorKind::Other,
            LogStreamError::WriteFailed {
                source: Some(source),
                ..
            } => source.kind(),
            LogStreamError::WriteFailed { source: None, .. } => io::ErrorKind::WriteZero,
            LogStreamError::InvalidDestination { .. } => io::ErrorKind::NotFound,
            LogStreamError::InvalidCapacity { .. } => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, error)
    }
}
