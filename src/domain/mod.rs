//! Domain types shared by the buffer, the stream controller and config:
//! - `Severity`: syslog-ordered severity levels and their header labels
//! - `SeverityMask`: bitmask of severities eligible for output
//! - `LogStreamError`: error type for construction and line emission

pub mod error;
pub mod severity;

pub use error::LogStreamError;
pub use severity::{ParseSeverityError, Severity, SeverityMask};
