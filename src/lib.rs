#![warn(rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Masks and byte counts stay within u8/isize bounds
    clippy::cast_sign_loss,           // Checked non-negative before casting
    clippy::missing_errors_doc,       // Error variants are documented on LogStreamError
    clippy::module_name_repetitions,  // e.g. LogStreamError in domain::error
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown
)]

//! Buffered, severity-filtering log line writer.
//!
//! A [`LogStream`] groups written bytes into lines, prefixes each line with a
//! timestamp and a four character severity label, drops lines whose severity
//! is not enabled by the current [`SeverityMask`], and writes the rest to a
//! single destination (standard output unless another is given).
//!
//! ```no_run
//! use logstream::{LogStream, Severity};
//!
//! let mut log = LogStream::new();
//! log.set_level(Severity::Info);
//! log.log(Severity::Notice, "service started")?;
//! log.tag_severity(Severity::Debug)?.line("not written: above the level")?;
//! # Ok::<(), logstream::LogStreamError>(())
//! ```

pub mod buffer;
pub mod config;
pub mod destination;
pub mod domain;
pub mod stream;

pub use buffer::LogStreamBuf;
pub use config::{ConfigError, SinkConfig};
pub use destination::{FileOptions, open_file};
pub use domain::{LogStreamError, Severity, SeverityMask};
pub use stream::{LogStream, SharedLogStream, Tagged};

#[cfg(unix)]
pub use destination::FdDestination;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
