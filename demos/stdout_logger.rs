//! Logs a few lines to standard output.
//!
//! Run with `RUST_LOG=logstream=trace` to see the sink's own diagnostics on
//! stderr, including the lines it filters out.

use logstream::{LogStream, Severity};
use std::io::Write;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut logger = LogStream::new();
    logger.set_level(Severity::Debug);

    writeln!(logger, "default is to log at debug level")?;
    logger.flush()?;
    writeln!(logger, "24 in hex: {:x}", 24)?;
    logger.flush()?;
    writeln!(logger, "24 in oct: {:o}", 24)?;
    logger.flush()?;

    logger
        .tag_severity(Severity::Info)?
        .line("this is logged at info level")?;
    logger.log(Severity::Info, "this will also be in info level")?;

    logger.set_level(Severity::Warning);
    logger.log(Severity::Info, "filtered: info is above the warning level")?;
    logger.log(Severity::Warning, "warnings still get through")?;

    Ok(())
}
