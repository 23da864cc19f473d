use crate::buffer::{DEFAULT_BUFFER_CAPACITY, MIN_BUFFER_CAPACITY};
use crate::destination::{self, DEFAULT_FILE_MODE, FileOptions};
use crate::domain::{LogStreamError, Severity};
use crate::stream::LogStream;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stream type produced by [`SinkConfig::build`].
pub type BoxedLogStream = LogStream<Box<dyn Write + Send>>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Environment error: {0}")]
    EnvError(String),
    #[error("Sink error: {0}")]
    SinkError(#[from] LogStreamError),
}

/// Where a configured sink writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationKind {
    Stdout,
    Stderr,
    Path(PathBuf),
}

/// Declarative description of a log sink, loadable from TOML.
///
/// ```toml
/// destination = "/var/log/app.log"
/// append = true
/// mode = 0o640
/// buffer_capacity = 4096
/// level = "info"
/// prefix = "worker-1: "
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// `"stdout"`, `"stderr"` or a file path
    pub destination: String,
    pub append: bool,
    pub mode: u32,
    pub buffer_capacity: usize,
    /// Most verbose severity written; everything up to it is enabled
    pub level: Severity,
    pub prefix: Option<String>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            destination: "stdout".to_string(),
            append: true,
            mode: DEFAULT_FILE_MODE,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            level: Severity::Emerg,
            prefix: None,
        }
    }
}

impl SinkConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SinkConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `LOGSTREAM_DESTINATION`, `LOGSTREAM_LEVEL`,
    /// `LOGSTREAM_PREFIX`, `LOGSTREAM_APPEND` and
    /// `LOGSTREAM_BUFFER_CAPACITY`, looked up through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(destination) = lookup("LOGSTREAM_DESTINATION") {
            self.destination = destination;
        }
        if let Some(prefix) = lookup("LOGSTREAM_PREFIX") {
            self.prefix = Some(prefix);
        }
        load_env_var(&lookup, "LOGSTREAM_LEVEL", &mut self.level)?;
        load_env_var(&lookup, "LOGSTREAM_APPEND", &mut self.append)?;
        load_env_var(&lookup, "LOGSTREAM_BUFFER_CAPACITY", &mut self.buffer_capacity)?;

        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.destination.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Destination must not be empty".to_string(),
            ));
        }

        if self.buffer_capacity < MIN_BUFFER_CAPACITY {
            return Err(ConfigError::InvalidConfig(format!(
                "Buffer capacity ({}) must be at least {MIN_BUFFER_CAPACITY}",
                self.buffer_capacity
            )));
        }

        if self.mode > 0o7777 {
            return Err(ConfigError::InvalidConfig(format!(
                "File mode {:#o} is not a permission mask",
                self.mode
            )));
        }

        Ok(())
    }

    pub fn destination_kind(&self) -> DestinationKind {
        match self.destination.trim() {
            "stdout" | "-" => DestinationKind::Stdout,
            "stderr" => DestinationKind::Stderr,
            path => DestinationKind::Path(PathBuf::from(path)),
        }
    }

    pub fn file_options(&self) -> FileOptions {
        FileOptions {
            append: self.append,
            mode: self.mode,
        }
    }

    /// Opens the destination and returns a stream with the configured
    /// capacity, level and prefix applied.
    pub fn build(&self) -> Result<BoxedLogStream, ConfigError> {
        self.validate()?;

        let sink: Box<dyn Write + Send> = match self.destination_kind() {
            DestinationKind::Stdout => Box::new(destination::default_destination()),
            DestinationKind::Stderr => Box::new(destination::stderr_destination()),
            DestinationKind::Path(path) => {
                Box::new(destination::open_file(path, &self.file_options())?)
            }
        };

        let mut stream = LogStream::with_capacity(sink, self.buffer_capacity)?;
        stream.set_level(self.level);
        if let Some(prefix) = &self.prefix {
            stream.set_line_prefix(prefix.clone());
        }

        tracing::debug!(
            destination = %self.destination,
            level = %self.level,
            capacity = self.buffer_capacity,
            "built log stream from configuration"
        );
        Ok(stream)
    }
}

/// Parses an override into `target`. A missing variable keeps the current
/// value.
fn load_env_var<F, T>(lookup: &F, name: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(value) = lookup(name) {
        *target = value
            .parse()
            .map_err(|e| ConfigError::EnvError(format!("Invalid {name}: {e}")))?;
    }
    Ok(())
}
