use super::LogStream;
use crate::domain::{LogStreamError, Severity, SeverityMask};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Clonable, lock-serialized handle to a [`LogStream`].
///
/// Every operation takes the lock, and [`log`](Self::log) holds it across
/// tag, write and line end, so lines from different threads never
/// interleave. Heavier than a plain `LogStream`; prefer one stream per
/// thread when the destination allows it.
pub struct SharedLogStream<W: Write> {
    inner: Arc<Mutex<LogStream<W>>>,
}

impl<W: Write> Clone for SharedLogStream<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: Write> SharedLogStream<W> {
    pub fn new(stream: LogStream<W>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(stream)),
        }
    }

    pub fn log(&self, severity: Severity, text: &str) -> Result<(), LogStreamError> {
        self.inner.lock().log(severity, text)
    }

    pub fn set_level(&self, level: Severity) -> SeverityMask {
        self.inner.lock().set_level(level)
    }

    pub fn set_mask(&self, mask: SeverityMask) -> SeverityMask {
        self.inner.lock().set_mask(mask)
    }

    pub fn mask(&self) -> SeverityMask {
        self.inner.lock().mask()
    }

    pub fn set_line_prefix(&self, prefix: impl Into<String>) -> String {
        self.inner.lock().set_line_prefix(prefix)
    }

    pub fn sync(&self) -> Result<(), LogStreamError> {
        self.inner.lock().sync()
    }

    /// Runs `f` with exclusive access to the stream, for multi-step writes
    /// that must not interleave with other threads.
    pub fn with_stream<R>(&self, f: impl FnOnce(&mut LogStream<W>) -> R) -> R {
        let mut stream = self.inner.lock();
        f(&mut stream)
    }
}

impl<W: Write> From<LogStream<W>> for SharedLogStream<W> {
    fn from(stream: LogStream<W>) -> Self {
        Self::new(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_shared_lines_do_not_interleave() {
        let mut stream = LogStream::with_capacity(Vec::new(), 8).unwrap();
        stream.set_level(Severity::Debug);
        let shared = SharedLogStream::new(stream);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for j in 0..25 {
                        shared
                            .log(Severity::Info, &format!("thread {i} message {j} padded"))
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().is_ok());
        }

        let out = shared.with_stream(|stream| String::from_utf8(stream.destination().clone()).unwrap());
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 200);
        for line in lines {
            assert_eq!(line.matches("[INFO]").count(), 1, "line: {line}");
            assert!(line.ends_with(" padded"), "line: {line}");
        }
    }

    #[test]
    fn test_shared_mask_updates() {
        let shared = SharedLogStream::from(LogStream::with_destination(Vec::new()));
        let mask = shared.set_level(Severity::Err);
        assert_eq!(shared.set_mask(SeverityMask::EMPTY), mask);
        assert_eq!(shared.mask(), mask);
        assert_eq!(shared.set_line_prefix("pid 7: "), "");
    }
}
