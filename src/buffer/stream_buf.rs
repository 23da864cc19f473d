use super::header;
use crate::domain::{LogStreamError, Severity, SeverityMask};
use std::io::Write;
use tracing::{debug, trace, warn};

pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;
pub const MIN_BUFFER_CAPACITY: usize = 2;

/// Buffered, severity-filtering line writer.
///
/// Bytes are held in a fixed-size buffer until the buffer fills, the caller
/// flushes, or the severity changes. At that point the buffered bytes are
/// emitted: a header is written once per logical line, followed by the
/// buffered bytes, each in a single write call. Bytes whose severity is not
/// enabled by the mask are discarded without touching the destination.
///
/// Not internally synchronized. Use
/// [`SharedLogStream`](crate::stream::SharedLogStream) when several threads
/// log to one destination.
pub struct LogStreamBuf<W: Write> {
    destination: W,
    storage: Box<[u8]>,
    len: usize,
    severity: Severity,
    mask: SeverityMask,
    prefix: String,
    continuation: bool,
}

impl<W: Write> LogStreamBuf<W> {
    pub fn new(destination: W) -> Self {
        Self::from_storage(destination, vec![0; DEFAULT_BUFFER_CAPACITY].into_boxed_slice())
    }

    pub fn with_capacity(destination: W, capacity: usize) -> Result<Self, LogStreamError> {
        if capacity < MIN_BUFFER_CAPACITY {
            return Err(LogStreamError::InvalidCapacity {
                capacity,
                minimum: MIN_BUFFER_CAPACITY,
            });
        }
        Ok(Self::from_storage(
            destination,
            vec![0; capacity].into_boxed_slice(),
        ))
    }

    fn from_storage(destination: W, storage: Box<[u8]>) -> Self {
        Self {
            destination,
            storage,
            len: 0,
            severity: Severity::Debug,
            mask: SeverityMask::default(),
            prefix: String::new(),
            continuation: false,
        }
    }

    /// Appends as much of `bytes` as possible and returns the count taken.
    ///
    /// A full buffer is emitted before more bytes are copied in. Overflow
    /// emission happens mid-line and keeps the continuation flag, so a long
    /// line still carries a single header. An emission failure after some
    /// of `bytes` were taken ends the call early with that count; the
    /// failure surfaces on the next write or flush. An `Err` therefore
    /// always means nothing from this call was buffered. Nothing is
    /// retried.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, LogStreamError> {
        let mut accepted = 0;
        match self.append(bytes, &mut accepted) {
            Ok(()) => Ok(accepted),
            Err(error) if accepted > 0 => {
                debug!(%error, accepted, "emission failed mid-write, returning partial count");
                Ok(accepted)
            }
            Err(error) => Err(error),
        }
    }

    /// Appends all of `bytes`, making a single emission attempt for each
    /// time the buffer fills. On failure the bytes taken so far stay
    /// buffered, the rest are dropped and the error is returned.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), LogStreamError> {
        let mut accepted = 0;
        self.append(bytes, &mut accepted)
    }

    fn append(&mut self, bytes: &[u8], accepted: &mut usize) -> Result<(), LogStreamError> {
        while *accepted < bytes.len() {
            if self.is_full() {
                self.emit()?;
            }

            let take = (self.storage.len() - self.len).min(bytes.len() - *accepted);
            self.storage[self.len..self.len + take]
                .copy_from_slice(&bytes[*accepted..*accepted + take]);
            self.len += take;
            *accepted += take;
        }
        Ok(())
    }

    /// Emits whatever is buffered without ending the current line.
    pub fn flush(&mut self) -> Result<usize, LogStreamError> {
        self.emit()
    }

    /// Emits whatever is buffered and ends the current line, so the next
    /// write opens a new header.
    pub fn sync(&mut self) -> Result<usize, LogStreamError> {
        let flushed = self.emit()?;
        self.destination
            .flush()
            .map_err(|e| LogStreamError::WriteFailed {
                written: 0,
                expected: 0,
                source: Some(e),
            })?;
        self.continuation = false;
        Ok(flushed)
    }

    /// Resolves buffered bytes under the current severity, then switches.
    /// Returns the previous severity.
    pub fn set_severity(&mut self, severity: Severity) -> Result<Severity, LogStreamError> {
        self.sync()?;
        Ok(std::mem::replace(&mut self.severity, severity))
    }

    /// Replaces the mask and returns the previous one. An empty mask means
    /// "no change" and leaves the current mask in place.
    pub fn set_mask(&mut self, mask: SeverityMask) -> SeverityMask {
        if mask.is_empty() {
            return self.mask;
        }
        std::mem::replace(&mut self.mask, mask)
    }

    /// Replaces the header prefix. A line whose header is already written
    /// keeps the old prefix.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) -> String {
        std::mem::replace(&mut self.prefix, prefix.into())
    }

    /// Swaps in caller-supplied buffer storage, taking ownership of it and
    /// releasing the old storage.
    ///
    /// Returns `Ok(false)` without changing anything when `storage` is
    /// `None` or shorter than two bytes. Pending bytes are emitted before
    /// the swap.
    pub fn set_buffer(&mut self, storage: Option<Box<[u8]>>) -> Result<bool, LogStreamError> {
        let Some(storage) = storage.filter(|s| s.len() >= MIN_BUFFER_CAPACITY) else {
            return Ok(false);
        };

        self.emit()?;
        self.storage = storage;
        Ok(true)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn mask(&self) -> SeverityMask {
        self.mask
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Bytes accepted but not yet emitted.
    pub fn buffered(&self) -> &[u8] {
        &self.storage[..self.len]
    }

    pub fn is_continuation(&self) -> bool {
        self.continuation
    }

    pub fn get_ref(&self) -> &W {
        &self.destination
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.destination
    }

    fn is_full(&self) -> bool {
        self.len == self.storage.len()
    }

    fn emit(&mut self) -> Result<usize, LogStreamError> {
        if self.len == 0 {
            return Ok(0);
        }

        if !self.mask.contains(self.severity) {
            trace!(
                severity = %self.severity,
                mask = %self.mask,
                discarded = self.len,
                "severity filtered out, discarding buffered bytes"
            );
            self.len = 0;
            return Ok(0);
        }

        if !self.continuation {
            let header = header::line_header(self.severity, &self.prefix);
            write_once(&mut self.destination, header.as_bytes())?;
            self.continuation = true;
        }

        let pending = self.len;
        write_once(&mut self.destination, &self.storage[..pending])?;
        self.len = 0;
        Ok(pending)
    }
}

fn write_once<W: Write>(destination: &mut W, bytes: &[u8]) -> Result<(), LogStreamError> {
    match destination.write(bytes) {
        Ok(written) if written == bytes.len() => Ok(()),
        Ok(written) => {
            debug!(written, expected = bytes.len(), "short write to log destination");
            Err(LogStreamError::WriteFailed {
                written,
                expected: bytes.len(),
                source: None,
            })
        }
        Err(e) => {
            debug!(error = %e, "write to log destination failed");
            Err(LogStreamError::WriteFailed {
                written: 0,
                expected: bytes.len(),
                source: Some(e),
            })
        }
    }
}

impl<W: Write> Drop for LogStreamBuf<W> {
    fn drop(&mut self) {
        if let Err(error) = self.sync() {
            warn!(%error, "failed to flush log stream buffer on drop");
        }
    }
}

impl<W: Write> std::fmt::Debug for LogStreamBuf<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStreamBuf")
            .field("capacity", &self.storage.len())
            .field("buffered", &self.len)
            .field("severity", &self.severity)
            .field("mask", &self.mask)
            .field("prefix", &self.prefix)
            .field("continuation", &self.continuation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::header::TIMESTAMP_WIDTH;

    fn output(buf: &LogStreamBuf<Vec<u8>>) -> String {
        String::from_utf8(buf.get_ref().clone()).unwrap()
    }

    fn debug_buf(capacity: usize) -> LogStreamBuf<Vec<u8>> {
        let mut buf = LogStreamBuf::with_capacity(Vec::new(), capacity).unwrap();
        buf.set_mask(SeverityMask::ALL);
        buf
    }

    #[test]
    fn test_defaults() {
        let buf = LogStreamBuf::new(Vec::new());
        assert_eq!(buf.capacity(), DEFAULT_BUFFER_CAPACITY);
        assert_eq!(buf.severity(), Severity::Debug);
        assert_eq!(buf.mask(), SeverityMask::EMERG_ONLY);
        assert!(buf.prefix().is_empty());
        assert!(!buf.is_continuation());
    }

    #[test]
    fn test_capacity_below_minimum_is_rejected() {
        let error = LogStreamBuf::with_capacity(Vec::new(), 1).unwrap_err();
        assert!(matches!(
            error,
            LogStreamError::InvalidCapacity { capacity: 1, .. }
        ));
    }

    #[test]
    fn test_bytes_stay_buffered_until_flush() {
        let mut buf = debug_buf(64);
        assert_eq!(buf.write(b"pending").unwrap(), 7);
        assert!(buf.get_ref().is_empty());
        assert_eq!(buf.buffered(), b"pending");

        assert_eq!(buf.flush().unwrap(), 7);
        assert!(buf.buffered().is_empty());
        assert!(output(&buf).ends_with("[DEBG] pending"));
    }

    #[test]
    fn test_flush_on_empty_buffer_is_noop() {
        let mut buf = debug_buf(16);
        assert_eq!(buf.flush().unwrap(), 0);
        assert_eq!(buf.sync().unwrap(), 0);
        assert!(buf.get_ref().is_empty());
    }

    #[test]
    fn test_flush_keeps_continuation_and_sync_clears_it() {
        let mut buf = debug_buf(64);
        buf.write(b"part one, ").unwrap();
        buf.flush().unwrap();
        assert!(buf.is_continuation());

        buf.write(b"part two\n").unwrap();
        buf.sync().unwrap();
        assert!(!buf.is_continuation());

        let out = output(&buf);
        assert_eq!(out.matches("[DEBG]").count(), 1);
        assert!(out.ends_with("[DEBG] part one, part two\n"));
    }

    #[test]
    fn test_filtered_bytes_are_discarded() {
        let mut buf = LogStreamBuf::with_capacity(Vec::new(), 16).unwrap();
        buf.write(b"not for you").unwrap();
        assert_eq!(buf.sync().unwrap(), 0);
        assert!(buf.get_ref().is_empty());
        assert!(buf.buffered().is_empty());
        assert!(!buf.is_continuation());
    }

    #[test]
    fn test_overflow_emits_without_new_header() {
        let mut buf = debug_buf(4);
        buf.write(b"abcdefghij").unwrap();
        assert_eq!(buf.buffered(), b"ij");
        buf.sync().unwrap();

        let out = output(&buf);
        assert_eq!(out.len(), TIMESTAMP_WIDTH + " [DEBG] ".len() + 10);
        assert!(out.ends_with("[DEBG] abcdefghij"));
    }

    #[test]
    fn test_full_buffer_waits_for_next_byte() {
        let mut buf = debug_buf(4);
        buf.write(b"abcd").unwrap();
        assert!(buf.get_ref().is_empty());
        assert_eq!(buf.buffered(), b"abcd");

        buf.write_all(b"ef").unwrap();
        assert_eq!(buf.buffered(), b"ef");
        assert!(output(&buf).ends_with("[DEBG] abcd"));
        buf.sync().unwrap();

        let out = output(&buf);
        assert_eq!(out.len(), TIMESTAMP_WIDTH + " [DEBG] ".len() + 6);
        assert!(out.ends_with("[DEBG] abcdef"));
    }

    #[test]
    fn test_set_severity_flushes_under_old_severity() {
        let mut buf = debug_buf(64);
        assert_eq!(buf.set_severity(Severity::Info).unwrap(), Severity::Debug);
        buf.write(b"first\n").unwrap();
        assert_eq!(buf.set_severity(Severity::Err).unwrap(), Severity::Info);
        buf.write(b"second\n").unwrap();
        buf.sync().unwrap();

        let out = output(&buf);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[INFO] first"));
        assert!(lines[1].ends_with("[EROR] second"));
    }

    #[test]
    fn test_set_mask_zero_is_noop() {
        let mut buf = LogStreamBuf::new(Vec::new());
        let previous = buf.set_mask(SeverityMask::up_to(Severity::Notice));
        assert_eq!(previous, SeverityMask::EMERG_ONLY);
        assert_eq!(
            buf.set_mask(SeverityMask::EMPTY),
            SeverityMask::up_to(Severity::Notice)
        );
        assert_eq!(buf.mask(), SeverityMask::up_to(Severity::Notice));
    }

    #[test]
    fn test_prefix_applies_from_next_header() {
        let mut buf = debug_buf(64);
        assert_eq!(buf.set_prefix("old: "), "");
        buf.write(b"a").unwrap();
        buf.flush().unwrap();

        assert_eq!(buf.set_prefix("new: "), "old: ");
        buf.write(b"b\n").unwrap();
        buf.sync().unwrap();
        buf.write(b"c\n").unwrap();
        buf.sync().unwrap();

        let out = output(&buf);
        let lines: Vec<_> = out.lines().collect();
        assert!(lines[0].ends_with("[DEBG] old: ab"));
        assert!(lines[1].ends_with("[DEBG] new: c"));
    }

    #[test]
    fn test_set_buffer_rejects_small_or_missing_storage() {
        let mut buf = debug_buf(32);
        assert!(!buf.set_buffer(None).unwrap());
        assert!(!buf.set_buffer(Some(vec![0u8; 1].into_boxed_slice())).unwrap());
        assert_eq!(buf.capacity(), 32);
    }

    #[test]
    fn test_set_buffer_swaps_storage_and_keeps_order() {
        let mut buf = debug_buf(32);
        buf.write(b"before ").unwrap();
        assert!(buf.set_buffer(Some(vec![0u8; 3].into_boxed_slice())).unwrap());
        assert_eq!(buf.capacity(), 3);
        buf.write(b"after\n").unwrap();
        buf.sync().unwrap();

        assert!(output(&buf).ends_with("[DEBG] before after\n"));
    }
}
