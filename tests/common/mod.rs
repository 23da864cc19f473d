#![allow(dead_code)]

use logstream::buffer::header::TIMESTAMP_WIDTH;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// In-memory destination recording each write call separately.
#[derive(Clone, Default)]
pub struct Capture {
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.writes.lock().concat()).unwrap()
    }

    pub fn write_calls(&self) -> Vec<String> {
        self.writes
            .lock()
            .iter()
            .map(|w| String::from_utf8(w.clone()).unwrap())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.lock().is_empty()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.lock().push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Splits an emitted line into (timestamp, label, rest).
pub fn split_line(line: &str) -> (&str, &str, &str) {
    let (timestamp, rest) = line.split_at(TIMESTAMP_WIDTH);
    let rest = rest.strip_prefix(" [").expect("label opener");
    let (label, rest) = rest.split_at(4);
    let rest = rest.strip_prefix("] ").expect("label closer");
    (timestamp, label, rest)
}
