pub mod header;
pub mod stream_buf;

pub use header::{TIMESTAMP_FORMAT, line_header};
pub use stream_buf::{DEFAULT_BUFFER_CAPACITY, LogStreamBuf, MIN_BUFFER_CAPACITY};
