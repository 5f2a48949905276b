//! Byte writer with a small stack-resident buffer
//!
//! Formatters render records into a [`Writer`]. The buffer lives on the
//! stack until it outgrows [`INLINE_CAPACITY`] bytes, then spills to the
//! heap, which keeps the hot path allocation-free for typical log lines.

use smallvec::SmallVec;
use std::fmt;
use std::io;

/// Bytes held inline before the buffer spills to the heap.
pub const INLINE_CAPACITY: usize = 128;

#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: SmallVec<[u8; INLINE_CAPACITY]>,
}

impl Writer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: SmallVec::new(),
        }
    }

    /// Append raw bytes to the buffer.
    pub fn write(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrowed view of everything written so far.
    pub fn as_view(&self) -> &[u8] {
        &self.buf
    }

    /// Whether the buffer has moved to the heap.
    pub fn spilled(&self) -> bool {
        self.buf.spilled()
    }
}

impl fmt::Write for Writer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

impl io::Write for Writer {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
