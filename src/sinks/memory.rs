//! In-memory sink for tests and capture

use super::Sink;
use crate::core::error::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// Records every emitted payload in memory, one entry per emit.
///
/// Clones share the same buffer, so a handle kept outside the handler can
/// inspect what the pipeline produced.
#[derive(Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every payload emitted so far, in order.
    pub fn emitted(&self) -> Vec<Vec<u8>> {
        self.buffer.lock().clone()
    }

    /// Emitted payloads decoded as strings.
    pub fn strings(&self) -> Vec<String> {
        self.buffer
            .lock()
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Sink for MemorySink {
    fn emit(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.lock().push(bytes.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
