//! Sink implementations: byte-level log destinations

pub mod console;
pub mod file;
pub mod memory;

pub use console::ConsoleSink;
pub use file::FileSink;
pub use memory::MemorySink;

use crate::core::error::Result;

/// Byte-level destination for rendered records.
///
/// Sinks may block; the calling thread waits. Line-oriented sinks append a
/// trailing newline when the payload does not already end with one, so a
/// formatter-supplied newline is never doubled.
pub trait Sink: Send {
    fn emit(&mut self, bytes: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
