//! Console sink implementation

use super::Sink;
use crate::core::error::Result;
use std::io::{self, Write};

/// Writes each record to standard output, or standard error when built with
/// [`ConsoleSink::stderr`], one line per emit.
pub struct ConsoleSink {
    use_stderr: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self { use_stderr: false }
    }

    pub fn stderr() -> Self {
        Self { use_stderr: true }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn emit(&mut self, bytes: &[u8]) -> Result<()> {
        if self.use_stderr {
            let mut out = io::stderr().lock();
            out.write_all(bytes)?;
            if !bytes.ends_with(b"\n") {
                out.write_all(b"\n")?;
            }
        } else {
            let mut out = io::stdout().lock();
            out.write_all(bytes)?;
            if !bytes.ends_with(b"\n") {
                out.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.use_stderr {
            io::stderr().flush()?;
        } else {
            io::stdout().flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
