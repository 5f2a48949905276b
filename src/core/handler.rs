//! Handler contract and the default blocking implementation

use super::error::Result;
use super::record::Record;
use super::writer::Writer;
use crate::formatters::Formatter;
use crate::sinks::Sink;
use parking_lot::Mutex;

/// Consumer of accepted records.
///
/// The logger invokes handlers from whatever thread the log call happens on
/// and does not serialize them; implementations must tolerate concurrent
/// `execute` calls.
pub trait Handler: Send + Sync {
    fn execute(&self, record: &Record<'_>) -> Result<()>;
}

/// Default handler: one formatter, one or more sinks, everything on the
/// calling thread. A slow sink blocks the caller.
pub struct BlockingHandler {
    formatter: Box<dyn Formatter>,
    sinks: Mutex<Vec<Box<dyn Sink>>>,
}

impl BlockingHandler {
    pub fn new(formatter: impl Formatter + 'static) -> Self {
        Self {
            formatter: Box::new(formatter),
            sinks: Mutex::new(Vec::new()),
        }
    }

    /// Add a sink, builder-style. Sinks receive each rendered record in the
    /// order they were added.
    #[must_use]
    pub fn sink(self, sink: impl Sink + 'static) -> Self {
        self.sinks.lock().push(Box::new(sink));
        self
    }

    pub fn flush(&self) -> Result<()> {
        let mut sinks = self.sinks.lock();
        for sink in sinks.iter_mut() {
            sink.flush()?;
        }
        Ok(())
    }
}

impl Handler for BlockingHandler {
    fn execute(&self, record: &Record<'_>) -> Result<()> {
        let mut writer = Writer::new();
        self.formatter.format(record, &mut writer)?;

        let mut sinks = self.sinks.lock();
        for sink in sinks.iter_mut() {
            sink.emit(writer.as_view())?;
        }
        Ok(())
    }
}
