//! Root logger: copy-on-write configuration and record dispatch

use super::attribute::{AttributeList, AttributePack};
use super::handler::Handler;
use super::record::Record;
use super::scoped::{self, ScopeGuard};
use super::writer::Writer;
use parking_lot::Mutex;
use std::borrow::Cow;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Record predicate. Filters are pure; a record rejected here is dropped
/// silently.
pub type Filter = Arc<dyn Fn(&Record<'_>) -> bool + Send + Sync>;

/// Caller-supplied callback that writes the interpolated message body.
pub type FormatCallback<'a> = dyn Fn(&mut Writer) + 'a;

/// Immutable once published; mutation replaces the whole bundle.
struct Inner {
    filter: Filter,
    handlers: Vec<Arc<dyn Handler>>,
}

/// The root logger.
///
/// Readers take one short mutex acquisition to load the current
/// `(filter, handlers)` bundle; writers install a new bundle wholesale, and
/// readers in flight keep the old one alive through their `Arc`. The logger
/// is movable but not clonable.
pub struct Logger {
    inner: Mutex<Arc<Inner>>,
}

impl Logger {
    /// A logger that accepts every record and has no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Arc::new(Inner {
                filter: Arc::new(|_| true),
                handlers: Vec::new(),
            })),
        }
    }

    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Log with no attributes and no format callback.
    pub fn log(&self, severity: i32, pattern: &str) {
        let pack = AttributePack::new();
        self.consume(severity, pattern, &pack, None);
    }

    /// Log with a caller-supplied attribute pack. The pack's lists must
    /// outlive the call.
    pub fn log_with(&self, severity: i32, pattern: &str, pack: &AttributePack<'_>) {
        self.consume(severity, pattern, pack, None);
    }

    /// Log with a pack and a format callback; the callback writes the
    /// interpolated message the record is activated with.
    pub fn log_fmt(
        &self,
        severity: i32,
        pattern: &str,
        pack: &AttributePack<'_>,
        format: &FormatCallback<'_>,
    ) {
        self.consume(severity, pattern, pack, Some(format));
    }

    /// Atomically swap the filter. Readers in flight keep the old bundle
    /// alive until they finish.
    pub fn filter(&self, filter: impl Fn(&Record<'_>) -> bool + Send + Sync + 'static) {
        let mut guard = self.inner.lock();
        *guard = Arc::new(Inner {
            filter: Arc::new(filter),
            handlers: guard.handlers.clone(),
        });
    }

    /// Replace the handler set wholesale. Handler arrays are never mutated
    /// in place.
    pub fn handlers(&self, handlers: Vec<Arc<dyn Handler>>) {
        let mut guard = self.inner.lock();
        *guard = Arc::new(Inner {
            filter: guard.filter.clone(),
            handlers,
        });
    }

    /// Push a scoped attribute frame for the current thread. Records logged
    /// while the returned guard is live see these attributes, innermost
    /// frame first.
    pub fn scoped(&self, attributes: AttributeList<'static>) -> ScopeGuard {
        scoped::push(attributes)
    }

    fn consume(
        &self,
        severity: i32,
        pattern: &str,
        pack: &AttributePack<'_>,
        format: Option<&FormatCallback<'_>>,
    ) {
        let inner = Arc::clone(&self.inner.lock());

        let frames = scoped::snapshot();
        let mut full = AttributePack::new();
        for &list in pack.lists() {
            full.push(list);
        }
        for frame in &frames {
            full.push(frame.attributes());
        }

        // The writer stays on this stack frame so the formatted message
        // outlives the record's exposure to handlers.
        let mut writer = Writer::new();
        let mut formatted: Option<Cow<'_, str>> = None;

        let mut record = Record::new(severity, pattern, &full);
        if !(inner.filter)(&record) {
            return;
        }

        if let Some(format) = format {
            format(&mut writer);
            formatted = Some(String::from_utf8_lossy(writer.as_view()));
        }
        if let Some(text) = formatted.as_deref() {
            record.activate(text);
        }

        for handler in &inner.handlers {
            let outcome = catch_unwind(AssertUnwindSafe(|| handler.execute(&record)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    eprintln!("[LOGGER ERROR] handler failed: {}", err);
                }
                Err(_) => {
                    eprintln!("[LOGGER ERROR] handler panicked; remaining handlers continue");
                }
            }
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use umbralog::{severity, BlockingHandler, JsonFormatter, Logger, MemorySink};
///
/// let logger = Logger::builder()
///     .threshold(severity::INFO)
///     .handler(BlockingHandler::new(JsonFormatter::new()).sink(MemorySink::new()))
///     .build();
/// ```
pub struct LoggerBuilder {
    filter: Filter,
    handlers: Vec<Arc<dyn Handler>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            filter: Arc::new(|_| true),
            handlers: Vec::new(),
        }
    }

    /// Set the record filter
    #[must_use = "builder methods return a new value"]
    pub fn filter(mut self, filter: impl Fn(&Record<'_>) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    /// Accept only records at or above the given severity
    #[must_use = "builder methods return a new value"]
    pub fn threshold(mut self, severity: i32) -> Self {
        self.filter = Arc::new(move |record| record.severity() >= severity);
        self
    }

    /// Add a handler
    #[must_use = "builder methods return a new value"]
    pub fn handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        Logger {
            inner: Mutex::new(Arc::new(Inner {
                filter: self.filter,
                handlers: self.handlers,
            })),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
