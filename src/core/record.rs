//! Immutable log record snapshot

use super::attribute::AttributePack;
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::sync::OnceLock;

static PID: OnceLock<u32> = OnceLock::new();
static PROCESS_NAME: OnceLock<String> = OnceLock::new();

// Thread-local caches for thread information to avoid repeated lookups
thread_local! {
    static TID: Cell<Option<u64>> = const { Cell::new(None) };
    static THREAD_NAME: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// OS process id, cached once per process.
pub(crate) fn pid() -> u32 {
    *PID.get_or_init(std::process::id)
}

/// Short process name, cached once per process. Falls back to the pid when
/// the executable path is unavailable.
pub(crate) fn process_name() -> &'static str {
    PROCESS_NAME.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| pid().to_string())
    })
}

/// Platform-independent thread id, cached per thread.
pub(crate) fn tid() -> u64 {
    TID.with(|cache| match cache.get() {
        Some(id) => id,
        None => {
            let id = current_thread_id();
            cache.set(Some(id));
            id
        }
    })
}

/// Get cached thread name, computing and caching it on first access
pub(crate) fn thread_name() -> Option<String> {
    THREAD_NAME.with(|cache| {
        let mut cache = cache.borrow_mut();
        if cache.is_none() {
            *cache = Some(std::thread::current().name().map(String::from));
        }
        cache
            .as_ref()
            .expect("thread name cache initialized in previous line")
            .clone()
    })
}

// std's ThreadId is opaque; its debug form carries the per-thread integer.
fn current_thread_id() -> u64 {
    let repr = format!("{:?}", std::thread::current().id());
    let digits: String = repr.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Immutable snapshot of a single log event.
///
/// The `message` is the uninterpolated pattern supplied by the caller (e.g.
/// `"GET {url}"`). After the caller's format callback runs, [`activate`]
/// stores the interpolated result; formatters prefer it when present.
///
/// [`activate`]: Record::activate
#[derive(Debug)]
pub struct Record<'a> {
    severity: i32,
    message: &'a str,
    attributes: &'a AttributePack<'a>,
    timestamp: DateTime<Utc>,
    pid: u32,
    tid: u64,
    formatted: Option<&'a str>,
}

impl<'a> Record<'a> {
    /// Capture a snapshot: wall-clock timestamp, pid and tid are taken here.
    pub fn new(severity: i32, message: &'a str, attributes: &'a AttributePack<'a>) -> Self {
        Self {
            severity,
            message,
            attributes,
            timestamp: Utc::now(),
            pid: pid(),
            tid: tid(),
            formatted: None,
        }
    }

    /// Store the interpolated message. One-shot; the formatted text must
    /// outlive every handler's view of this record.
    ///
    /// # Panics
    ///
    /// Panics when called twice; that is a programming error.
    pub fn activate(&mut self, formatted: &'a str) {
        assert!(self.formatted.is_none(), "record activated twice");
        self.formatted = Some(formatted);
    }

    pub fn severity(&self) -> i32 {
        self.severity
    }

    pub fn message(&self) -> &'a str {
        self.message
    }

    pub fn attributes(&self) -> &'a AttributePack<'a> {
        self.attributes
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn tid(&self) -> u64 {
        self.tid
    }

    pub fn formatted(&self) -> Option<&'a str> {
        self.formatted
    }

    /// Formatted message when activated, the raw pattern otherwise.
    pub fn text(&self) -> &'a str {
        self.formatted.unwrap_or(self.message)
    }

    /// Build a record with every field pinned, for deterministic formatter
    /// tests.
    #[cfg(test)]
    pub(crate) fn with_parts(
        severity: i32,
        message: &'a str,
        attributes: &'a AttributePack<'a>,
        timestamp: DateTime<Utc>,
        pid: u32,
        tid: u64,
    ) -> Self {
        Self {
            severity,
            message,
            attributes,
            timestamp,
            pid,
            tid,
            formatted: None,
        }
    }
}
