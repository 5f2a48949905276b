//! Logging macros for ergonomic record emission.
//!
//! The macros build an attribute pack, pass the format string through as the
//! record's message pattern, and interpolate lazily via the logger's format
//! callback, so the work happens only for records that pass the filter.
//!
//! # Examples
//!
//! ```
//! use umbralog::{severity, Logger};
//! use umbralog::info;
//!
//! let logger = Logger::new();
//!
//! // Basic logging
//! info!(logger, "server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "listening on port {}", port);
//!
//! // With attributes
//! info!(logger, "request finished"; "status" => 200, "path" => "/index.html");
//! ```

/// Build an [`AttributeList`](crate::AttributeList) from `name => value`
/// pairs.
///
/// # Examples
///
/// ```
/// use umbralog::attributes;
///
/// let list = attributes!["key" => 42, "ip" => "[::]"];
/// assert_eq!(list.len(), 2);
/// ```
#[macro_export]
macro_rules! attributes {
    () => {
        $crate::AttributeList::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut list = $crate::AttributeList::new();
        $(
            list.push($crate::Attribute::new($name, $value));
        )+
        list
    }};
}

/// Log a message at an explicit severity.
///
/// # Examples
///
/// ```
/// # use umbralog::{severity, Logger};
/// # let logger = Logger::new();
/// use umbralog::log;
/// log!(logger, severity::INFO, "simple message");
/// log!(logger, severity::ERROR, "error code: {}", 500);
/// log!(logger, severity::INFO, "user action"; "user_id" => 42);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $severity:expr, $fmt:literal $(, $arg:expr)* ; $($name:expr => $value:expr),+ $(,)?) => {{
        let attributes = $crate::attributes!($($name => $value),+);
        let mut pack = $crate::AttributePack::new();
        pack.push(&attributes);
        $logger.log_fmt($severity, $fmt, &pack, &|writer: &mut $crate::Writer| {
            use ::std::fmt::Write as _;
            let _ = ::std::write!(writer, $fmt $(, $arg)*);
        });
    }};
    ($logger:expr, $severity:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let pack = $crate::AttributePack::new();
        $logger.log_fmt($severity, $fmt, &pack, &|writer: &mut $crate::Writer| {
            use ::std::fmt::Write as _;
            let _ = ::std::write!(writer, $fmt $(, $arg)*);
        });
    }};
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::severity::TRACE, $($rest)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::severity::DEBUG, $($rest)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::severity::INFO, $($rest)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::severity::WARN, $($rest)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::severity::ERROR, $($rest)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::severity::FATAL, $($rest)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::{severity, BlockingHandler, Logger, MemorySink, PatternFormatter};

    fn capturing_logger(pattern: &str) -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        let formatter = PatternFormatter::new(pattern).unwrap();
        let logger = Logger::builder()
            .handler(BlockingHandler::new(formatter).sink(sink.clone()))
            .build();
        (logger, sink)
    }

    #[test]
    fn test_log_macro_interpolates() {
        let (logger, sink) = capturing_logger("{message}");

        log!(logger, severity::INFO, "value: {}", 42);

        assert_eq!(sink.strings(), vec!["value: 42"]);
    }

    #[test]
    fn test_log_macro_with_attributes() {
        let (logger, sink) = capturing_logger("{message} [{status}]");

        log!(logger, severity::INFO, "request finished"; "status" => 200);

        assert_eq!(sink.strings(), vec!["request finished [200]"]);
    }

    #[test]
    fn test_level_macros() {
        let (logger, sink) = capturing_logger("{severity}: {message}");

        trace!(logger, "t");
        debug!(logger, "d");
        info!(logger, "i");
        warn!(logger, "w");
        error!(logger, "e");
        fatal!(logger, "f");

        assert_eq!(
            sink.strings(),
            vec!["0: t", "1: d", "2: i", "3: w", "4: e", "5: f"]
        );
    }

    #[test]
    fn test_attributes_macro() {
        let list = attributes!["key" => 42, "ip" => "[::]"];
        assert_eq!(list.len(), 2);

        let empty = attributes![];
        assert!(empty.is_empty());
    }
}
