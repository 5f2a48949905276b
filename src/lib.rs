//! # umbralog
//!
//! A structured logging library built around an immutable record pipeline
//! and compile-once formatters.
//!
//! ## Features
//!
//! - **Typed attributes**: borrowed attribute packs and thread-local scoped
//!   frames, composed per record
//! - **Pattern formatter**: a brace template compiled once into tokens,
//!   rendered many times with printf-like specifications
//! - **JSON formatter**: compact trees with RFC 6901 routing and renaming
//! - **Thread safe**: copy-on-write logger configuration; handlers run on
//!   the calling thread
//!
//! ```
//! use umbralog::{severity, BlockingHandler, Logger, MemorySink, PatternFormatter};
//!
//! let sink = MemorySink::new();
//! let formatter = PatternFormatter::new("{severity:d}: {message}").unwrap();
//! let logger = Logger::builder()
//!     .threshold(severity::INFO)
//!     .handler(BlockingHandler::new(formatter).sink(sink.clone()))
//!     .build();
//!
//! logger.log(severity::WARN, "disk space low");
//! assert_eq!(sink.strings(), vec!["3: disk space low"]);
//! ```

pub mod core;
pub mod formatters;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        severity, Attribute, AttributeList, AttributePack, BlockingHandler, Error, Handler,
        Logger, LoggerBuilder, Record, Result, ScopeGuard, Value, Writer,
    };
    pub use crate::formatters::{
        Formatter, JsonFormatter, JsonFormatterBuilder, PatternFormatter,
    };
    pub use crate::sinks::{ConsoleSink, FileSink, MemorySink, Sink};
}

pub use crate::core::{
    severity, Attribute, AttributeList, AttributePack, BlockingHandler, Error, Filter,
    FormatCallback, Generator, Handler, Logger, LoggerBuilder, Record, Result, ScopeGuard, Value,
    Writer,
};
pub use crate::formatters::{
    severity_colored_names, severity_names, Formatter, JsonFormatter, JsonFormatterBuilder,
    LeftoverOption, OptionalOption, Options, PatternFormatter, PlaceholderOption, SeverityMap,
    Spec,
};
pub use crate::sinks::{ConsoleSink, FileSink, MemorySink, Sink};
