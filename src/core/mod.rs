//! Core record pipeline: attributes, records, scoped frames, the root
//! logger and its handler contract

pub mod attribute;
pub mod datetime;
pub mod error;
pub mod handler;
pub mod logger;
pub mod record;
pub mod scoped;
pub mod severity;
pub mod writer;

pub use attribute::{Attribute, AttributeList, AttributePack, Value};
pub use datetime::Generator;
pub use error::{Error, Result};
pub use handler::{BlockingHandler, Handler};
pub use logger::{Filter, FormatCallback, Logger, LoggerBuilder};
pub use record::Record;
pub use scoped::ScopeGuard;
pub use writer::Writer;
