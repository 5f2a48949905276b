//! Formatters render a record into bytes

pub mod json;
pub mod pattern;

pub use json::{JsonFormatter, JsonFormatterBuilder};
pub use pattern::{
    severity_colored_names, severity_names, LeftoverOption, OptionalOption, Options,
    PatternFormatter, PlaceholderOption, SeverityMap, Spec,
};

use crate::core::error::Result;
use crate::core::record::Record;
use crate::core::writer::Writer;

pub trait Formatter: Send + Sync {
    fn format(&self, record: &Record<'_>, writer: &mut Writer) -> Result<()>;
}
