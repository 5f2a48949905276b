//! JSON formatter with attribute routing and renaming
//!
//! Builds a JSON tree for every record and serializes it compactly: no
//! spaces, strings escaped per RFC 8259, numbers in shortest round-trippable
//! form. Routing places named attributes at an RFC 6901 JSON pointer;
//! renaming happens after routing. By default duplicate keys are allowed and
//! emitted in insertion order, which most log parsers accept; the `unique`
//! option buffers each object and makes later writes overwrite earlier ones
//! in place.
//!
//! ```
//! use umbralog::JsonFormatter;
//!
//! let formatter = JsonFormatter::builder()
//!     .route_attributes("/fields", &["message", "severity"])
//!     .rename("message", "#message")
//!     .newline()
//!     .build()
//!     .unwrap();
//! # let _ = formatter;
//! ```

use super::Formatter;
use crate::core::error::{Error, Result};
use crate::core::record::Record;
use crate::core::writer::Writer;
use serde_json::Value as Json;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Object(Vec<(String, Node)>),
    Leaf(Json),
}

/// Streaming-style builder for [`JsonFormatter`].
///
/// `build` parses every route path; a malformed pointer fails construction.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatterBuilder {
    default_route: String,
    routes: Vec<(String, Vec<String>)>,
    renames: Vec<(String, String)>,
    unique: bool,
    newline: bool,
}

impl JsonFormatterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location for otherwise-unrouted attributes. The last call
    /// wins; without one, attributes land in the root object.
    #[must_use]
    pub fn route(mut self, path: impl Into<String>) -> Self {
        self.default_route = path.into();
        self
    }

    /// Attach the named attributes to a JSON pointer path.
    #[must_use]
    pub fn route_attributes(mut self, path: impl Into<String>, names: &[&str]) -> Self {
        self.routes
            .push((path.into(), names.iter().map(|s| s.to_string()).collect()));
        self
    }

    /// Rename an attribute after routing. The new name may collide with
    /// another attribute.
    #[must_use]
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.push((from.into(), to.into()));
        self
    }

    /// Enforce name uniqueness within each object; later writes to the same
    /// key overwrite earlier ones in place.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Append a single `\n` after the root object's closing brace.
    #[must_use]
    pub fn newline(mut self) -> Self {
        self.newline = true;
        self
    }

    pub fn build(self) -> Result<JsonFormatter> {
        let default_route = parse_pointer(&self.default_route)?;
        let mut routes = HashMap::new();
        for (path, names) in self.routes {
            let tokens = parse_pointer(&path)?;
            for name in names {
                routes.insert(name, tokens.clone());
            }
        }
        Ok(JsonFormatter {
            default_route,
            routes,
            renames: self.renames.into_iter().collect(),
            unique: self.unique,
            newline: self.newline,
        })
    }
}

/// Structured JSON formatter.
///
/// Every record carries five fixed attributes — `message`, `severity`,
/// `timestamp` (epoch seconds), `process` and `thread` — followed by the
/// pack attributes in insertion order.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    default_route: Vec<String>,
    routes: HashMap<String, Vec<String>>,
    renames: HashMap<String, String>,
    unique: bool,
    newline: bool,
}

impl JsonFormatter {
    /// A plain formatter: flat tree, duplicates allowed, no trailing
    /// newline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_route: Vec::new(),
            routes: HashMap::new(),
            renames: HashMap::new(),
            unique: false,
            newline: false,
        }
    }

    #[must_use]
    pub fn builder() -> JsonFormatterBuilder {
        JsonFormatterBuilder::new()
    }

    fn insert(&self, root: &mut Vec<(String, Node)>, name: &str, value: Json) {
        let pointer = self.routes.get(name).unwrap_or(&self.default_route);

        let mut entries = root;
        for key in pointer {
            entries = descend(entries, key);
        }

        let name = self.renames.get(name).map(String::as_str).unwrap_or(name);
        if self.unique {
            if let Some(slot) = entries.iter_mut().find(|(key, _)| key == name) {
                slot.1 = Node::Leaf(value);
                return;
            }
        }
        entries.push((name.to_string(), Node::Leaf(value)));
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &Record<'_>, writer: &mut Writer) -> Result<()> {
        let mut root: Vec<(String, Node)> = Vec::new();

        self.insert(&mut root, "message", Json::from(record.text()));
        self.insert(&mut root, "severity", Json::from(record.severity()));
        self.insert(&mut root, "timestamp", Json::from(record.timestamp().timestamp()));
        self.insert(&mut root, "process", Json::from(record.pid()));
        self.insert(&mut root, "thread", Json::from(record.tid()));
        for (name, value) in record.attributes().iter() {
            self.insert(&mut root, name, value.to_json());
        }

        write_object(&root, writer)?;
        if self.newline {
            writer.write(b"\n");
        }
        Ok(())
    }
}

/// Walk to (or create) the object entries behind `key`, replacing a
/// colliding leaf: the later route wins and the collision is reported once
/// per occurrence.
fn descend<'t>(entries: &'t mut Vec<(String, Node)>, key: &str) -> &'t mut Vec<(String, Node)> {
    let index = match entries.iter().position(|(existing, _)| existing == key) {
        Some(index) => index,
        None => {
            entries.push((key.to_string(), Node::Object(Vec::new())));
            entries.len() - 1
        }
    };

    if matches!(entries[index].1, Node::Leaf(_)) {
        eprintln!(
            "[LOGGER WARNING] JSON route overwrites a non-object value at '{}'",
            key
        );
        entries[index].1 = Node::Object(Vec::new());
    }

    match &mut entries[index].1 {
        Node::Object(children) => children,
        Node::Leaf(_) => unreachable!("colliding leaf replaced above"),
    }
}

/// Parse an RFC 6901 JSON pointer into reference tokens. Both `""` and `"/"`
/// address the root object.
fn parse_pointer(path: &str) -> Result<Vec<String>> {
    if path.is_empty() || path == "/" {
        return Ok(Vec::new());
    }
    if !path.starts_with('/') {
        return Err(Error::invalid_pointer(format!(
            "'{}' does not start with '/'",
            path
        )));
    }
    path[1..].split('/').map(unescape_token).collect()
}

fn unescape_token(token: &str) -> Result<String> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                Some(other) => {
                    return Err(Error::invalid_pointer(format!("invalid escape '~{}'", other)))
                }
                None => return Err(Error::invalid_pointer("dangling '~' escape")),
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

fn write_object(entries: &[(String, Node)], writer: &mut Writer) -> Result<()> {
    writer.write(b"{");
    for (index, (key, node)) in entries.iter().enumerate() {
        if index > 0 {
            writer.write(b",");
        }
        serde_json::to_writer(&mut *writer, key).map_err(std::io::Error::from)?;
        writer.write(b":");
        match node {
            Node::Object(children) => write_object(children, writer)?,
            Node::Leaf(value) => {
                serde_json::to_writer(&mut *writer, value).map_err(std::io::Error::from)?
            }
        }
    }
    writer.write(b"}");
    Ok(())
}
