//! Attribute model: typed values, ordered lists and the borrowed pack view

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Value carried by a single attribute.
///
/// Owned and borrowed strings are distinct variants so call sites can attach
/// string slices without allocating; the two compare equal when their content
/// does.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value<'a> {
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    String(String),
    Str(&'a str),
    None,
}

impl Value<'_> {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            Value::U64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(v) => Some(*v),
            Value::I64(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::I64(v) => serde_json::Value::Number((*v).into()),
            Value::U64(v) => serde_json::Value::Number((*v).into()),
            Value::F64(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Str(s) => serde_json::Value::String((*s).to_string()),
            Value::None => serde_json::Value::Null,
        }
    }
}

impl<'a, 'b> PartialEq<Value<'b>> for Value<'a> {
    fn eq(&self, other: &Value<'b>) -> bool {
        match (self, other) {
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::None, Value::None) => true,
            _ => {
                if let (Some(a), Some(b)) = (self.as_str(), other.as_str()) {
                    return a == b;
                }
                match (self.as_i64(), other.as_i64()) {
                    (Some(a), Some(b)) => a == b,
                    _ => match (self.as_u64(), other.as_u64()) {
                        (Some(a), Some(b)) => a == b,
                        _ => false,
                    },
                }
            }
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I64(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::Str(s) => write!(f, "{}", s),
            Value::None => write!(f, "none"),
        }
    }
}

impl From<i64> for Value<'_> {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<i32> for Value<'_> {
    fn from(v: i32) -> Self {
        Value::I64(v as i64)
    }
}

impl From<u64> for Value<'_> {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<u32> for Value<'_> {
    fn from(v: u32) -> Self {
        Value::U64(v as u64)
    }
}

impl From<f64> for Value<'_> {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<bool> for Value<'_> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Value::Str(v)
    }
}

impl From<String> for Value<'_> {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// A named value. Names are arbitrary non-empty strings; duplicates across
/// lists are allowed and consumers decide how to resolve them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute<'a> {
    pub name: Cow<'a, str>,
    pub value: Value<'a>,
}

impl<'a> Attribute<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>, value: impl Into<Value<'a>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered sequence of attributes.
///
/// Ordering is significant: the pattern formatter's leftover placeholder
/// emits in reverse insertion order, and the JSON formatter emits in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeList<'a>(Vec<Attribute<'a>>);

impl<'a> AttributeList<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, attribute: Attribute<'a>) {
        self.0.push(attribute);
    }

    /// Add an attribute, builder-style.
    #[must_use]
    pub fn with(mut self, name: impl Into<Cow<'a, str>>, value: impl Into<Value<'a>>) -> Self {
        self.0.push(Attribute::new(name, value));
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute<'a>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<Attribute<'a>> for AttributeList<'a> {
    fn from_iter<I: IntoIterator<Item = Attribute<'a>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Ordered sequence of references to attribute lists.
///
/// The pack borrows; it never owns storage. Lookup walks the pack in order
/// and the first match wins.
#[derive(Debug, Default)]
pub struct AttributePack<'a> {
    lists: Vec<&'a AttributeList<'a>>,
}

impl<'a> AttributePack<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self { lists: Vec::new() }
    }

    pub fn push(&mut self, list: &'a AttributeList<'a>) {
        self.lists.push(list);
    }

    pub fn lists(&self) -> &[&'a AttributeList<'a>] {
        &self.lists
    }

    /// First-match lookup across the pack.
    pub fn lookup(&self, name: &str) -> Option<&'a Value<'a>> {
        self.lists
            .iter()
            .flat_map(|list| list.iter())
            .find(|attribute| attribute.name == name)
            .map(|attribute| &attribute.value)
    }

    /// All `(name, value)` pairs in pack order, inner-list order, duplicates
    /// preserved.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value<'a>)> + '_ {
        self.lists
            .iter()
            .flat_map(|list| list.iter())
            .map(|attribute| (attribute.name.as_ref(), &attribute.value))
    }

    pub fn len(&self) -> usize {
        self.lists.iter().map(|list| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(|list| list.is_empty())
    }
}
