//! Pattern-string formatter
//!
//! The pattern is compiled into a token list exactly once, at construction;
//! rendering walks the tokens and writes straight into the caller's
//! [`Writer`]. Placeholders use brace syntax with a printf-like format
//! specification: `{severity:d}, [{timestamp}]: {message}` renders as
//! `1, [2015-11-18 15:50:12.630953]: HTTP1.1 - 200 OK`.
//!
//! Five attribute names are reserved and cannot be shadowed by user
//! attributes: `message`, `severity`, `timestamp`, `process` and `thread`.
//! Everything else resolves against the record's attribute pack, failing the
//! record with a key-not-found error when absent, unless the placeholder was
//! marked optional at construction. The leftover placeholder `{...}` emits
//! every user attribute not referenced elsewhere in the pattern, in reverse
//! of the order they entered the pack.

use super::Formatter;
use crate::core::datetime::{Generator, DEFAULT_TIMESTAMP_PATTERN};
use crate::core::error::{Error, Result};
use crate::core::record::{self, Record};
use crate::core::severity;
use crate::core::writer::Writer;
use crate::core::Value;
use chrono::Local;
use colored::Colorize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Severity mapping function.
///
/// The default writes the integer representation; [`severity_names`] and
/// [`severity_colored_names`] are ready-made alternatives.
pub type SeverityMap = Arc<dyn Fn(i32, &Spec, &mut Writer) + Send + Sync>;

/// Per-placeholder options keyed by attribute name.
pub type Options = HashMap<String, PlaceholderOption>;

#[derive(Debug, Clone)]
pub enum PlaceholderOption {
    Optional(OptionalOption),
    Leftover(LeftoverOption),
}

/// Marks a generic placeholder as optional: when the attribute is missing
/// nothing is emitted, when present the value is wrapped in the prefix and
/// suffix.
#[derive(Debug, Clone, Default)]
pub struct OptionalOption {
    pub prefix: String,
    pub suffix: String,
}

impl OptionalOption {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }
}

/// Options for the leftover placeholder.
#[derive(Debug, Clone)]
pub struct LeftoverOption {
    /// De-duplicate by name; the first occurrence in emission order wins.
    pub unique: bool,
    /// Written only if at least one attribute is emitted.
    pub prefix: String,
    /// Written only if at least one attribute is emitted.
    pub suffix: String,
    /// Per-attribute sub-format with `{name}` and `{value}` placeholders.
    pub pattern: String,
    /// Written between consecutive attributes.
    pub separator: String,
}

impl Default for LeftoverOption {
    fn default() -> Self {
        Self {
            unique: false,
            prefix: String::new(),
            suffix: String::new(),
            pattern: "\"{name}\": {value}".to_string(),
            separator: ", ".to_string(),
        }
    }
}

impl LeftoverOption {
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sign {
    #[default]
    Default,
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Decimal,
    Hex,
    Octal,
    Binary,
    Str,
    Float,
}

/// Parsed format specification: `[[fill]align][sign][width][.precision][type]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Spec {
    pub fill: Option<char>,
    pub align: Option<Align>,
    pub sign: Sign,
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub kind: Option<Kind>,
}

impl Spec {
    fn is_plain(&self) -> bool {
        self.fill.is_none()
            && self.align.is_none()
            && self.sign == Sign::Default
            && self.width.is_none()
            && self.precision.is_none()
    }
}

#[derive(Debug, Clone)]
struct TimestampToken {
    generator: Generator,
    spec: Spec,
}

#[derive(Debug, Clone)]
struct GenericToken {
    name: String,
    spec: Spec,
}

#[derive(Debug, Clone)]
struct OptionalToken {
    name: String,
    spec: Spec,
    prefix: String,
    suffix: String,
}

#[derive(Debug, Clone)]
enum Token {
    Literal(String),
    Message(Spec),
    Severity(Spec),
    TimestampNum(Spec),
    Timestamp(Box<TimestampToken>),
    ProcessId(Spec),
    ProcessName(Spec),
    ThreadHex(Spec),
    ThreadId(Spec),
    ThreadName(Spec),
    Required(Box<GenericToken>),
    Optional(Box<OptionalToken>),
    Leftover(Box<LeftoverOption>),
}

/// Compile-once, render-many template formatter.
pub struct PatternFormatter {
    pattern: String,
    sevmap: SeverityMap,
    tokens: Vec<Token>,
    referenced: HashSet<String>,
}

impl std::fmt::Debug for PatternFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternFormatter")
            .field("pattern", &self.pattern)
            .field("tokens", &self.tokens)
            .field("referenced", &self.referenced)
            .finish()
    }
}

impl PatternFormatter {
    pub fn new(pattern: &str) -> Result<Self> {
        Self::with_options(pattern, Options::new())
    }

    pub fn with_options(pattern: &str, options: Options) -> Result<Self> {
        Self::with_severity_map(pattern, default_severity_map(), options)
    }

    pub fn with_severity_map(
        pattern: &str,
        sevmap: SeverityMap,
        options: Options,
    ) -> Result<Self> {
        let (tokens, referenced) = compile(pattern, &options)?;
        Ok(Self {
            pattern: pattern.to_owned(),
            sevmap,
            tokens,
            referenced,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn render_leftover(
        &self,
        record: &Record<'_>,
        option: &LeftoverOption,
        writer: &mut Writer,
    ) {
        let mut pairs: Vec<(&str, &Value<'_>)> = record
            .attributes()
            .iter()
            .filter(|(name, _)| !self.referenced.contains(*name))
            .collect();
        pairs.reverse();

        if option.unique {
            let mut seen = HashSet::new();
            pairs.retain(|(name, _)| seen.insert(*name));
        }

        if pairs.is_empty() {
            return;
        }

        writer.write(option.prefix.as_bytes());
        for (index, (name, value)) in pairs.into_iter().enumerate() {
            if index > 0 {
                writer.write(option.separator.as_bytes());
            }
            write_leftover_entry(writer, &option.pattern, name, value);
        }
        writer.write(option.suffix.as_bytes());
    }
}

impl Formatter for PatternFormatter {
    fn format(&self, record: &Record<'_>, writer: &mut Writer) -> Result<()> {
        for token in &self.tokens {
            match token {
                Token::Literal(text) => writer.write(text.as_bytes()),
                Token::Message(spec) => write_str_value(writer, record.text(), spec),
                Token::Severity(spec) => {
                    if spec.kind == Some(Kind::Decimal) {
                        write_int(writer, record.severity() as i64, spec);
                    } else {
                        (self.sevmap)(record.severity(), spec, writer);
                    }
                }
                Token::TimestampNum(spec) => {
                    write_int(writer, record.timestamp().timestamp_micros(), spec);
                }
                Token::Timestamp(token) => {
                    let local = record.timestamp().with_timezone(&Local);
                    if token.spec.is_plain() {
                        token.generator.render(&local, writer);
                    } else {
                        let mut rendered = Writer::new();
                        token.generator.render(&local, &mut rendered);
                        let text = String::from_utf8_lossy(rendered.as_view());
                        write_str_value(writer, &text, &token.spec);
                    }
                }
                Token::ProcessId(spec) => write_uint(writer, record.pid() as u64, spec),
                Token::ProcessName(spec) => {
                    write_str_value(writer, record::process_name(), spec);
                }
                Token::ThreadHex(spec) => write_hex_id(writer, record.tid(), spec),
                Token::ThreadId(spec) => write_uint(writer, record.tid(), spec),
                Token::ThreadName(spec) => {
                    let name = record::thread_name();
                    write_str_value(writer, name.as_deref().unwrap_or("none"), spec);
                }
                Token::Required(token) => match record.attributes().lookup(&token.name) {
                    Some(value) => write_value(writer, value, &token.spec),
                    None => return Err(Error::key_not_found(&token.name)),
                },
                Token::Optional(token) => {
                    if let Some(value) = record.attributes().lookup(&token.name) {
                        writer.write(token.prefix.as_bytes());
                        write_value(writer, value, &token.spec);
                        writer.write(token.suffix.as_bytes());
                    }
                }
                Token::Leftover(option) => self.render_leftover(record, option, writer),
            }
        }
        Ok(())
    }
}

fn default_severity_map() -> SeverityMap {
    Arc::new(|value, spec, writer| write_int(writer, value as i64, spec))
}

/// Severity map writing the conventional level names (`TRACE`..`FATAL`).
pub fn severity_names() -> SeverityMap {
    Arc::new(|value, spec, writer| write_str_value(writer, severity::name(value), spec))
}

/// Severity map writing level names colored for console output.
pub fn severity_colored_names() -> SeverityMap {
    Arc::new(|value, spec, writer| {
        let name = severity::name(value)
            .color(severity::color(value))
            .to_string();
        write_str_value(writer, &name, spec);
    })
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

fn compile(pattern: &str, options: &Options) -> Result<(Vec<Token>, HashSet<String>)> {
    let chars: Vec<(usize, char)> = pattern.char_indices().collect();
    let mut tokens = Vec::new();
    let mut referenced = HashSet::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        let (position, c) = chars[i];
        match c {
            '{' if peek(&chars, i + 1) == Some('{') => {
                literal.push('{');
                i += 2;
            }
            '}' if peek(&chars, i + 1) == Some('}') => {
                literal.push('}');
                i += 2;
            }
            '}' => return Err(Error::invalid_pattern(position, "unmatched '}'")),
            '{' => {
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(parse_placeholder(&chars, &mut i, options, &mut referenced)?);
            }
            _ => {
                literal.push(c);
                i += 1;
            }
        }
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }

    Ok((tokens, referenced))
}

fn peek(chars: &[(usize, char)], index: usize) -> Option<char> {
    chars.get(index).map(|&(_, c)| c)
}

fn parse_placeholder(
    chars: &[(usize, char)],
    i: &mut usize,
    options: &Options,
    referenced: &mut HashSet<String>,
) -> Result<Token> {
    let open = chars[*i].0;
    *i += 1;

    if peek(chars, *i) == Some('.') && peek(chars, *i + 1) == Some('.') && peek(chars, *i + 2) == Some('.')
    {
        *i += 3;
        return parse_leftover(chars, i, open, options);
    }

    let mut name = String::new();
    loop {
        match peek(chars, *i) {
            None => return Err(Error::invalid_pattern(open, "unclosed placeholder")),
            Some('}') => {
                *i += 1;
                return resolve(open, name, Spec::default(), None, options, referenced);
            }
            Some(':') => {
                *i += 1;
                break;
            }
            Some(c) => {
                name.push(c);
                *i += 1;
            }
        }
    }

    // ':{subpattern}spec' form, only meaningful for timestamps
    let user_pattern = if name == "timestamp" && peek(chars, *i) == Some('{') {
        *i += 1;
        let mut sub = String::new();
        loop {
            match peek(chars, *i) {
                None => return Err(Error::invalid_pattern(open, "unclosed timestamp pattern")),
                Some('}') => {
                    *i += 1;
                    break;
                }
                Some(c) => {
                    sub.push(c);
                    *i += 1;
                }
            }
        }
        Some(sub)
    } else {
        None
    };

    let spec_start = chars.get(*i).map(|&(pos, _)| pos).unwrap_or(open);
    let mut raw = String::new();
    loop {
        match peek(chars, *i) {
            None => return Err(Error::invalid_pattern(open, "unclosed placeholder")),
            Some('}') => {
                *i += 1;
                break;
            }
            Some(c) => {
                raw.push(c);
                *i += 1;
            }
        }
    }

    let spec = parse_spec(&raw, spec_start)?;
    resolve(open, name, spec, user_pattern, options, referenced)
}

fn parse_leftover(
    chars: &[(usize, char)],
    i: &mut usize,
    open: usize,
    options: &Options,
) -> Result<Token> {
    let mut name = String::new();
    loop {
        match peek(chars, *i) {
            None => return Err(Error::invalid_pattern(open, "unclosed placeholder")),
            Some('}') => {
                *i += 1;
                break;
            }
            Some(':') => {
                return Err(Error::invalid_pattern(
                    open,
                    "inline leftover options are not supported; configure them at construction",
                ))
            }
            Some(c) => {
                name.push(c);
                *i += 1;
            }
        }
    }

    let option = match options.get(&name) {
        Some(PlaceholderOption::Leftover(option)) => option.clone(),
        _ => LeftoverOption::default(),
    };
    Ok(Token::Leftover(Box::new(option)))
}

fn parse_spec(raw: &str, at: usize) -> Result<Spec> {
    let cs: Vec<char> = raw.chars().collect();
    let mut spec = Spec::default();
    let mut i = 0;

    if cs.len() >= 2 && align_of(cs[1]).is_some() {
        spec.fill = Some(cs[0]);
        spec.align = align_of(cs[1]);
        i = 2;
    } else if !cs.is_empty() && align_of(cs[0]).is_some() {
        spec.align = align_of(cs[0]);
        i = 1;
    }

    if i < cs.len() && (cs[i] == '+' || cs[i] == '-') {
        spec.sign = if cs[i] == '+' { Sign::Plus } else { Sign::Minus };
        i += 1;
    }

    let width_start = i;
    while i < cs.len() && cs[i].is_ascii_digit() {
        i += 1;
    }
    if i > width_start {
        let digits: String = cs[width_start..i].iter().collect();
        spec.width = Some(
            digits
                .parse()
                .map_err(|_| Error::invalid_pattern(at, "width out of range"))?,
        );
    }

    if i < cs.len() && cs[i] == '.' {
        i += 1;
        let precision_start = i;
        while i < cs.len() && cs[i].is_ascii_digit() {
            i += 1;
        }
        if i == precision_start {
            return Err(Error::invalid_pattern(at, "missing precision digits"));
        }
        let digits: String = cs[precision_start..i].iter().collect();
        spec.precision = Some(
            digits
                .parse()
                .map_err(|_| Error::invalid_pattern(at, "precision out of range"))?,
        );
    }

    if i < cs.len() {
        spec.kind = Some(match cs[i] {
            'd' => Kind::Decimal,
            'x' => Kind::Hex,
            'o' => Kind::Octal,
            'b' => Kind::Binary,
            's' => Kind::Str,
            'f' => Kind::Float,
            other => {
                return Err(Error::invalid_pattern(
                    at,
                    format!("unknown format type '{}'", other),
                ))
            }
        });
        i += 1;
    }

    if i != cs.len() {
        return Err(Error::invalid_pattern(
            at,
            "trailing characters in format specification",
        ));
    }

    Ok(spec)
}

fn align_of(c: char) -> Option<Align> {
    match c {
        '<' => Some(Align::Left),
        '>' => Some(Align::Right),
        '^' => Some(Align::Center),
        _ => None,
    }
}

fn resolve(
    at: usize,
    name: String,
    spec: Spec,
    user_pattern: Option<String>,
    options: &Options,
    referenced: &mut HashSet<String>,
) -> Result<Token> {
    if name.is_empty() {
        return Err(Error::invalid_pattern(at, "empty placeholder name"));
    }

    let token = match name.as_str() {
        "message" => Token::Message(spec),
        "severity" => Token::Severity(spec),
        "timestamp" => match user_pattern {
            Some(pattern) => {
                let pattern = if pattern.is_empty() {
                    DEFAULT_TIMESTAMP_PATTERN
                } else {
                    pattern.as_str()
                };
                Token::Timestamp(Box::new(TimestampToken {
                    generator: Generator::new(pattern),
                    spec,
                }))
            }
            None if spec.kind == Some(Kind::Decimal) => Token::TimestampNum(spec),
            None => Token::Timestamp(Box::new(TimestampToken {
                generator: Generator::new(DEFAULT_TIMESTAMP_PATTERN),
                spec,
            })),
        },
        "process" => {
            if spec.kind == Some(Kind::Str) {
                Token::ProcessName(spec)
            } else {
                Token::ProcessId(spec)
            }
        }
        "thread" => match spec.kind {
            Some(Kind::Decimal) => Token::ThreadId(spec),
            Some(Kind::Str) => Token::ThreadName(spec),
            _ => Token::ThreadHex(spec),
        },
        _ => {
            referenced.insert(name.clone());
            match options.get(&name) {
                Some(PlaceholderOption::Optional(option)) => Token::Optional(Box::new(OptionalToken {
                    name,
                    spec,
                    prefix: option.prefix.clone(),
                    suffix: option.suffix.clone(),
                })),
                _ => Token::Required(Box::new(GenericToken { name, spec })),
            }
        }
    };
    Ok(token)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn write_leftover_entry(writer: &mut Writer, pattern: &str, name: &str, value: &Value<'_>) {
    let mut rest = pattern;
    while let Some(open) = rest.find('{') {
        writer.write(rest[..open].as_bytes());
        let tail = &rest[open..];
        if let Some(after) = tail.strip_prefix("{name}") {
            writer.write(name.as_bytes());
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{value}") {
            use std::fmt::Write as _;
            let _ = write!(writer, "{}", value);
            rest = after;
        } else {
            writer.write(b"{");
            rest = &tail[1..];
        }
    }
    writer.write(rest.as_bytes());
}

fn write_value(writer: &mut Writer, value: &Value<'_>, spec: &Spec) {
    match value {
        Value::I64(v) => match spec.kind {
            Some(Kind::Str) => write_str_value(writer, &v.to_string(), spec),
            _ => write_int(writer, *v, spec),
        },
        Value::U64(v) => match spec.kind {
            Some(Kind::Str) => write_str_value(writer, &v.to_string(), spec),
            _ => write_uint(writer, *v, spec),
        },
        Value::F64(v) => match spec.kind {
            Some(Kind::Decimal) => write_int(writer, *v as i64, spec),
            Some(Kind::Str) => write_str_value(writer, &v.to_string(), spec),
            _ => write_float(writer, *v, spec),
        },
        Value::Bool(v) => match spec.kind {
            Some(Kind::Decimal) => write_int(writer, i64::from(*v), spec),
            _ => write_str_value(writer, if *v { "true" } else { "false" }, spec),
        },
        // Attribute types are only known at render time; a numeric specifier
        // on a string renders the string as-is.
        Value::String(s) => write_str_value(writer, s, spec),
        Value::Str(s) => write_str_value(writer, s, spec),
        Value::None => write_str_value(writer, "none", spec),
    }
}

fn write_int(writer: &mut Writer, value: i64, spec: &Spec) {
    if spec.kind == Some(Kind::Float) {
        write_float(writer, value as f64, spec);
        return;
    }
    let digits = match spec.kind {
        Some(Kind::Hex) => format!("{:x}", value),
        Some(Kind::Octal) => format!("{:o}", value),
        Some(Kind::Binary) => format!("{:b}", value),
        _ => value.to_string(),
    };
    let body = if spec.sign == Sign::Plus && value >= 0 {
        format!("+{}", digits)
    } else {
        digits
    };
    pad(writer, &body, spec, true);
}

fn write_uint(writer: &mut Writer, value: u64, spec: &Spec) {
    if spec.kind == Some(Kind::Float) {
        write_float(writer, value as f64, spec);
        return;
    }
    let digits = match spec.kind {
        Some(Kind::Hex) => format!("{:x}", value),
        Some(Kind::Octal) => format!("{:o}", value),
        Some(Kind::Binary) => format!("{:b}", value),
        _ => value.to_string(),
    };
    let body = if spec.sign == Sign::Plus {
        format!("+{}", digits)
    } else {
        digits
    };
    pad(writer, &body, spec, true);
}

fn write_float(writer: &mut Writer, value: f64, spec: &Spec) {
    let digits = match spec.precision {
        Some(precision) => format!("{:.*}", precision, value),
        None => format!("{}", value),
    };
    let body = if spec.sign == Sign::Plus && !digits.starts_with('-') {
        format!("+{}", digits)
    } else {
        digits
    };
    pad(writer, &body, spec, true);
}

fn write_hex_id(writer: &mut Writer, value: u64, spec: &Spec) {
    let body = format!("{:#x}", value);
    pad(writer, &body, spec, true);
}

fn write_str_value(writer: &mut Writer, text: &str, spec: &Spec) {
    match spec.precision {
        Some(precision) if text.chars().count() > precision => {
            let truncated: String = text.chars().take(precision).collect();
            pad(writer, &truncated, spec, false);
        }
        _ => pad(writer, text, spec, false),
    }
}

fn pad(writer: &mut Writer, body: &str, spec: &Spec, numeric: bool) {
    let width = spec.width.unwrap_or(0);
    let count = body.chars().count();
    if count >= width {
        writer.write(body.as_bytes());
        return;
    }

    let fill = spec.fill.unwrap_or(' ');
    let missing = width - count;
    let align = spec.align.unwrap_or(if numeric { Align::Right } else { Align::Left });
    let (left, right) = match align {
        Align::Left => (0, missing),
        Align::Right => (missing, 0),
        Align::Center => (missing / 2, missing - missing / 2),
    };

    write_fill(writer, fill, left);
    writer.write(body.as_bytes());
    write_fill(writer, fill, right);
}

fn write_fill(writer: &mut Writer, fill: char, count: usize) {
    let mut buf = [0u8; 4];
    let encoded = fill.encode_utf8(&mut buf);
    for _ in 0..count {
        writer.write(encoded.as_bytes());
    }
}
