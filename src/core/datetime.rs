//! Datetime pattern generator
//!
//! Compiles a strftime-like pattern into a token list once, then renders
//! timestamps against it many times. One extension on top of the standard
//! conversion specifiers: `%f` writes 6-digit zero-padded microseconds.

use super::writer::Writer;
use chrono::{DateTime, Local};
use std::fmt::Write as _;

/// Pattern applied to `{timestamp}` placeholders that carry no explicit one.
pub const DEFAULT_TIMESTAMP_PATTERN: &str = "%Y-%m-%d %H:%M:%S.%f";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Microseconds,
}

/// Compiled timestamp pattern.
#[derive(Debug, Clone)]
pub struct Generator {
    tokens: Vec<Token>,
}

impl Generator {
    /// Split the pattern on `%f` occurrences; adjacent literal runs merge
    /// into a single token.
    pub fn new(pattern: &str) -> Self {
        let mut tokens = Vec::new();
        let mut literal = String::new();

        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '%' && chars.peek() == Some(&'f') {
                chars.next();
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(Token::Microseconds);
            } else {
                literal.push(c);
            }
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Self { tokens }
    }

    /// Render the given instant. Literal runs go through chrono's strftime
    /// formatting; a malformed conversion specifier writes nothing for its
    /// token rather than failing the record.
    pub fn render(&self, time: &DateTime<Local>, writer: &mut Writer) {
        for token in &self.tokens {
            match token {
                Token::Literal(format) => {
                    let _ = write!(writer, "{}", time.format(format));
                }
                Token::Microseconds => {
                    let _ = write!(writer, "{:06}", time.timestamp_subsec_micros());
                }
            }
        }
    }
}
