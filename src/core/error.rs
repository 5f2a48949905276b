//! Error types for the record pipeline and formatters

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required placeholder had no matching attribute in the record.
    #[error("attribute not found: '{name}'")]
    KeyNotFound { name: String },

    /// Malformed template: unknown specifier, unclosed placeholder, etc.
    #[error("invalid pattern at byte {position}: {reason}")]
    InvalidPattern { position: usize, reason: String },

    /// A route path failed RFC 6901 parsing.
    #[error("invalid JSON pointer: {reason}")]
    InvalidJsonPointer { reason: String },

    /// Downstream I/O failure in a sink.
    #[error("sink error: {0}")]
    Sink(#[from] std::io::Error),

    /// Thread-safety contract breach.
    #[error("invariant violation: {reason}")]
    InvariantViolation { reason: String },
}

impl Error {
    /// Create a key-not-found error for a missing attribute
    pub fn key_not_found(name: impl Into<String>) -> Self {
        Error::KeyNotFound { name: name.into() }
    }

    /// Create an invalid pattern error at a byte position
    pub fn invalid_pattern(position: usize, reason: impl Into<String>) -> Self {
        Error::InvalidPattern {
            position,
            reason: reason.into(),
        }
    }

    /// Create an invalid JSON pointer error
    pub fn invalid_pointer(reason: impl Into<String>) -> Self {
        Error::InvalidJsonPointer {
            reason: reason.into(),
        }
    }

    /// Create an invariant violation error
    pub fn invariant(reason: impl Into<String>) -> Self {
        Error::InvariantViolation {
            reason: reason.into(),
        }
    }
}
