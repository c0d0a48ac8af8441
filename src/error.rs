//! Error types for TOON encoding and decoding.
//!
//! All decode-side errors carry a 1-based line number; count mismatches also
//! carry the declared and actual counts so callers can report exactly what
//! disagreed.
//!
//! ## Error categories
//!
//! - **Encode errors**: unsupported types (from the serde bridge) and
//!   resource-limit violations
//! - **Syntax errors**: malformed headers, unterminated quotes, missing
//!   colons, illegal escapes
//! - **Indentation errors**: tabs in the indent region, indents that are not
//!   a multiple of the configured width
//! - **Validation errors**: declared-vs-actual disagreements raised in strict
//!   mode (length, field count, delimiter, duplicate keys)
//!
//! In lenient mode the validation category is downgraded to [`Warning`]
//! records collected by the decoder; syntax and indentation problems stay
//! fatal.
//!
//! ## Examples
//!
//! ```rust
//! use toon_codec::{decode, Error};
//!
//! let result = decode("xs[3]: 1,2");
//! match result {
//!     Err(Error::LengthMismatch { declared, actual, line }) => {
//!         assert_eq!((declared, actual, line), (3, 2, 1));
//!     }
//!     other => panic!("expected a length mismatch, got {:?}", other),
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur during TOON encoding or
/// decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Value has no TOON representation (raised by the serde bridge)
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// A configured resource limit was exceeded
    #[error("Limit exceeded: {what} {actual} exceeds maximum {limit}")]
    LimitExceeded {
        what: &'static str,
        actual: usize,
        limit: usize,
    },

    /// Malformed TOON syntax
    #[error("Syntax error at line {line}, column {col}: {msg}")]
    Syntax {
        line: usize,
        col: usize,
        msg: String,
    },

    /// Indentation violates the line grammar
    #[error("Indentation error at line {line}: {msg}")]
    Indentation { line: usize, msg: String },

    /// Input ended in the middle of a structure
    #[error("Unexpected end of input at line {line}: expected {expected}")]
    UnexpectedEnd { line: usize, expected: String },

    /// Declared array length disagrees with the counted items
    #[error("Length mismatch at line {line}: declared {declared}, found {actual}")]
    LengthMismatch {
        line: usize,
        declared: usize,
        actual: usize,
    },

    /// Tabular row has the wrong number of fields
    #[error("Field mismatch at line {line}: header declares {declared} fields, row has {actual}")]
    FieldMismatch {
        line: usize,
        declared: usize,
        actual: usize,
    },

    /// Row or inline content does not split with the header's delimiter
    #[error("Delimiter mismatch at line {line}: {msg}")]
    DelimiterMismatch { line: usize, msg: String },

    /// The same key appears twice within one object
    #[error("Duplicate key {key:?} at line {line}")]
    DuplicateKey { line: usize, key: String },

    /// Path expansion found a prefix used both as a scalar and as an object
    #[error("Path conflict: {key:?} is used both as a value and as an object prefix")]
    PathConflict { key: String },

    /// Generic message (serde custom errors)
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates a syntax error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toon_codec::Error;
    ///
    /// let err = Error::syntax(10, 5, "unexpected token");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: impl Into<String>) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.into(),
        }
    }

    /// Creates an indentation error for a line.
    pub fn indentation(line: usize, msg: impl Into<String>) -> Self {
        Error::Indentation {
            line,
            msg: msg.into(),
        }
    }

    /// Creates an unexpected end-of-input error.
    pub fn unexpected_end(line: usize, expected: impl Into<String>) -> Self {
        Error::UnexpectedEnd {
            line,
            expected: expected.into(),
        }
    }

    /// Creates an array length mismatch error.
    pub fn length_mismatch(line: usize, declared: usize, actual: usize) -> Self {
        Error::LengthMismatch {
            line,
            declared,
            actual,
        }
    }

    /// Creates a tabular field-count mismatch error.
    pub fn field_mismatch(line: usize, declared: usize, actual: usize) -> Self {
        Error::FieldMismatch {
            line,
            declared,
            actual,
        }
    }

    /// Creates a delimiter mismatch error.
    pub fn delimiter_mismatch(line: usize, msg: impl Into<String>) -> Self {
        Error::DelimiterMismatch {
            line,
            msg: msg.into(),
        }
    }

    /// Creates a duplicate key error.
    pub fn duplicate_key(line: usize, key: impl Into<String>) -> Self {
        Error::DuplicateKey {
            line,
            key: key.into(),
        }
    }

    /// Creates a resource-limit error.
    pub fn limit(what: &'static str, actual: usize, limit: usize) -> Self {
        Error::LimitExceeded {
            what,
            actual,
            limit,
        }
    }

    /// Creates an unsupported type error for values with no TOON form.
    pub fn unsupported_type(msg: impl Into<String>) -> Self {
        Error::UnsupportedType(msg.into())
    }

    /// Creates an I/O error for read/write failures.
    pub fn io(msg: impl Into<String>) -> Self {
        Error::Io(msg.into())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }

    /// The 1-based source line this error points at, if it has one.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Syntax { line, .. }
            | Error::Indentation { line, .. }
            | Error::UnexpectedEnd { line, .. }
            | Error::LengthMismatch { line, .. }
            | Error::FieldMismatch { line, .. }
            | Error::DelimiterMismatch { line, .. }
            | Error::DuplicateKey { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

/// A non-fatal problem recorded during lenient decoding.
///
/// Strict mode turns each of these into the corresponding [`Error`]; lenient
/// mode collects them and continues with best-effort recovery.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    /// 1-based source line the warning points at.
    pub line: usize,
    /// Human-readable description of what was recovered.
    pub message: String,
}

impl Warning {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Warning {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
