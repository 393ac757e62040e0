//! Error types for contentquery.

use std::fmt;

use crate::filter::{LexerError, ParseError};

/// The main error type for contentquery operations.
#[derive(Debug)]
pub enum Error {
    /// A read was attempted before any projection columns were selected
    MissingProjection,

    /// No table or collection is registered under the resource locator
    UnknownResource(String),

    /// A clause, projection or sort order referenced a column the resource does not have
    UnknownColumn(String),

    /// The number of bound arguments does not match the clause placeholders
    ArgumentCount {
        /// Placeholders found in the clause
        expected: usize,
        /// Arguments supplied
        found: usize,
    },

    /// A clause or sort order could not be parsed
    Parse(String),

    /// A lock was poisoned (internal error)
    LockPoisoned,

    /// I/O error
    Io(std::io::Error),

    /// Invalid operation
    InvalidOperation(String),

    /// Failure reported by a gateway implementation
    Gateway(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingProjection => {
                write!(f, "No projection defined. Set one with select()")
            }
            Error::UnknownResource(uri) => write!(f, "Unknown resource: {}", uri),
            Error::UnknownColumn(column) => write!(f, "No such column: {}", column),
            Error::ArgumentCount { expected, found } => write!(
                f,
                "Argument count mismatch: clause has {} placeholders, {} arguments bound",
                expected, found
            ),
            Error::Parse(msg) => write!(f, "Parse error: {}", msg),
            Error::LockPoisoned => write!(f, "Lock poisoned"),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
            Error::Gateway(msg) => write!(f, "Gateway error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<LexerError> for Error {
    fn from(err: LexerError) -> Self {
        Error::Parse(err.to_string())
    }
}

/// A specialized `Result` type for contentquery operations.
pub type Result<T> = std::result::Result<T, Error>;
