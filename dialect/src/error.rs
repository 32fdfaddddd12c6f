//! Error types for reading the dialect.
//!
//! Unmatched lines are never errors; these variants cover input that cannot
//! be scanned at all.

use thiserror::Error;

/// Errors that abort a parse.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input bytes are not UTF-8.
    #[error("input is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 {
        /// Length of the longest valid prefix.
        valid_up_to: usize,
    },

    /// Input exceeds the line limit.
    #[error("input has more than {limit} lines")]
    TooManyLines {
        /// The configured limit.
        limit: usize,
    },

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<std::str::Utf8Error> for ParseError {
    fn from(err: std::str::Utf8Error) -> Self {
        ParseError::InvalidUtf8 {
            valid_up_to: err.valid_up_to(),
        }
    }
}

/// Convenience alias for results with [`ParseError`].
pub type Result<T> = std::result::Result<T, ParseError>;
