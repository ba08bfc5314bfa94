//! Error types for .ini dialect operations.

use thiserror::Error;

/// Errors that can occur while reading or writing a Mad Tracks .ini file.
#[derive(Error, Debug)]
pub enum IniError {
    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A parameter line appeared before any `[section]` header.
    #[error("parameter outside of any section at line {line}: {text}")]
    MalformedSection {
        /// Line number (1-indexed).
        line: usize,
        /// The offending line, after comment and whitespace removal.
        text: String,
    },
}

impl IniError {
    /// Create a malformed section error.
    pub fn malformed_section(line: usize, text: impl Into<String>) -> Self {
        Self::MalformedSection {
            line,
            text: text.into(),
        }
    }
}

/// Result type for .ini operations.
pub type Result<T> = std::result::Result<T, IniError>;
