//! Error types for level import and export.

use std::path::PathBuf;

use madtracks_ini::IniError;
use thiserror::Error;

/// Errors that can occur while importing or exporting a level.
#[derive(Error, Debug)]
pub enum LevelError {
    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A .ini file could not be parsed.
    #[error("{}: {source}", path.display())]
    Ini {
        /// File being parsed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: IniError,
    },

    /// A descriptor file is missing or unreadable.
    #[error("unresolved descriptor {filename}: {message}")]
    UnresolvedDescriptor {
        /// Descriptor filename as referenced by the level.
        filename: String,
        /// What went wrong.
        message: String,
    },

    /// A descriptor file has no usable `[object]` section.
    #[error("invalid descriptor {filename}: {message}")]
    InvalidDescriptor {
        /// Descriptor filename.
        filename: String,
        /// What went wrong.
        message: String,
    },

    /// A required parameter is absent or has the wrong shape.
    #[error("missing or invalid parameter '{0}'")]
    MissingParameter(String),

    /// An error tied to one section of a level file.
    #[error("{} section #{index} [{section}]: {source}", file.display())]
    Section {
        /// Level file being processed.
        file: PathBuf,
        /// Index of the section in the file.
        index: usize,
        /// Section name.
        section: String,
        /// Underlying error.
        #[source]
        source: Box<LevelError>,
    },

    /// An error raised while assembling a trackpart sequence.
    #[error("trackpart sequence {sequence_index}: {source}")]
    Sequence {
        /// Sequence that was being assembled.
        sequence_index: usize,
        /// Underlying error.
        #[source]
        source: Box<LevelError>,
    },

    /// A sequence was asked to start past the last section.
    #[error("sequence start #{start} is past the end of the level ({len} sections)")]
    SequenceStart {
        /// Requested start index.
        start: usize,
        /// Number of sections in the level.
        len: usize,
    },

    /// The trackpart catalog could not be loaded.
    #[error("invalid trackpart catalog: {0}")]
    Catalog(String),

    /// Import settings are invalid.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl LevelError {
    /// Create an unresolved descriptor error.
    pub fn unresolved(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnresolvedDescriptor {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an invalid descriptor error.
    pub fn invalid_descriptor(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Attach the level file and section to an error.
    pub fn at_section(self, file: impl Into<PathBuf>, index: usize, section: impl Into<String>) -> Self {
        Self::Section {
            file: file.into(),
            index,
            section: section.into(),
            source: Box::new(self),
        }
    }

    /// Attach the sequence being assembled to an error.
    pub fn in_sequence(self, sequence_index: usize) -> Self {
        Self::Sequence {
            sequence_index,
            source: Box::new(self),
        }
    }

    /// Wrap a parse error with the path of the file being parsed.
    pub fn ini(path: impl Into<PathBuf>, source: IniError) -> Self {
        Self::Ini {
            path: path.into(),
            source,
        }
    }
}

/// Result type for level operations.
pub type Result<T> = std::result::Result<T, LevelError>;
